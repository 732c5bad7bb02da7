//! Permission thresholds.

use serde::{Deserialize, Serialize};

use warden_core::PermissionProfile;

/// Minimum capability levels an acting member needs.
///
/// A threshold of zero is treated as one: a zero level never grants a
/// capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionPolicy {
    /// Level required to invite.
    pub min_add_level: u32,
    /// Level required to remove a non-owner.
    pub min_remove_level: u32,
    /// Level required to update a profile.
    pub min_manage_level: u32,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self {
            min_add_level: 1,
            min_remove_level: 1,
            min_manage_level: 1,
        }
    }
}

impl PermissionPolicy {
    /// Check the add axis.
    pub fn permits_add(&self, profile: &PermissionProfile) -> bool {
        meets(profile.add, self.min_add_level)
    }

    /// Check the remove axis.
    pub fn permits_remove(&self, profile: &PermissionProfile) -> bool {
        meets(profile.remove, self.min_remove_level)
    }

    /// Check the manage axis.
    pub fn permits_manage(&self, profile: &PermissionProfile) -> bool {
        meets(profile.manage, self.min_manage_level)
    }
}

fn meets(level: u32, threshold: u32) -> bool {
    level >= threshold.max(1)
}
