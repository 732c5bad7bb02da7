//! Packed permission profiles.

use serde::{Deserialize, Serialize};

/// Four independent capability levels held by one member.
///
/// A level of zero means the capability is absent. The axes never imply
/// each other: a high `manage` level grants nothing on `add`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionProfile {
    /// Ability to create new account contexts.
    pub create: u32,
    /// Ability to invite new identities.
    pub add: u32,
    /// Ability to remove identities.
    pub remove: u32,
    /// General administrative level (profile updates).
    pub manage: u32,
}

impl PermissionProfile {
    /// Build a profile from its four levels, in `create, add, remove, manage` order.
    pub const fn new(create: u32, add: u32, remove: u32, manage: u32) -> Self {
        Self {
            create,
            add,
            remove,
            manage,
        }
    }

    /// The empty profile given to fresh invitees.
    pub const fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// True if every level is zero.
    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    /// The levels as an array, in `create, add, remove, manage` order.
    pub fn to_array(&self) -> [u32; 4] {
        [self.create, self.add, self.remove, self.manage]
    }

    /// Inverse of [`PermissionProfile::to_array`].
    pub fn from_array(levels: [u32; 4]) -> Self {
        let [create, add, remove, manage] = levels;
        Self::new(create, add, remove, manage)
    }
}
