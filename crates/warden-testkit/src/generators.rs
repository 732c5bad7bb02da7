//! Proptest generators for property-based testing.
//!
//! Operation sequences are drawn over a small fixed cast of identities so
//! that collisions (re-invites, removals of real members) are frequent.

use proptest::prelude::*;

use warden_core::{Identity, Keypair, Operation, PermissionProfile};
use warden_registry::{PermissionRegistry, RegistryError};

/// Number of identities that generated steps draw from.
pub const CAST_SIZE: usize = 5;

/// The deterministic identities steps refer to by index.
pub fn cast() -> Vec<Identity> {
    (0..CAST_SIZE)
        .map(|i| Keypair::from_seed(&[i as u8 + 1; 32]).identity())
        .collect()
}

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate a profile with small levels, zero included.
pub fn profile() -> impl Strategy<Value = PermissionProfile> {
    (0u32..4, 0u32..4, 0u32..4, 0u32..4)
        .prop_map(|(c, a, r, m)| PermissionProfile::new(c, a, r, m))
}

/// One operation issued by a member of the cast.
#[derive(Debug, Clone)]
pub struct Step {
    pub caller: usize,
    pub operation: StepOperation,
}

/// An [`Operation`] whose identities are cast indexes.
#[derive(Debug, Clone)]
pub enum StepOperation {
    CreateAccount(PermissionProfile),
    AddUser(usize),
    AcceptInvite,
    RemoveUser(usize),
    UpdateProfile(usize, PermissionProfile),
}

impl Step {
    /// Resolve cast indexes into identities.
    pub fn resolve(&self, cast: &[Identity]) -> (Identity, Operation) {
        let operation = match &self.operation {
            StepOperation::CreateAccount(profile) => Operation::CreateAccount { profile: *profile },
            StepOperation::AddUser(t) => Operation::AddUser { target: cast[*t] },
            StepOperation::AcceptInvite => Operation::AcceptInvite,
            StepOperation::RemoveUser(t) => Operation::RemoveUser { target: cast[*t] },
            StepOperation::UpdateProfile(t, profile) => Operation::UpdateProfile {
                target: cast[*t],
                profile: *profile,
            },
        };
        (cast[self.caller], operation)
    }
}

impl Arbitrary for Step {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let index = 0..CAST_SIZE;
        let operation = prop_oneof![
            1 => profile().prop_map(StepOperation::CreateAccount),
            4 => index.clone().prop_map(StepOperation::AddUser),
            3 => Just(StepOperation::AcceptInvite),
            2 => index.clone().prop_map(StepOperation::RemoveUser),
            2 => (index.clone(), profile())
                .prop_map(|(t, p)| StepOperation::UpdateProfile(t, p)),
        ];
        (index, operation)
            .prop_map(|(caller, operation)| Step { caller, operation })
            .boxed()
    }
}

/// Generate an operation sequence, starting with cast member 0 creating the
/// account so most later steps have something to act on.
pub fn steps(max_len: usize) -> impl Strategy<Value = Vec<Step>> {
    (profile(), prop::collection::vec(any::<Step>(), 0..=max_len)).prop_map(|(owner, rest)| {
        let mut steps = vec![Step {
            caller: 0,
            operation: StepOperation::CreateAccount(owner),
        }];
        steps.extend(rest);
        steps
    })
}

/// Apply `steps` to a fresh registry, collecting each outcome.
pub fn run_steps(
    steps: &[Step],
) -> (PermissionRegistry, Vec<std::result::Result<(), RegistryError>>) {
    let cast = cast();
    let mut registry = PermissionRegistry::new();
    let outcomes = steps
        .iter()
        .map(|step| {
            let (caller, operation) = step.resolve(&cast);
            registry.apply(caller, &operation)
        })
        .collect();
    (registry, outcomes)
}
