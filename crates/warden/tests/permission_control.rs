//! End-to-end permission flows through the Warden runtime.
//!
//! Callers outside the library match on error message substrings, so these
//! tests assert on `to_string()` rather than on variants.

use warden::journal::{Journal, MemoryJournal};
use warden::{
    CommandBuilder, Keypair, MemberStatus, Operation, PermissionPolicy, PermissionProfile,
    SubmitResult, Warden, WardenConfig, WardenError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn party(n: u8) -> Keypair {
    Keypair::from_seed(&[n; 32])
}

fn runtime() -> Warden<MemoryJournal> {
    init_tracing();
    Warden::new(MemoryJournal::new(), WardenConfig::default())
}

fn assert_message(result: warden::Result<impl std::fmt::Debug>, expected: &str) {
    let err = result.expect_err("command should be rejected");
    assert!(
        err.to_string().contains(expected),
        "expected {:?}, got {:?}",
        expected,
        err.to_string()
    );
}

#[tokio::test]
async fn create_account_twice_is_already_registered() {
    let warden = runtime();
    let a = party(1);

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();

    assert_message(
        warden
            .create_account(&a, PermissionProfile::new(1, 2, 2, 10))
            .await,
        "This user is already registered",
    );
}

#[tokio::test]
async fn second_owner_gets_an_independent_account() {
    let warden = runtime();
    let a = party(1);
    let b = party(2);

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();
    warden
        .create_account(&b, PermissionProfile::new(1, 2, 2, 10))
        .await
        .unwrap();

    let mut expected = vec![a.identity(), b.identity()];
    expected.sort();
    assert_eq!(warden.accounts().await, expected);
    assert!(warden.member(&a.identity(), &b.identity()).await.is_none());
}

#[tokio::test]
async fn full_membership_lifecycle() {
    let warden = runtime();
    let a = party(1);
    let b = party(2);
    let c = party(3);
    let account = a.identity();

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();

    // The owner is already registered.
    assert_message(
        warden.add_user(&a, &account, a.identity()).await,
        "This user is already registered",
    );

    warden.add_user(&a, &account, b.identity()).await.unwrap();
    assert_message(
        warden.add_user(&a, &account, b.identity()).await,
        "This user is already invited",
    );
    // The invitee re-inviting itself hits the same check.
    assert_message(
        warden.add_user(&b, &account, b.identity()).await,
        "This user is already invited",
    );

    warden.accept_invite(&b, &account).await.unwrap();
    let record = warden.member(&account, &b.identity()).await.unwrap();
    assert_eq!(record.status, MemberStatus::Active);
    assert_eq!(record.invited_by, Some(a.identity()));
    assert_eq!(record.profile, PermissionProfile::none());

    // B joined with no permissions.
    assert_message(
        warden.add_user(&b, &account, c.identity()).await,
        "This user has no add permission",
    );
    assert_message(
        warden.remove_user(&b, &account, a.identity()).await,
        "Can't remove the owner",
    );
    assert_message(
        warden.remove_user(&a, &account, a.identity()).await,
        "Can't remove the owner",
    );

    warden.remove_user(&a, &account, b.identity()).await.unwrap();
    assert!(warden.member(&account, &b.identity()).await.is_none());
    assert_eq!(warden.members(&account).await.len(), 1);
}

#[tokio::test]
async fn accept_without_invite_is_rejected() {
    let warden = runtime();
    let a = party(1);
    let stranger = party(4);

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();

    assert_message(
        warden.accept_invite(&stranger, &a.identity()).await,
        "This user is not invited",
    );
    assert_message(
        warden.accept_invite(&a, &a.identity()).await,
        "This user is not invited",
    );
}

#[tokio::test]
async fn granted_profile_enables_invites() {
    let warden = runtime();
    let a = party(1);
    let b = party(2);
    let c = party(3);
    let account = a.identity();

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();
    warden.add_user(&a, &account, b.identity()).await.unwrap();
    warden.accept_invite(&b, &account).await.unwrap();
    warden
        .update_profile(&a, &account, b.identity(), PermissionProfile::new(0, 1, 0, 0))
        .await
        .unwrap();

    warden.add_user(&b, &account, c.identity()).await.unwrap();
    let record = warden.member(&account, &c.identity()).await.unwrap();
    assert_eq!(record.status, MemberStatus::Invited);
    assert_eq!(record.invited_by, Some(b.identity()));

    // B still cannot remove anyone.
    assert_message(
        warden.remove_user(&b, &account, c.identity()).await,
        "This user has no remove permission",
    );
}

#[tokio::test]
async fn policy_threshold_raises_the_bar() {
    init_tracing();
    let config = WardenConfig {
        policy: PermissionPolicy {
            min_add_level: 2,
            ..PermissionPolicy::default()
        },
        ..WardenConfig::default()
    };
    let warden = Warden::new(MemoryJournal::new(), config);
    let a = party(1);
    let b = party(2);

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();

    assert_message(
        warden.add_user(&a, &a.identity(), b.identity()).await,
        "This user has no add permission",
    );
}

#[tokio::test]
async fn rejected_commands_leave_no_trace() {
    let warden = runtime();
    let a = party(1);
    let b = party(2);

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();
    let before = warden.directory().await;
    let head = warden.journal().head_seq().await.unwrap();

    let _ = warden.add_user(&a, &a.identity(), a.identity()).await;
    let _ = warden.remove_user(&a, &a.identity(), a.identity()).await;
    let _ = warden.accept_invite(&b, &a.identity()).await;

    assert_eq!(warden.directory().await, before);
    assert_eq!(warden.journal().head_seq().await.unwrap(), head);
}

#[tokio::test]
async fn duplicate_submission_is_idempotent() {
    let warden = runtime();
    let a = party(1);

    let command = CommandBuilder::create_account(a.identity(), PermissionProfile::new(2, 1, 3, 5))
        .nonce(7)
        .timestamp(1_700_000_000_000)
        .sign(&a);

    let first = warden.submit(&command).await.unwrap();
    let second = warden.submit(&command).await.unwrap();

    assert!(matches!(first, SubmitResult::Applied { seq: 1, .. }));
    assert!(matches!(second, SubmitResult::Duplicate { seq: 1, .. }));
    assert_eq!(first.id(), second.id());
}

#[tokio::test]
async fn unknown_account_is_reported() {
    let warden = runtime();
    let a = party(1);
    let nowhere = party(9);

    let err = warden
        .add_user(&a, &nowhere.identity(), a.identity())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("account not found"));
}

#[tokio::test]
async fn foreign_account_creation_is_invalid() {
    let warden = runtime();
    let a = party(1);
    let b = party(2);

    let command = CommandBuilder::new(
        a.identity(),
        b.identity(),
        Operation::CreateAccount {
            profile: PermissionProfile::new(2, 1, 3, 5),
        },
    )
    .sign(&a);

    let err = warden.submit(&command).await.unwrap_err();
    assert!(matches!(err, WardenError::Validation(_)));
    assert!(warden.accounts().await.is_empty());
}

#[tokio::test]
async fn replay_reproduces_state() {
    let warden = runtime();
    let a = party(1);
    let b = party(2);
    let c = party(3);
    let account = a.identity();

    warden
        .create_account(&a, PermissionProfile::new(2, 1, 3, 5))
        .await
        .unwrap();
    warden.add_user(&a, &account, b.identity()).await.unwrap();
    warden.add_user(&a, &account, c.identity()).await.unwrap();
    warden.accept_invite(&b, &account).await.unwrap();
    warden.remove_user(&a, &account, c.identity()).await.unwrap();
    warden
        .create_account(&b, PermissionProfile::new(1, 2, 2, 5))
        .await
        .unwrap();
    let _ = warden.remove_user(&b, &account, a.identity()).await;

    let live = warden.directory().await;
    warden.rebuild().await.unwrap();
    assert_eq!(warden.directory().await, live);

    let copy = MemoryJournal::new();
    for entry in warden.journal().entries_since(0).await.unwrap() {
        copy.append(&entry.command, &entry.canonical).await.unwrap();
    }
    let reopened = Warden::open(copy, WardenConfig::default()).await.unwrap();
    assert_eq!(reopened.directory().await, live);
    assert_eq!(
        warden
            .journal()
            .entries_for_account(&account)
            .await
            .unwrap()
            .len(),
        5
    );
}

#[test]
fn config_parses_from_json() {
    let config = WardenConfig::from_json(
        r#"{
            "verify_signatures": true,
            "policy": { "min_add_level": 1, "min_remove_level": 2, "min_manage_level": 3 }
        }"#,
    )
    .unwrap();

    assert!(config.verify_signatures);
    assert_eq!(config.policy.min_remove_level, 2);
    assert_eq!(config.policy.min_manage_level, 3);
}
