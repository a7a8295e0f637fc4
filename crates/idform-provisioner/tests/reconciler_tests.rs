mod helpers;

use std::collections::BTreeSet;
use std::time::Duration;

use helpers::fake_directory::{FakeDirectory, Op};
use helpers::{classic_org, logo_file, oie_org, okta_login};
use idform_core::models::{Memberships, ObjectStatus};
use idform_core::RemoteClient;
use idform_provisioner::mappers::{AccessPolicy, AccessPolicyMapper, SwaAppMapper};
use idform_provisioner::{
    Activation, Phase, ProvisionerError, ReconcileContext, Reconciler, ResourceState, StateOf,
    Step,
};
use tokio_util::sync::CancellationToken;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn memberships(groups: &[&str], users: &[&str]) -> Memberships {
    Memberships {
        groups: set(groups),
        users: set(users),
    }
}

async fn created_app(
    dir: &std::sync::Arc<FakeDirectory>,
    ctx: &ReconcileContext,
) -> StateOf<SwaAppMapper> {
    let reconciler = Reconciler::new(SwaAppMapper);
    let mut state = StateOf::<SwaAppMapper>::planned(okta_login())
        .with_memberships(memberships(&["g1"], &["u1"]));
    reconciler.create(ctx, &mut state).await.unwrap();
    dir.clear_calls();
    state
}

#[tokio::test]
async fn create_then_read_reproduces_declared_attributes() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(SwaAppMapper);

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login());
    reconciler.create(&ctx, &mut state).await.unwrap();

    assert_eq!(state.phase(), Phase::Present);
    let object = dir.object(&state.id).expect("object created remotely");
    assert_eq!(object.status, ObjectStatus::Active);
    assert_eq!(state.computed.name, "template_swa");
    assert_eq!(state.computed.sign_on_mode, "BROWSER_PLUGIN");

    let mut reread: StateOf<SwaAppMapper> = ResourceState {
        id: state.id.clone(),
        ..Default::default()
    };
    reconciler.read(&ctx, &mut reread).await.unwrap();
    assert_eq!(reread.id, state.id);
    assert_eq!(reread.desired, okta_login());
    assert_eq!(reread.computed, state.computed);
}

#[tokio::test]
async fn create_runs_sub_steps_in_order() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let (_guard, logo) = logo_file(b"\x89PNG fake");

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login())
        .with_memberships(memberships(&["g1", "g2"], &["u1"]))
        .with_logo(&logo);
    Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap();

    assert_eq!(
        dir.ops(),
        vec![
            Op::Create,
            Op::SyncGroups,
            Op::SyncUsers,
            Op::UploadAsset,
            Op::Read,
            Op::ReadAssignments,
        ]
    );
    assert_eq!(state.memberships, memberships(&["g1", "g2"], &["u1"]));
    assert_eq!(dir.uploaded(&state.id).unwrap(), b"\x89PNG fake".to_vec());
    assert!(state.sync.groups_and_users && state.sync.logo);
    assert!(state.computed.logo_url.ends_with("/logo"));
}

#[tokio::test]
async fn inactive_status_is_passed_at_creation() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());

    let mut desired = okta_login();
    desired.status = Activation::Inactive;
    let mut state = StateOf::<SwaAppMapper>::planned(desired);
    Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap();

    assert_eq!(dir.object(&state.id).unwrap().status, ObjectStatus::Inactive);
    assert_eq!(dir.count(Op::SetActivation), 0);
    assert_eq!(state.desired.status, Activation::Inactive);
}

#[tokio::test]
async fn group_sync_failure_is_partial_success() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let (_guard, logo) = logo_file(b"logo");
    dir.fail(Op::SyncGroups);

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login())
        .with_memberships(memberships(&["g1"], &[]))
        .with_logo(&logo);
    let err = Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap_err();

    assert!(err.is_partial_success());
    assert_eq!(err.step(), Some(Step::HandleGroupsAndUsers));
    assert!(
        err.to_string()
            .contains("failed to handle groups and users for SWA application"),
        "unexpected message: {err}"
    );
    assert!(!state.id.is_empty(), "identifier must be kept");
    assert!(dir.object(&state.id).is_some());
    assert_eq!(dir.count(Op::UploadAsset), 0);
    assert!(!state.sync.groups_and_users);
}

#[tokio::test]
async fn create_failure_leaves_state_absent() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    dir.fail(Op::Create);

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login());
    let err = Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap_err();

    assert!(!err.is_partial_success());
    assert_eq!(err.step(), Some(Step::Create));
    assert!(state.is_absent());
    assert_eq!(dir.ops(), vec![Op::Create]);
}

#[tokio::test]
async fn missing_logo_file_is_partial_success() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());

    let mut state =
        StateOf::<SwaAppMapper>::planned(okta_login()).with_logo("/nonexistent/logo.png");
    let err = Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap_err();

    assert!(err.is_partial_success());
    assert_eq!(err.step(), Some(Step::UploadLogo));
    assert!(!state.id.is_empty());
    assert_eq!(dir.count(Op::UploadAsset), 0);
}

#[tokio::test]
async fn read_of_deleted_object_clears_state() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let mut state = created_app(&dir, &ctx).await;

    dir.remove(&state.id);
    Reconciler::new(SwaAppMapper)
        .read(&ctx, &mut state)
        .await
        .unwrap();

    assert!(state.is_absent());
    assert_eq!(dir.count(Op::ReadAssignments), 0);
}

#[tokio::test]
async fn read_picks_up_out_of_band_assignment_changes() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let mut state = created_app(&dir, &ctx).await;

    dir.sync_group_assignments(&state.id, &set(&["g9"]))
        .await
        .unwrap();

    Reconciler::new(SwaAppMapper)
        .read(&ctx, &mut state)
        .await
        .unwrap();
    assert_eq!(state.memberships, memberships(&["g9"], &["u1"]));
}

#[tokio::test]
async fn status_change_calls_activation_exactly_once() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(SwaAppMapper);
    let prior = created_app(&dir, &ctx).await;

    let mut first = prior.clone();
    first.desired.status = Activation::Inactive;
    reconciler.update(&ctx, &prior, &mut first).await.unwrap();

    assert_eq!(dir.count(Op::SetActivation), 1);
    assert_eq!(dir.object(&prior.id).unwrap().status, ObjectStatus::Inactive);
    assert_eq!(first.desired.status, Activation::Inactive);

    // Applying the same configuration again must not touch sub-resources.
    let mut second = first.clone();
    reconciler.update(&ctx, &first, &mut second).await.unwrap();

    assert_eq!(dir.count(Op::SetActivation), 1);
    assert_eq!(dir.count(Op::SyncGroups), 0);
    assert_eq!(dir.count(Op::SyncUsers), 0);
    assert_eq!(dir.count(Op::UploadAsset), 0);
    assert_eq!(dir.count(Op::Update), 2);
    assert_eq!(second, first);
}

#[tokio::test]
async fn changed_memberships_are_synced_on_update() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let prior = created_app(&dir, &ctx).await;

    let mut planned = prior.clone().with_memberships(memberships(&["g2"], &[]));
    Reconciler::new(SwaAppMapper)
        .update(&ctx, &prior, &mut planned)
        .await
        .unwrap();

    assert_eq!(dir.count(Op::SyncGroups), 1);
    assert_eq!(dir.count(Op::SyncUsers), 1);
    assert_eq!(dir.assignments(&prior.id), memberships(&["g2"], &[]));
    assert_eq!(planned.memberships, memberships(&["g2"], &[]));
}

#[tokio::test]
async fn unfinished_membership_sync_is_retried_on_update() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(SwaAppMapper);
    dir.fail(Op::SyncUsers);

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login())
        .with_memberships(memberships(&["g1"], &["u1"]));
    let err = reconciler.create(&ctx, &mut state).await.unwrap_err();
    assert!(err.is_partial_success());

    dir.recover(Op::SyncUsers);
    dir.clear_calls();
    let prior = state.clone();
    let mut planned = state;
    reconciler.update(&ctx, &prior, &mut planned).await.unwrap();

    assert_eq!(dir.count(Op::SyncUsers), 1);
    assert!(planned.sync.groups_and_users);
    assert_eq!(dir.assignments(&prior.id), memberships(&["g1"], &["u1"]));
}

#[tokio::test]
async fn failed_logo_upload_restores_previous_logo() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(SwaAppMapper);
    let (_a, logo_a) = logo_file(b"a");
    let (_b, logo_b) = logo_file(b"b");

    let mut prior = StateOf::<SwaAppMapper>::planned(okta_login()).with_logo(&logo_a);
    reconciler.create(&ctx, &mut prior).await.unwrap();

    dir.fail(Op::UploadAsset);
    let mut planned = prior.clone().with_logo(&logo_b);
    let err = reconciler
        .update(&ctx, &prior, &mut planned)
        .await
        .unwrap_err();

    assert!(err.is_partial_success());
    assert_eq!(err.step(), Some(Step::UploadLogo));
    assert_eq!(planned.logo.as_deref(), Some(logo_a.as_str()));
    assert_eq!(planned.id, prior.id);
    assert_eq!(dir.uploaded(&prior.id).unwrap(), b"a".to_vec());
}

#[tokio::test]
async fn logo_left_behind_by_partial_create_is_uploaded_on_next_apply() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(SwaAppMapper);
    let (_guard, logo) = logo_file(b"logo");
    dir.fail(Op::SyncGroups);

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login())
        .with_memberships(memberships(&["g1"], &[]))
        .with_logo(&logo);
    let err = reconciler.create(&ctx, &mut state).await.unwrap_err();
    assert!(err.is_partial_success());
    assert!(!state.sync.logo);

    // Same configuration applied again.
    dir.recover(Op::SyncGroups);
    let prior = state.clone();
    let mut planned = state;
    reconciler.update(&ctx, &prior, &mut planned).await.unwrap();

    assert_eq!(dir.count(Op::UploadAsset), 1);
    assert_eq!(dir.uploaded(&prior.id).unwrap(), b"logo".to_vec());
    assert!(planned.sync.groups_and_users && planned.sync.logo);

    // Once uploaded, the unchanged logo is left alone.
    let mut again = planned.clone();
    reconciler.update(&ctx, &planned, &mut again).await.unwrap();
    assert_eq!(dir.count(Op::UploadAsset), 1);
}

#[tokio::test]
async fn create_without_assignments_skips_membership_sync() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login());
    Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap();

    assert_eq!(dir.ops(), vec![Op::Create, Op::Read, Op::ReadAssignments]);
    assert!(state.sync.groups_and_users);
    assert!(state.memberships.is_empty());
}

#[tokio::test]
async fn created_object_missing_on_read_back_keeps_identifier() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    dir.miss_reads();

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login())
        .with_memberships(memberships(&["g1"], &[]));
    let err = Reconciler::new(SwaAppMapper)
        .create(&ctx, &mut state)
        .await
        .unwrap_err();

    assert!(err.is_partial_success());
    assert_eq!(err.step(), Some(Step::Read));
    assert!(!state.id.is_empty());
    assert!(dir.object(&state.id).is_some());
    assert!(state.sync.groups_and_users);
}

#[tokio::test]
async fn update_failure_is_not_partial_success() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let prior = created_app(&dir, &ctx).await;
    dir.fail(Op::Update);

    let mut planned = prior.clone();
    planned.desired.label = "Renamed".to_string();
    let err = Reconciler::new(SwaAppMapper)
        .update(&ctx, &prior, &mut planned)
        .await
        .unwrap_err();

    assert!(!err.is_partial_success());
    assert_eq!(err.step(), Some(Step::Update));
    assert_eq!(dir.ops(), vec![Op::Update]);
}

#[tokio::test]
async fn status_failure_after_update_is_partial_success() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let prior = created_app(&dir, &ctx).await;
    dir.fail(Op::SetActivation);

    let mut planned = prior.clone();
    planned.desired.status = Activation::Inactive;
    let err = Reconciler::new(SwaAppMapper)
        .update(&ctx, &prior, &mut planned)
        .await
        .unwrap_err();

    assert!(err.is_partial_success());
    assert_eq!(err.step(), Some(Step::SetStatus));
    assert!(err.to_string().contains("failed to set status for SWA application"));
}

#[tokio::test]
async fn delete_of_already_deleted_object_succeeds() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let mut state = created_app(&dir, &ctx).await;

    dir.remove(&state.id);
    Reconciler::new(SwaAppMapper)
        .delete(&ctx, &mut state)
        .await
        .unwrap();

    assert!(state.is_absent());
    assert_eq!(dir.count(Op::Delete), 1);
}

#[tokio::test]
async fn delete_of_absent_state_makes_no_call() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login());
    Reconciler::new(SwaAppMapper)
        .delete(&ctx, &mut state)
        .await
        .unwrap();

    assert!(dir.calls().is_empty());
}

#[tokio::test]
async fn delete_surfaces_other_errors() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let mut state = created_app(&dir, &ctx).await;
    dir.fail(Op::Delete);

    let err = Reconciler::new(SwaAppMapper)
        .delete(&ctx, &mut state)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProvisionerError::RemoteCall {
            step: Step::Delete,
            ..
        }
    ));
    assert!(!state.is_absent());
}

#[tokio::test]
async fn delete_removes_object_and_assignments() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let mut state = created_app(&dir, &ctx).await;
    let id = state.id.clone();

    Reconciler::new(SwaAppMapper)
        .delete(&ctx, &mut state)
        .await
        .unwrap();

    assert!(state.is_absent());
    assert!(dir.object(&id).is_none());
    assert!(dir.assignments(&id).is_empty());
}

#[tokio::test]
async fn gate_rejects_policy_on_classic_org_without_remote_calls() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(AccessPolicyMapper);

    let mut state = StateOf::<AccessPolicyMapper>::planned(AccessPolicy {
        name: "Web apps".to_string(),
        ..Default::default()
    });
    let err = reconciler.create(&ctx, &mut state).await.unwrap_err();
    assert!(matches!(err, ProvisionerError::FeatureUnavailable { .. }));
    assert!(err.to_string().contains("Identity Engine"));

    state.id = "rst1".to_string();
    assert!(reconciler.read(&ctx, &mut state).await.is_err());
    assert!(reconciler.delete(&ctx, &mut state).await.is_err());
    assert_eq!(state.id, "rst1");

    assert!(dir.calls().is_empty());
}

#[tokio::test]
async fn access_policy_lifecycle_on_identity_engine_org() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), oie_org());
    let reconciler = Reconciler::new(AccessPolicyMapper);

    let mut state = StateOf::<AccessPolicyMapper>::planned(AccessPolicy {
        name: "Web apps".to_string(),
        description: "Policy for web apps".to_string(),
        status: Activation::Active,
    });
    reconciler.create(&ctx, &mut state).await.unwrap();
    assert!(!state.id.is_empty());
    assert_eq!(state.desired.name, "Web apps");
    // Policies have no assignments or logo.
    assert_eq!(dir.count(Op::SyncGroups), 0);
    assert_eq!(dir.count(Op::ReadAssignments), 0);

    let prior = state.clone();
    let mut planned = state.clone();
    planned.desired.description = "Updated".to_string();
    reconciler.update(&ctx, &prior, &mut planned).await.unwrap();
    assert_eq!(planned.desired.description, "Updated");

    reconciler.delete(&ctx, &mut planned).await.unwrap();
    assert!(planned.is_absent());
    assert!(dir.object(&prior.id).is_none());
}

#[tokio::test]
async fn cancellation_aborts_in_flight_call() {
    let dir = FakeDirectory::new();
    dir.hang(Op::Create);
    let token = CancellationToken::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org()).with_cancellation(token.clone());
    let reconciler = Reconciler::new(SwaAppMapper);

    let mut state = StateOf::<SwaAppMapper>::planned(okta_login());
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    };
    let (result, ()) = tokio::join!(reconciler.create(&ctx, &mut state), cancel);

    let err = result.unwrap_err();
    assert!(matches!(err, ProvisionerError::Cancelled { step: Step::Create }));
    assert!(state.is_absent());
    assert_eq!(dir.ops(), vec![Op::Create]);
}

#[tokio::test]
async fn cancelled_context_makes_no_further_calls() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let mut state = created_app(&dir, &ctx).await;

    ctx.cancellation().cancel();
    let err = Reconciler::new(SwaAppMapper)
        .read(&ctx, &mut state)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionerError::Cancelled { step: Step::Read }));
    assert!(!state.is_absent());
}

#[tokio::test]
async fn import_adopts_existing_object() {
    let dir = FakeDirectory::new();
    let ctx = ReconcileContext::new(dir.clone(), classic_org());
    let reconciler = Reconciler::new(SwaAppMapper);
    let created = created_app(&dir, &ctx).await;

    let imported = reconciler.import(&ctx, &created.id).await.unwrap();
    assert_eq!(imported.id, created.id);
    assert_eq!(imported.desired, created.desired);
    assert_eq!(imported.memberships, created.memberships);
    assert!(imported.sync.groups_and_users);

    let err = reconciler.import(&ctx, "0oa-missing").await.unwrap_err();
    assert!(matches!(err, ProvisionerError::ResourceNotFound { .. }));
}
