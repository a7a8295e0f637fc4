use idform_core::models::{Memberships, RemoteObject, LOGO_LINK};
use idform_core::ClientError;

use crate::context::ReconcileContext;
use crate::error::{ProvisionerError, Step};
use crate::gate;
use crate::mapper::{Mapper, StateOf};
use crate::state::{Phase, ResourceState, SubResourceSync};
use crate::status;

/// Drives create/read/update/delete for one resource type.
///
/// Every operation mutates the state record in place, so a failure after
/// the main object was changed still leaves its identifier recorded.
/// Nothing is retried here.
pub struct Reconciler<M> {
    mapper: M,
}

impl<M: Mapper> Reconciler<M> {
    pub fn new(mapper: M) -> Self {
        Self { mapper }
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Absent → Creating → Present.
    ///
    /// The identifier is assigned here and nowhere else. Sub-resources are
    /// synchronized in a fixed order (groups/users, then logo); a failure
    /// in either leaves the object in place and is reported as partial
    /// success.
    pub async fn create(
        &self,
        ctx: &ReconcileContext,
        state: &mut StateOf<M>,
    ) -> Result<(), ProvisionerError> {
        self.check_gate(ctx)?;

        let object_type = self.mapper.object_type();
        let payload = self.mapper.to_remote_shape(&state.desired);
        let activate = self.mapper.activation(&state.desired).is_active();

        tracing::info!(
            resource = self.mapper.type_name(),
            phase = %Phase::Creating,
            activate,
            "creating remote object"
        );
        let created = ctx
            .call(ctx.client().create_object(&object_type, &payload, activate))
            .await
            .map_err(|e| self.remote_error(Step::Create, e))?;

        state.id = created.id.clone();
        state.sync = SubResourceSync::default();
        tracing::info!(resource = self.mapper.type_name(), id = %state.id, "remote object created");

        if self.mapper.manages_sub_resources() {
            // A new object has no assignments yet.
            if !state.memberships.is_empty() {
                self.sync_memberships(ctx, &state.id, &state.memberships)
                    .await
                    .map_err(|e| e.partial(&created.id))?;
            }
            state.sync.groups_and_users = true;

            self.upload_logo(ctx, &created, state.logo.as_deref())
                .await
                .map_err(|e| e.partial(&created.id))?;
            state.sync.logo = true;
        }

        let sync = state.sync;
        self.read(ctx, state)
            .await
            .map_err(|e| e.partial(&created.id))?;

        if state.is_absent() {
            // The object was created, so the identifier must not be lost.
            state.id = created.id.clone();
            state.sync = sync;
            return Err(ProvisionerError::RemoteCall {
                step: Step::Read,
                resource: self.mapper.label().to_string(),
                message: format!("object {} not found right after creation", created.id),
            }
            .partial(&created.id));
        }
        Ok(())
    }

    /// Refresh the record from the remote object.
    ///
    /// A missing object clears the identifier and is not an error: that is
    /// how deletions made outside the engine are detected. Assignments are
    /// re-read on every call.
    pub async fn read(
        &self,
        ctx: &ReconcileContext,
        state: &mut StateOf<M>,
    ) -> Result<(), ProvisionerError> {
        self.check_gate(ctx)?;

        if state.is_absent() {
            return Ok(());
        }

        let object_type = self.mapper.object_type();
        let found = match ctx
            .call(ctx.client().read_object(&object_type, &state.id))
            .await
        {
            Ok(found) => found,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(self.remote_error(Step::Read, e)),
        };

        let Some(object) = found else {
            tracing::warn!(
                resource = self.mapper.type_name(),
                id = %state.id,
                "remote object no longer exists, removing from state"
            );
            state.clear();
            return Ok(());
        };

        let (desired, computed) = self.mapper.from_remote_shape(&object);
        state.desired = desired;
        state.computed = computed;

        if self.mapper.manages_sub_resources() {
            state.memberships = ctx
                .call(ctx.client().read_assignments(&state.id))
                .await
                .map_err(|e| self.remote_error(Step::HandleGroupsAndUsers, e))?;
        }

        Ok(())
    }

    /// Present → Updating → Present.
    ///
    /// `prior` is the last known state; `state` carries the planned
    /// attributes in and the refreshed record out. Status is reconciled with
    /// a separate call. Memberships and the logo are synced when they changed
    /// or when an earlier attempt never finished. A failed logo upload
    /// restores the previous logo path, since the remote logo is unchanged.
    pub async fn update(
        &self,
        ctx: &ReconcileContext,
        prior: &StateOf<M>,
        state: &mut StateOf<M>,
    ) -> Result<(), ProvisionerError> {
        self.check_gate(ctx)?;

        if state.id.is_empty() {
            state.id = prior.id.clone();
        }
        let id = state.id.clone();
        let object_type = self.mapper.object_type();
        let payload = self.mapper.to_remote_shape(&state.desired);

        tracing::info!(
            resource = self.mapper.type_name(),
            id = %id,
            phase = %Phase::Updating,
            "updating remote object"
        );
        let updated = ctx
            .call(ctx.client().update_object(&object_type, &id, &payload))
            .await
            .map_err(|e| self.remote_error(Step::Update, e))?;

        status::reconcile_status(
            ctx,
            &object_type,
            &id,
            &updated.status,
            self.mapper.activation(&state.desired),
            self.mapper.label(),
        )
        .await
        .map_err(|e| e.partial(&id))?;

        if self.mapper.manages_sub_resources() {
            state.sync = prior.sync;

            if state.memberships != prior.memberships || !prior.sync.groups_and_users {
                self.sync_memberships(ctx, &id, &state.memberships)
                    .await
                    .map_err(|e| e.partial(&id))?;
                state.sync.groups_and_users = true;
            } else {
                tracing::debug!(id = %id, "assignments unchanged, skipping sync");
            }

            let logo_pending = state.logo.is_some() && !prior.sync.logo;
            if state.logo != prior.logo || logo_pending {
                if let Err(e) = self.upload_logo(ctx, &updated, state.logo.as_deref()).await {
                    tracing::warn!(
                        id = %id,
                        error = %e,
                        "logo upload failed, restoring previous logo in state"
                    );
                    state.logo = prior.logo.clone();
                    return Err(e.partial(&id));
                }
                state.sync.logo = true;
            }
        }

        self.read(ctx, state).await.map_err(|e| e.partial(&id))
    }

    /// Present → Deleting → Absent.
    ///
    /// An object that is already gone counts as deleted.
    pub async fn delete(
        &self,
        ctx: &ReconcileContext,
        state: &mut StateOf<M>,
    ) -> Result<(), ProvisionerError> {
        self.check_gate(ctx)?;

        if state.is_absent() {
            return Ok(());
        }

        let object_type = self.mapper.object_type();
        tracing::info!(
            resource = self.mapper.type_name(),
            id = %state.id,
            phase = %Phase::Deleting,
            "deleting remote object"
        );
        match ctx
            .call(ctx.client().delete_object(&object_type, &state.id))
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!(id = %state.id, "remote object already deleted");
            }
            Err(e) => return Err(self.remote_error(Step::Delete, e)),
        }

        state.clear();
        Ok(())
    }

    /// Adopt an existing remote object by identifier.
    pub async fn import(
        &self,
        ctx: &ReconcileContext,
        id: &str,
    ) -> Result<StateOf<M>, ProvisionerError> {
        let mut state: StateOf<M> = ResourceState {
            id: id.to_string(),
            ..Default::default()
        };
        self.read(ctx, &mut state).await?;

        if state.is_absent() {
            return Err(ProvisionerError::ResourceNotFound {
                resource_type: self.mapper.type_name().to_string(),
                resource_id: id.to_string(),
            });
        }
        state.sync = SubResourceSync {
            groups_and_users: true,
            logo: true,
        };
        Ok(state)
    }

    fn check_gate(&self, ctx: &ReconcileContext) -> Result<(), ProvisionerError> {
        match self.mapper.required_feature() {
            Some(feature) => gate::check_feature_available(ctx.org(), feature, self.mapper.label()),
            None => Ok(()),
        }
    }

    fn remote_error(&self, step: Step, err: ClientError) -> ProvisionerError {
        ProvisionerError::remote(step, self.mapper.label(), err)
    }

    async fn sync_memberships(
        &self,
        ctx: &ReconcileContext,
        id: &str,
        memberships: &Memberships,
    ) -> Result<(), ProvisionerError> {
        tracing::info!(
            id,
            groups = memberships.groups.len(),
            users = memberships.users.len(),
            "syncing assignments"
        );
        ctx.call(ctx.client().sync_group_assignments(id, &memberships.groups))
            .await
            .map_err(|e| self.remote_error(Step::HandleGroupsAndUsers, e))?;
        ctx.call(ctx.client().sync_user_assignments(id, &memberships.users))
            .await
            .map_err(|e| self.remote_error(Step::HandleGroupsAndUsers, e))
    }

    async fn upload_logo(
        &self,
        ctx: &ReconcileContext,
        object: &RemoteObject,
        logo: Option<&str>,
    ) -> Result<(), ProvisionerError> {
        let Some(path) = logo else {
            return Ok(());
        };

        let link = object.links.href(LOGO_LINK).ok_or_else(|| ProvisionerError::RemoteCall {
            step: Step::UploadLogo,
            resource: self.mapper.label().to_string(),
            message: format!("object {} has no logo link", object.id),
        })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ProvisionerError::LogoFile {
                path: path.to_string(),
                source,
            })?;

        tracing::info!(id = %object.id, path, bytes = bytes.len(), "uploading logo");
        ctx.call(ctx.client().upload_asset(&object.id, link, bytes))
            .await
            .map_err(|e| self.remote_error(Step::UploadLogo, e))
    }
}
