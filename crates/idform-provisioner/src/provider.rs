//! Entry points exposed to the IaC engine.
//!
//! Each call takes a state-shaped record and returns the updated record
//! plus diagnostics. Timeouts are applied here, around the reconciler.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use idform_core::models::OrgContext;
use idform_core::RemoteClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ProviderConfig, Timeouts};
use crate::context::ReconcileContext;
use crate::data_source::PolicyDataSource;
use crate::diagnostics::Diagnostic;
use crate::error::{Operation, ProvisionerError};
use crate::lookup::PolicyKey;
use crate::mapper::{Mapper, StateOf};
use crate::mappers::{AccessPolicyMapper, SwaAppMapper};
use crate::reconciler::Reconciler;
use crate::schema::ResourceSchema;
use crate::state::ResourceState;

/// The closed set of managed resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    AppSwa,
    AppSignOnPolicy,
}

impl ResourceType {
    pub const ALL: [ResourceType; 2] = [Self::AppSwa, Self::AppSignOnPolicy];

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AppSwa => SwaAppMapper.type_name(),
            Self::AppSignOnPolicy => AccessPolicyMapper.type_name(),
        }
    }
}

impl FromStr for ResourceType {
    type Err = ProvisionerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.type_name() == s)
            .ok_or_else(|| ProvisionerError::UnsupportedResource(s.to_string()))
    }
}

/// Outcome of one entry-point call. `state: None` means the resource is
/// absent and the engine should drop it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse<S> {
    pub state: Option<S>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<S> ProviderResponse<S> {
    pub fn ok(state: Option<S>) -> Self {
        Self {
            state,
            diagnostics: vec![],
        }
    }

    pub fn failed(state: Option<S>, err: &ProvisionerError) -> Self {
        Self {
            state,
            diagnostics: vec![Diagnostic::from(err)],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

impl<S: Serialize> ProviderResponse<S> {
    pub fn into_json(self) -> ProviderResponse<Value> {
        let mut diagnostics = self.diagnostics;
        let state = match self.state.map(serde_json::to_value).transpose() {
            Ok(state) => state,
            Err(e) => {
                diagnostics.push(Diagnostic::from(&ProvisionerError::from(e)));
                None
            }
        };
        ProviderResponse { state, diagnostics }
    }
}

/// Typed entry points for one resource type.
pub struct ResourceHandler<M> {
    reconciler: Reconciler<M>,
    timeouts: Timeouts,
}

impl<M: Mapper> ResourceHandler<M> {
    pub fn new(mapper: M, timeouts: Timeouts) -> Self {
        Self {
            reconciler: Reconciler::new(mapper),
            timeouts,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<M> {
        &self.reconciler
    }

    pub fn schema(&self) -> ResourceSchema {
        self.reconciler.mapper().schema()
    }

    pub async fn create(
        &self,
        ctx: &ReconcileContext,
        planned: StateOf<M>,
    ) -> ProviderResponse<StateOf<M>> {
        let mut state = planned;
        let result = bounded(
            Operation::Create,
            self.timeouts.limit(Operation::Create),
            self.reconciler.create(ctx, &mut state),
        )
        .await;

        match result {
            Ok(()) => ProviderResponse::ok(present(state)),
            // An assigned identifier must survive the failure.
            Err(e) => ProviderResponse::failed(present(state), &e),
        }
    }

    pub async fn read(
        &self,
        ctx: &ReconcileContext,
        current: StateOf<M>,
    ) -> ProviderResponse<StateOf<M>> {
        let prior = current.clone();
        let mut state = current;
        let result = bounded(
            Operation::Read,
            self.timeouts.limit(Operation::Read),
            self.reconciler.read(ctx, &mut state),
        )
        .await;

        match result {
            Ok(()) if state.is_absent() && !prior.is_absent() => ProviderResponse {
                state: None,
                diagnostics: vec![Diagnostic::warning(format!(
                    "{} {} no longer exists and was removed from state",
                    self.reconciler.mapper().label(),
                    prior.id
                ))],
            },
            Ok(()) => ProviderResponse::ok(present(state)),
            Err(e) => ProviderResponse::failed(Some(prior), &e),
        }
    }

    pub async fn update(
        &self,
        ctx: &ReconcileContext,
        prior: StateOf<M>,
        planned: StateOf<M>,
    ) -> ProviderResponse<StateOf<M>> {
        let mut state = planned;
        let result = bounded(
            Operation::Update,
            self.timeouts.limit(Operation::Update),
            self.reconciler.update(ctx, &prior, &mut state),
        )
        .await;

        match result {
            Ok(()) => ProviderResponse::ok(present(state)),
            Err(e) if e.is_partial_success() => ProviderResponse::failed(present(state), &e),
            Err(e) => ProviderResponse::failed(Some(prior), &e),
        }
    }

    pub async fn delete(
        &self,
        ctx: &ReconcileContext,
        current: StateOf<M>,
    ) -> ProviderResponse<StateOf<M>> {
        let mut state = current;
        let result = bounded(
            Operation::Delete,
            self.timeouts.limit(Operation::Delete),
            self.reconciler.delete(ctx, &mut state),
        )
        .await;

        match result {
            Ok(()) => ProviderResponse::ok(None),
            Err(e) => ProviderResponse::failed(Some(state), &e),
        }
    }

    pub async fn import(&self, ctx: &ReconcileContext, id: &str) -> ProviderResponse<StateOf<M>> {
        match self.reconciler.import(ctx, id).await {
            Ok(state) => ProviderResponse::ok(Some(state)),
            Err(e) => ProviderResponse::failed(None, &e),
        }
    }
}

fn present<D, C>(state: ResourceState<D, C>) -> Option<ResourceState<D, C>> {
    (!state.is_absent()).then_some(state)
}

async fn bounded<F>(
    operation: Operation,
    limit: Option<Duration>,
    fut: F,
) -> Result<(), ProvisionerError>
where
    F: Future<Output = Result<(), ProvisionerError>>,
{
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| ProvisionerError::Timeout { operation, after })?,
        None => fut.await,
    }
}

/// All resource handlers and data sources of the provider.
pub struct Provider {
    client: Arc<dyn RemoteClient>,
    org: OrgContext,
    app_swa: ResourceHandler<SwaAppMapper>,
    app_signon_policy: ResourceHandler<AccessPolicyMapper>,
    policy_source: PolicyDataSource,
}

impl Provider {
    pub fn new(client: Arc<dyn RemoteClient>, config: &ProviderConfig) -> Self {
        Self {
            client,
            org: config.org_context(),
            app_swa: ResourceHandler::new(SwaAppMapper, config.timeouts),
            app_signon_policy: ResourceHandler::new(AccessPolicyMapper, config.timeouts),
            policy_source: PolicyDataSource,
        }
    }

    /// A fresh context for one reconciliation, with its own cancellation token.
    pub fn context(&self) -> ReconcileContext {
        ReconcileContext::new(self.client.clone(), self.org.clone())
    }

    pub fn app_swa(&self) -> &ResourceHandler<SwaAppMapper> {
        &self.app_swa
    }

    pub fn app_signon_policy(&self) -> &ResourceHandler<AccessPolicyMapper> {
        &self.app_signon_policy
    }

    pub fn policy_data_source(&self) -> &PolicyDataSource {
        &self.policy_source
    }

    pub fn resource_schemas(&self) -> Vec<ResourceSchema> {
        vec![self.app_swa.schema(), self.app_signon_policy.schema()]
    }

    pub fn data_source_schemas(&self) -> Vec<ResourceSchema> {
        vec![self.policy_source.schema()]
    }

    /// Validate user configuration for a resource or data source type.
    pub fn validate(&self, type_name: &str, config: &Value) -> Vec<Diagnostic> {
        self.resource_schemas()
            .into_iter()
            .chain(self.data_source_schemas())
            .find(|s| s.type_name == type_name)
            .map(|s| s.validate(config))
            .unwrap_or_else(|| {
                vec![Diagnostic::from(&ProvisionerError::UnsupportedResource(
                    type_name.to_string(),
                ))]
            })
    }

    pub async fn create(
        &self,
        ctx: &ReconcileContext,
        type_name: &str,
        planned: Value,
    ) -> ProviderResponse<Value> {
        match type_name.parse::<ResourceType>() {
            Ok(ResourceType::AppSwa) => create_json(&self.app_swa, ctx, planned).await,
            Ok(ResourceType::AppSignOnPolicy) => {
                create_json(&self.app_signon_policy, ctx, planned).await
            }
            Err(e) => ProviderResponse::failed(None, &e),
        }
    }

    pub async fn read(
        &self,
        ctx: &ReconcileContext,
        type_name: &str,
        current: Value,
    ) -> ProviderResponse<Value> {
        match type_name.parse::<ResourceType>() {
            Ok(ResourceType::AppSwa) => read_json(&self.app_swa, ctx, current).await,
            Ok(ResourceType::AppSignOnPolicy) => {
                read_json(&self.app_signon_policy, ctx, current).await
            }
            Err(e) => ProviderResponse::failed(Some(current), &e),
        }
    }

    pub async fn update(
        &self,
        ctx: &ReconcileContext,
        type_name: &str,
        prior: Value,
        planned: Value,
    ) -> ProviderResponse<Value> {
        match type_name.parse::<ResourceType>() {
            Ok(ResourceType::AppSwa) => update_json(&self.app_swa, ctx, prior, planned).await,
            Ok(ResourceType::AppSignOnPolicy) => {
                update_json(&self.app_signon_policy, ctx, prior, planned).await
            }
            Err(e) => ProviderResponse::failed(Some(prior), &e),
        }
    }

    pub async fn delete(
        &self,
        ctx: &ReconcileContext,
        type_name: &str,
        current: Value,
    ) -> ProviderResponse<Value> {
        match type_name.parse::<ResourceType>() {
            Ok(ResourceType::AppSwa) => delete_json(&self.app_swa, ctx, current).await,
            Ok(ResourceType::AppSignOnPolicy) => {
                delete_json(&self.app_signon_policy, ctx, current).await
            }
            Err(e) => ProviderResponse::failed(Some(current), &e),
        }
    }

    pub async fn import(
        &self,
        ctx: &ReconcileContext,
        type_name: &str,
        id: &str,
    ) -> ProviderResponse<Value> {
        match type_name.parse::<ResourceType>() {
            Ok(ResourceType::AppSwa) => self.app_swa.import(ctx, id).await.into_json(),
            Ok(ResourceType::AppSignOnPolicy) => {
                self.app_signon_policy.import(ctx, id).await.into_json()
            }
            Err(e) => ProviderResponse::failed(None, &e),
        }
    }

    /// Read a data source. Returns a minimal `{id, name, type, status}` record.
    pub async fn read_data_source(
        &self,
        ctx: &ReconcileContext,
        type_name: &str,
        config: Value,
    ) -> ProviderResponse<Value> {
        if type_name != PolicyDataSource::TYPE_NAME {
            return ProviderResponse::failed(
                None,
                &ProvisionerError::UnsupportedResource(type_name.to_string()),
            );
        }

        let diagnostics = self.policy_source.schema().validate(&config);
        if !diagnostics.is_empty() {
            return ProviderResponse {
                state: None,
                diagnostics,
            };
        }

        let key: PolicyKey = match serde_json::from_value(config) {
            Ok(key) => key,
            Err(e) => return ProviderResponse::failed(None, &ProvisionerError::from(e)),
        };
        match self.policy_source.read(ctx, &key).await {
            Ok(data) => ProviderResponse::ok(Some(data)).into_json(),
            Err(e) => ProviderResponse::failed(None, &e),
        }
    }
}

async fn create_json<M: Mapper>(
    handler: &ResourceHandler<M>,
    ctx: &ReconcileContext,
    planned: Value,
) -> ProviderResponse<Value> {
    match serde_json::from_value::<StateOf<M>>(planned) {
        Ok(state) => handler.create(ctx, state).await.into_json(),
        Err(e) => ProviderResponse::failed(None, &ProvisionerError::from(e)),
    }
}

async fn read_json<M: Mapper>(
    handler: &ResourceHandler<M>,
    ctx: &ReconcileContext,
    current: Value,
) -> ProviderResponse<Value> {
    match serde_json::from_value::<StateOf<M>>(current.clone()) {
        Ok(state) => handler.read(ctx, state).await.into_json(),
        Err(e) => ProviderResponse::failed(Some(current), &ProvisionerError::from(e)),
    }
}

async fn update_json<M: Mapper>(
    handler: &ResourceHandler<M>,
    ctx: &ReconcileContext,
    prior: Value,
    planned: Value,
) -> ProviderResponse<Value> {
    let decoded = serde_json::from_value::<StateOf<M>>(prior.clone()).and_then(|p| {
        serde_json::from_value::<StateOf<M>>(planned).map(|planned| (p, planned))
    });
    match decoded {
        Ok((prior, planned)) => handler.update(ctx, prior, planned).await.into_json(),
        Err(e) => ProviderResponse::failed(Some(prior), &ProvisionerError::from(e)),
    }
}

async fn delete_json<M: Mapper>(
    handler: &ResourceHandler<M>,
    ctx: &ReconcileContext,
    current: Value,
) -> ProviderResponse<Value> {
    match serde_json::from_value::<StateOf<M>>(current.clone()) {
        Ok(state) => handler.delete(ctx, state).await.into_json(),
        Err(e) => ProviderResponse::failed(Some(current), &ProvisionerError::from(e)),
    }
}
