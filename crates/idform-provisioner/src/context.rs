use std::future::Future;
use std::sync::Arc;

use idform_core::models::OrgContext;
use idform_core::{ClientError, RemoteClient};
use tokio_util::sync::CancellationToken;

/// Everything one reconciliation needs, passed explicitly to every
/// operation: the remote client, the organization, and a cancellation
/// signal from the surrounding engine.
#[derive(Clone)]
pub struct ReconcileContext {
    client: Arc<dyn RemoteClient>,
    org: OrgContext,
    cancel: CancellationToken,
}

impl ReconcileContext {
    pub fn new(client: Arc<dyn RemoteClient>, org: OrgContext) -> Self {
        Self {
            client,
            org,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn client(&self) -> &dyn RemoteClient {
        self.client.as_ref()
    }

    pub fn org(&self) -> &OrgContext {
        &self.org
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run one remote call, failing with [`ClientError::Cancelled`] if the
    /// context is cancelled first.
    pub async fn call<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = fut => result,
        }
    }
}
