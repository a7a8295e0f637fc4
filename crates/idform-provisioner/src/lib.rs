//! idform-provisioner
//!
//! Declarative reconciliation core of the idform provider. Converges
//! directory-service objects (SWA applications, app sign-on policies) to a
//! declared state through a bounded sequence of remote calls.
//!
//! Public API:
//! - `Reconciler`: create/read/update/delete state machine, one per resource type
//! - `Mapper`: per-type conversion between state records and remote objects
//! - `resolve_by_key()`: find a policy by name + type
//! - `check_feature_available()`: refuse operations the organization can't support
//! - `reconcile_status()`: activate/deactivate only when status diverges
//! - `Provider`: entry points for the IaC engine, with timeouts and diagnostics

pub mod config;
pub mod context;
pub mod data_source;
pub mod diagnostics;
pub mod error;
pub mod gate;
pub mod logging;
pub mod lookup;
pub mod mapper;
pub mod mappers;
pub mod provider;
pub mod reconciler;
pub mod schema;
pub mod state;
pub mod status;

pub use crate::config::{CredentialSource, ProviderConfig, Timeouts};
pub use crate::context::ReconcileContext;
pub use crate::data_source::{PolicyData, PolicyDataSource};
pub use crate::diagnostics::{Diagnostic, Severity};
pub use crate::error::{ProvisionerError, Step};
pub use crate::gate::check_feature_available;
pub use crate::lookup::{resolve_by_key, PolicyKey};
pub use crate::mapper::{Mapper, StateOf};
pub use crate::provider::{Provider, ProviderResponse, ResourceHandler, ResourceType};
pub use crate::reconciler::Reconciler;
pub use crate::state::{Phase, ResourceState, SubResourceSync};
pub use crate::status::{reconcile_status, Activation};
