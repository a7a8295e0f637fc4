use std::fmt;
use std::time::Duration;

use idform_core::models::Feature;
use idform_core::ClientError;
use thiserror::Error;

/// Sub-step of a reconciliation, named in every remote-call failure so the
/// caller knows how far the operation got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    Read,
    Update,
    Delete,
    HandleGroupsAndUsers,
    UploadLogo,
    SetStatus,
    List,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Read => "get",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::HandleGroupsAndUsers => "handle groups and users",
            Self::UploadLogo => "upload logo",
            Self::SetStatus => "set status",
            Self::List => "list",
        })
    }
}

impl Step {
    fn preposition(&self) -> &'static str {
        match self {
            Self::HandleGroupsAndUsers | Self::UploadLogo | Self::SetStatus => "for ",
            _ => "",
        }
    }
}

/// Entry point whose time bound ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("{resource} is not supported by organization '{org}': requires {feature}")]
    FeatureUnavailable {
        resource: String,
        org: String,
        feature: Feature,
    },

    #[error("resource not found: {resource_type}/{resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    #[error("{count} {resource_type} objects are named '{name}'; rename one to disambiguate")]
    Ambiguous {
        resource_type: String,
        name: String,
        count: usize,
    },

    #[error("failed to {step} {}{resource}: {message}", .step.preposition())]
    RemoteCall {
        step: Step,
        resource: String,
        message: String,
    },

    #[error("failed to read logo file {path}: {source}")]
    LogoFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The main object exists remotely but a later sub-step failed.
    /// The identifier stays recorded.
    #[error("{source} (object {id} exists but is incompletely configured)")]
    PartialSuccess {
        id: String,
        #[source]
        source: Box<ProvisionerError>,
    },

    #[error("cancelled during {step}")]
    Cancelled { step: Step },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },

    #[error("unsupported resource type: {0}")]
    UnsupportedResource(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionerError {
    /// Wrap a client failure with the sub-step and resource it hit.
    pub fn remote(step: Step, resource: &str, err: ClientError) -> Self {
        if err.is_cancelled() {
            return Self::Cancelled { step };
        }
        Self::RemoteCall {
            step,
            resource: resource.to_string(),
            message: format_err_chain(&err),
        }
    }

    /// Mark a failure that happened after the main object was mutated.
    pub fn partial(self, id: &str) -> Self {
        match self {
            already @ Self::PartialSuccess { .. } => already,
            other => Self::PartialSuccess {
                id: id.to_string(),
                source: Box::new(other),
            },
        }
    }

    pub fn is_partial_success(&self) -> bool {
        matches!(self, Self::PartialSuccess { .. })
    }

    /// The step a remote failure happened in, looking through partial
    /// success wrappers.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::RemoteCall { step, .. } | Self::Cancelled { step } => Some(*step),
            Self::LogoFile { .. } => Some(Step::UploadLogo),
            Self::PartialSuccess { source, .. } => source.step(),
            _ => None,
        }
    }
}

/// Walk the full error chain and join all causes into one string.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
