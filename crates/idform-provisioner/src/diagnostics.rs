use serde::{Deserialize, Serialize};

use crate::error::{format_err_chain, ProvisionerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Structured, human-readable message returned to the IaC engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted attribute path the message refers to, e.g. `accessibility.error_redirect_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&ProvisionerError> for Diagnostic {
    fn from(err: &ProvisionerError) -> Self {
        let diag = Diagnostic::error(err.to_string());
        match err {
            ProvisionerError::PartialSuccess { id, .. } => diag.with_detail(format!(
                "object {id} was changed remotely and is recorded in state; \
                 apply again to finish configuring it"
            )),
            ProvisionerError::FeatureUnavailable { .. } => {
                diag.with_detail("no remote call was made")
            }
            ProvisionerError::LogoFile { .. } | ProvisionerError::Io(_) => {
                diag.with_detail(format_err_chain(err))
            }
            _ => diag,
        }
    }
}
