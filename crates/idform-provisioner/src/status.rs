use std::fmt;

use idform_core::models::{ObjectStatus, ObjectType};
use serde::{Deserialize, Serialize};

use crate::context::ReconcileContext;
use crate::error::{ProvisionerError, Step};

/// Desired activation of an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activation {
    #[default]
    Active,
    Inactive,
}

impl Activation {
    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }

    /// Intermediate remote statuses map to `Inactive`.
    pub fn from_status(status: &ObjectStatus) -> Self {
        if status.is_active() {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    pub fn matches(&self, status: &ObjectStatus) -> bool {
        match self {
            Self::Active => *status == ObjectStatus::Active,
            Self::Inactive => *status == ObjectStatus::Inactive,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        })
    }
}

/// Issue an activate/deactivate transition iff `current` differs from
/// `desired`. Returns whether a call was made.
pub async fn reconcile_status(
    ctx: &ReconcileContext,
    object_type: &ObjectType,
    id: &str,
    current: &ObjectStatus,
    desired: Activation,
    resource: &str,
) -> Result<bool, ProvisionerError> {
    if desired.matches(current) {
        tracing::debug!(id, status = %current, "status already matches");
        return Ok(false);
    }

    tracing::info!(id, from = %current, to = %desired, "transitioning status");
    ctx.call(
        ctx.client()
            .set_activation(object_type, id, desired.is_active()),
    )
    .await
    .map_err(|e| ProvisionerError::remote(Step::SetStatus, resource, e))?;

    Ok(true)
}
