use idform_core::models::{ObjectStatus, PolicyType};
use serde::{Deserialize, Serialize};

use crate::context::ReconcileContext;
use crate::error::ProvisionerError;
use crate::gate;
use crate::lookup::{self, PolicyKey};
use crate::schema::{AttributeSchema, ResourceSchema};

/// Result of the `okta_policy` data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    pub status: ObjectStatus,
}

/// Looks up a policy by `{name, type}`.
pub struct PolicyDataSource;

impl PolicyDataSource {
    pub const TYPE_NAME: &'static str = "okta_policy";

    pub fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(Self::TYPE_NAME, "Get a policy by name and type")
            .with_attribute(AttributeSchema::required_string("name").describe("Name of the policy"))
            .with_attribute(
                AttributeSchema::required_string("type")
                    .describe("Policy type")
                    .one_of(PolicyType::ALL.iter().map(PolicyType::as_str)),
            )
            .with_attribute(AttributeSchema::computed_string("id"))
            .with_attribute(AttributeSchema::computed_string("status"))
    }

    pub async fn read(
        &self,
        ctx: &ReconcileContext,
        key: &PolicyKey,
    ) -> Result<PolicyData, ProvisionerError> {
        if let Some(feature) = key.policy_type.required_feature() {
            gate::check_feature_available(
                ctx.org(),
                feature,
                &format!("{} policy", key.policy_type),
            )?;
        }

        let policy = lookup::resolve_by_key(ctx, key).await?;
        tracing::debug!(id = %policy.id, name = %key.name, "policy data source resolved");

        Ok(PolicyData {
            id: policy.id,
            name: key.name.clone(),
            policy_type: key.policy_type,
            status: policy.status,
        })
    }
}
