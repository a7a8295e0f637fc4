//! Natural-key resolution for objects without a stored identifier.
//!
//! Only data-source reads go through here. Once an identifier is known,
//! reads use it: names are not stable over time.

use idform_core::models::{ObjectType, PolicyType, RemoteObject};
use serde::{Deserialize, Serialize};

use crate::context::ReconcileContext;
use crate::error::{ProvisionerError, Step};

/// `{name, type}` of a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyKey {
    pub name: String,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
}

impl PolicyKey {
    pub fn new(name: impl Into<String>, policy_type: PolicyType) -> Self {
        Self {
            name: name.into(),
            policy_type,
        }
    }
}

/// Find the one policy with exactly this name (case-sensitive) and type.
///
/// Zero matches is `ResourceNotFound`; more than one is `Ambiguous`. The
/// resolver never picks between duplicates.
pub async fn resolve_by_key(
    ctx: &ReconcileContext,
    key: &PolicyKey,
) -> Result<RemoteObject, ProvisionerError> {
    let object_type = ObjectType::Policy(key.policy_type);
    let resource = format!("{} policies", key.policy_type);

    let objects = ctx
        .call(ctx.client().list_objects_by_type(&object_type))
        .await
        .map_err(|e| ProvisionerError::remote(Step::List, &resource, e))?;

    let mut matches: Vec<RemoteObject> = objects
        .into_iter()
        .filter(|o| o.object_type() == object_type && o.name() == key.name)
        .collect();

    tracing::debug!(
        name = %key.name,
        policy_type = %key.policy_type,
        matches = matches.len(),
        "resolved policy by name"
    );

    match matches.len() {
        0 => Err(ProvisionerError::ResourceNotFound {
            resource_type: object_type.to_string(),
            resource_id: key.name.clone(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(ProvisionerError::Ambiguous {
            resource_type: key.policy_type.to_string(),
            name: key.name.clone(),
            count,
        }),
    }
}
