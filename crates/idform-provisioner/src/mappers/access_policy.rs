use idform_core::models::{Feature, ObjectBody, ObjectType, Policy, PolicyType, RemoteObject};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::mapper::Mapper;
use crate::mappers::non_empty;
use crate::schema::{AttrKind, AttributeSchema, Effect, ResourceSchema};
use crate::status::Activation;

/// Declared attributes of an `okta_app_signon_policy` resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    pub name: String,
    pub description: String,
    pub status: Activation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicyComputed {
    pub priority: Option<u32>,
    pub system: bool,
}

/// App sign-on policies only exist on Identity Engine organizations.
pub struct AccessPolicyMapper;

impl Mapper for AccessPolicyMapper {
    type Desired = AccessPolicy;
    type Computed = AccessPolicyComputed;

    fn type_name(&self) -> &'static str {
        "okta_app_signon_policy"
    }

    fn label(&self) -> &'static str {
        "app sign-on policy"
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Policy(PolicyType::AccessPolicy)
    }

    fn required_feature(&self) -> Option<Feature> {
        PolicyType::AccessPolicy.required_feature()
    }

    fn to_remote_shape(&self, desired: &AccessPolicy) -> ObjectBody {
        ObjectBody::Policy(Policy {
            name: desired.name.clone(),
            policy_type: PolicyType::AccessPolicy,
            description: non_empty(&desired.description),
            priority: None,
            system: None,
        })
    }

    fn from_remote_shape(&self, object: &RemoteObject) -> (AccessPolicy, AccessPolicyComputed) {
        let Some(policy) = object.as_policy() else {
            tracing::warn!(id = %object.id, object_type = %object.object_type(), "not a policy");
            return Default::default();
        };

        (
            AccessPolicy {
                name: policy.name.clone(),
                description: policy.description.clone().unwrap_or_default(),
                status: Activation::from_status(&object.status),
            },
            AccessPolicyComputed {
                priority: policy.priority,
                system: policy.system.unwrap_or(false),
            },
        )
    }

    fn activation(&self, desired: &AccessPolicy) -> Activation {
        desired.status
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.type_name(), "Authentication policy attached to applications")
            .with_attribute(AttributeSchema::required_string("name").describe("Policy name"))
            .with_attribute(
                AttributeSchema::optional_string("description").describe("Policy description"),
            )
            .with_attribute(
                AttributeSchema::optional_string("status")
                    .one_of(["ACTIVE", "INACTIVE"])
                    .default_value(json!("ACTIVE"))
                    .effect(Effect::OptionalComputed),
            )
            .with_attribute(AttributeSchema::new("priority", AttrKind::Int, Effect::Computed))
            .with_attribute(AttributeSchema::new("system", AttrKind::Bool, Effect::Computed))
    }
}
