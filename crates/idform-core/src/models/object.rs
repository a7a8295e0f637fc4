use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::application::SwaApplication;
use crate::models::policy::{Policy, PolicyType};

/// Link relation under which an application exposes its logo upload target.
pub const LOGO_LINK: &str = "logo";

/// The collection an object lives in. Passed to every client call.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "policy_type", rename_all = "snake_case")]
pub enum ObjectType {
    Application,
    Policy(PolicyType),
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Application => f.write_str("application"),
            Self::Policy(policy_type) => write!(f, "policy/{policy_type}"),
        }
    }
}

/// Server-assigned lifecycle status.
///
/// Anything other than `ACTIVE`/`INACTIVE` is an intermediate state and is
/// carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectStatus {
    Active,
    Inactive,
    Other(String),
}

impl ObjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }
}

impl From<String> for ObjectStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            _ => Self::Other(s),
        }
    }
}

impl From<ObjectStatus> for String {
    fn from(status: ObjectStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Hyperlink references keyed by relation name (`logo`, `users`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    pub fn href(&self, rel: &str) -> Option<&str> {
        self.0.get(rel).map(|l| l.href.as_str())
    }

    pub fn insert(&mut self, rel: impl Into<String>, href: impl Into<String>) {
        self.0.insert(rel.into(), Link { href: href.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Subtype-specific part of an object, and the payload of create/update.
///
/// Carries no status and no identifier: both are server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum ObjectBody {
    SwaApplication(SwaApplication),
    Policy(Policy),
}

impl ObjectBody {
    pub fn name(&self) -> &str {
        match self {
            Self::SwaApplication(app) => &app.name,
            Self::Policy(policy) => &policy.name,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::SwaApplication(_) => ObjectType::Application,
            Self::Policy(policy) => ObjectType::Policy(policy.policy_type),
        }
    }
}

/// An object as it exists in the directory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Opaque identifier; empty until the first successful create.
    #[serde(default)]
    pub id: String,
    pub status: ObjectStatus,
    #[serde(flatten)]
    pub body: ObjectBody,
    #[serde(default, rename = "_links", skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl RemoteObject {
    pub fn name(&self) -> &str {
        self.body.name()
    }

    pub fn object_type(&self) -> ObjectType {
        self.body.object_type()
    }

    pub fn as_swa_application(&self) -> Option<&SwaApplication> {
        match &self.body {
            ObjectBody::SwaApplication(app) => Some(app),
            ObjectBody::Policy(_) => None,
        }
    }

    pub fn as_policy(&self) -> Option<&Policy> {
        match &self.body {
            ObjectBody::Policy(policy) => Some(policy),
            ObjectBody::SwaApplication(_) => None,
        }
    }
}
