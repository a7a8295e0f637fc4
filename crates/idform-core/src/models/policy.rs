use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::org::Feature;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyType {
    OktaSignOn,
    Password,
    MfaEnroll,
    IdpDiscovery,
    AccessPolicy,
    ProfileEnrollment,
}

impl PolicyType {
    pub const ALL: [PolicyType; 6] = [
        Self::OktaSignOn,
        Self::Password,
        Self::MfaEnroll,
        Self::IdpDiscovery,
        Self::AccessPolicy,
        Self::ProfileEnrollment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OktaSignOn => "OKTA_SIGN_ON",
            Self::Password => "PASSWORD",
            Self::MfaEnroll => "MFA_ENROLL",
            Self::IdpDiscovery => "IDP_DISCOVERY",
            Self::AccessPolicy => "ACCESS_POLICY",
            Self::ProfileEnrollment => "PROFILE_ENROLLMENT",
        }
    }

    /// Feature an organization must have before policies of this type can
    /// be read or managed.
    pub fn required_feature(&self) -> Option<Feature> {
        match self {
            Self::AccessPolicy | Self::ProfileEnrollment => Some(Feature::IdentityEngine),
            _ => None,
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown policy type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server-assigned evaluation order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Set by the server on built-in policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,
}
