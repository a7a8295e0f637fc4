use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Capabilities not available on every organization tier.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Identity Engine pipeline (access policies, profile enrollment).
    IdentityEngine,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IdentityEngine => f.write_str("Identity Engine"),
        }
    }
}

/// Authentication pipeline an organization runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgPipeline {
    #[default]
    Classic,
    IdentityEngine,
}

/// What the reconciler knows about the organization it is talking to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    pub org_name: String,
    pub pipeline: OrgPipeline,
    #[serde(default)]
    pub features: BTreeSet<Feature>,
}

impl OrgContext {
    pub fn new(org_name: impl Into<String>, pipeline: OrgPipeline) -> Self {
        let mut features = BTreeSet::new();
        if pipeline == OrgPipeline::IdentityEngine {
            features.insert(Feature::IdentityEngine);
        }
        Self {
            org_name: org_name.into(),
            pipeline,
            features,
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}
