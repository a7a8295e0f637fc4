//! Capability gate.
//!
//! Runs before any operation on a resource type that not every
//! organization tier supports. A rejection makes no remote call.

use idform_core::models::{Feature, OrgContext};

use crate::error::ProvisionerError;

pub fn check_feature_available(
    org: &OrgContext,
    feature: Feature,
    resource: &str,
) -> Result<(), ProvisionerError> {
    if org.has(feature) {
        return Ok(());
    }

    tracing::warn!(
        org = %org.org_name,
        feature = %feature,
        resource,
        "feature unavailable, refusing operation"
    );
    Err(ProvisionerError::FeatureUnavailable {
        resource: resource.to_string(),
        org: org.org_name.clone(),
        feature,
    })
}
