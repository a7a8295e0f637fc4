//! Shared fixtures for the provisioner integration tests.

#![allow(dead_code)]

pub mod fake_directory;

use idform_core::models::{
    ObjectBody, ObjectStatus, OrgContext, OrgPipeline, Policy, PolicyType, RemoteObject,
};
use idform_provisioner::mappers::SwaApp;
use idform_provisioner::Activation;

pub fn classic_org() -> OrgContext {
    OrgContext::new("dev-classic", OrgPipeline::Classic)
}

pub fn oie_org() -> OrgContext {
    OrgContext::new("dev-oie", OrgPipeline::IdentityEngine)
}

/// The "Okta Login" SWA app used across scenarios.
pub fn okta_login() -> SwaApp {
    SwaApp {
        label: "Okta Login".to_string(),
        preconfigured_app: String::new(),
        username_field: "user".to_string(),
        password_field: "pass".to_string(),
        url: "https://example.com/login".to_string(),
        status: Activation::Active,
        ..Default::default()
    }
}

pub fn policy_object(id: &str, name: &str, policy_type: PolicyType) -> RemoteObject {
    RemoteObject {
        id: id.to_string(),
        status: ObjectStatus::Active,
        body: ObjectBody::Policy(Policy {
            name: name.to_string(),
            policy_type,
            description: None,
            priority: Some(1),
            system: Some(false),
        }),
        links: Default::default(),
    }
}

/// Write a small fake image and return its path. The file lives as long as
/// the returned guard.
pub fn logo_file(bytes: &[u8]) -> (tempfile::NamedTempFile, String) {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("create temp logo");
    file.write_all(bytes).expect("write temp logo");
    let path = file.path().display().to_string();
    (file, path)
}
