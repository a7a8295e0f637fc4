pub mod access_policy;
pub mod app_swa;

pub use access_policy::{AccessPolicy, AccessPolicyComputed, AccessPolicyMapper};
pub use app_swa::{
    Accessibility, Notes, SwaApp, SwaAppComputed, SwaAppMapper, UserNameTemplateSpec, Visibility,
};

/// Empty strings are "not set" on the wire.
pub(crate) fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
