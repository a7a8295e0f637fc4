//! Declarative schema surface consumed by the IaC engine.
//!
//! Each resource type publishes a table of `{name: effect}` attributes.
//! The same table validates incoming configuration before any
//! reconciliation runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    String,
    Bool,
    Int,
    StringSet,
    Object,
}

/// Who may set an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Required,
    Optional,
    /// Server-assigned; never set from configuration.
    Computed,
    /// Optional in configuration, filled from the server when omitted.
    OptionalComputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub name: String,
    pub kind: AttrKind,
    pub effect: Effect,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    /// Value must parse as an http(s) URL.
    #[serde(default)]
    pub url: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<AttributeSchema>,
}

impl AttributeSchema {
    pub fn new(name: &str, kind: AttrKind, effect: Effect) -> Self {
        Self {
            name: name.to_string(),
            kind,
            effect,
            description: String::new(),
            allowed: vec![],
            url: false,
            default: None,
            nested: vec![],
        }
    }

    pub fn required_string(name: &str) -> Self {
        Self::new(name, AttrKind::String, Effect::Required)
    }

    pub fn optional_string(name: &str) -> Self {
        Self::new(name, AttrKind::String, Effect::Optional)
    }

    pub fn computed_string(name: &str) -> Self {
        Self::new(name, AttrKind::String, Effect::Computed)
    }

    pub fn optional_bool(name: &str) -> Self {
        Self::new(name, AttrKind::Bool, Effect::Optional)
    }

    pub fn string_set(name: &str) -> Self {
        Self::new(name, AttrKind::StringSet, Effect::Optional)
    }

    pub fn object(name: &str, nested: Vec<AttributeSchema>) -> Self {
        Self {
            nested,
            ..Self::new(name, AttrKind::Object, Effect::Optional)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    pub fn url(mut self) -> Self {
        self.url = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// e.g. "okta_app_swa"
    pub type_name: String,
    pub description: String,
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: &str, description: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            description: description.to_string(),
            attributes: vec![],
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration object against the table.
    ///
    /// Rejects unknown attributes, computed attributes set by the user,
    /// missing required attributes, values of the wrong kind, values
    /// outside the allowed set, and non-http(s) URLs. `null` counts as
    /// absent.
    pub fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        match config.as_object() {
            Some(obj) => validate_attributes(&self.attributes, obj, "", &mut diags),
            None => diags.push(Diagnostic::error(format!(
                "{} configuration must be an object",
                self.type_name
            ))),
        }
        diags
    }
}

fn validate_attributes(
    attributes: &[AttributeSchema],
    obj: &Map<String, Value>,
    prefix: &str,
    diags: &mut Vec<Diagnostic>,
) {
    for key in obj.keys() {
        if !attributes.iter().any(|a| &a.name == key) {
            let path = format!("{prefix}{key}");
            diags.push(
                Diagnostic::error(format!("unsupported attribute \"{path}\"")).with_attribute(path),
            );
        }
    }

    for attr in attributes {
        let path = format!("{prefix}{}", attr.name);
        match obj.get(&attr.name).filter(|v| !v.is_null()) {
            None if attr.effect == Effect::Required => diags.push(
                Diagnostic::error(format!("missing required attribute \"{path}\""))
                    .with_attribute(path),
            ),
            None => {}
            Some(_) if attr.effect == Effect::Computed => diags.push(
                Diagnostic::error(format!(
                    "\"{path}\" is computed by the server and cannot be set"
                ))
                .with_attribute(path),
            ),
            Some(value) => validate_value(attr, value, &path, diags),
        }
    }
}

fn validate_value(attr: &AttributeSchema, value: &Value, path: &str, diags: &mut Vec<Diagnostic>) {
    let kind_ok = match attr.kind {
        AttrKind::String => value.is_string(),
        AttrKind::Bool => value.is_boolean(),
        AttrKind::Int => value.is_i64() || value.is_u64(),
        AttrKind::StringSet => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        AttrKind::Object => value.is_object(),
    };
    if !kind_ok {
        diags.push(
            Diagnostic::error(format!("\"{path}\" must be of type {:?}", attr.kind))
                .with_attribute(path),
        );
        return;
    }

    if let Some(nested) = value.as_object().filter(|_| attr.kind == AttrKind::Object) {
        validate_attributes(&attr.nested, nested, &format!("{path}."), diags);
        return;
    }

    let Some(s) = value.as_str() else {
        return;
    };

    if !attr.allowed.is_empty() && !attr.allowed.iter().any(|a| a == s) {
        diags.push(
            Diagnostic::error(format!(
                "\"{path}\" must be one of {}, got \"{s}\"",
                attr.allowed.join(", ")
            ))
            .with_attribute(path),
        );
    }

    if attr.url && !s.is_empty() {
        match url::Url::parse(s) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => diags.push(
                Diagnostic::error(format!(
                    "\"{path}\" must use http or https, got \"{}\"",
                    parsed.scheme()
                ))
                .with_attribute(path),
            ),
            Err(e) => diags.push(
                Diagnostic::error(format!("\"{path}\" is not a valid URL: {e}"))
                    .with_attribute(path),
            ),
        }
    }
}
