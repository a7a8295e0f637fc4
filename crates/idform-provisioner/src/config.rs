use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use idform_core::models::{Feature, OrgContext, OrgPipeline};
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Operation, ProvisionerError};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const ENV_ORG_NAME: &str = "IDFORM_ORG_NAME";
pub const ENV_BASE_URL: &str = "IDFORM_BASE_URL";
pub const ENV_API_TOKEN: &str = "IDFORM_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Organization subdomain, e.g. "dev-123456".
    pub org_name: String,
    /// Service domain, e.g. "okta.com".
    pub base_url: String,
    pub credentials: CredentialSource,
    #[serde(default)]
    pub pipeline: OrgPipeline,
    /// Features enabled on top of what the pipeline implies.
    #[serde(default)]
    pub features: BTreeSet<Feature>,
    /// Added in v1.
    #[serde(default)]
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    ApiToken {
        token: String,
    },
    PrivateKey {
        client_id: String,
        private_key_path: String,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

/// Upper bound on each entry point. The reconciler itself never times out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub create: SignedDuration,
    pub read: SignedDuration,
    pub update: SignedDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<SignedDuration>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: SignedDuration::from_hours(1),
            read: SignedDuration::from_hours(1),
            update: SignedDuration::from_hours(1),
            delete: None,
        }
    }
}

impl Timeouts {
    pub fn limit(&self, operation: Operation) -> Option<Duration> {
        let bound = match operation {
            Operation::Create => Some(self.create),
            Operation::Read => Some(self.read),
            Operation::Update => Some(self.update),
            Operation::Delete => self.delete,
        };
        bound.map(|d| d.unsigned_abs())
    }
}

/// Redacted config info safe to log or display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub org_url: String,
    pub pipeline: OrgPipeline,
    pub credential_type: String,
    pub token_hint: Option<String>,
    pub client_id: Option<String>,
}

impl ProviderConfig {
    pub fn new(
        org_name: impl Into<String>,
        base_url: impl Into<String>,
        credentials: CredentialSource,
    ) -> Self {
        Self {
            config_version: CURRENT_VERSION,
            org_name: org_name.into(),
            base_url: base_url.into(),
            credentials,
            pipeline: OrgPipeline::default(),
            features: BTreeSet::new(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ProvisionerError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProvisionerError::Config(format!("failed to read config at {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse, migrate to [`CURRENT_VERSION`], and validate.
    pub fn from_json_str(contents: &str) -> Result<Self, ProvisionerError> {
        // Parse as raw JSON so we can run migrations before deserializing.
        let json: serde_json::Value = serde_json::from_str(contents)?;
        let on_disk_version = json
            .get("config_version")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;

        let migrated = migrate(json, on_disk_version)?;
        let config: ProviderConfig = serde_json::from_value(migrated)?;
        config.validate()?;
        Ok(config)
    }

    /// Write atomically (tmp + rename), always stamped with the current version.
    pub fn save(&self, path: &Path) -> Result<(), ProvisionerError> {
        let mut stamped = self.clone();
        stamped.config_version = CURRENT_VERSION;

        let json = serde_json::to_vec_pretty(&stamped)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;

        // Credentials live in this file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, path)?;

        tracing::debug!(path = %path.display(), "provider config saved");
        Ok(())
    }

    /// Override fields from `IDFORM_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(org_name) = lookup(ENV_ORG_NAME) {
            self.org_name = org_name;
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.credentials = CredentialSource::ApiToken { token };
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionerError> {
        if self.org_name.trim().is_empty() {
            return Err(ProvisionerError::Config("org_name must not be empty".into()));
        }
        match &self.credentials {
            CredentialSource::ApiToken { token } if token.is_empty() => {
                return Err(ProvisionerError::Config("api token must not be empty".into()));
            }
            CredentialSource::PrivateKey { client_id, .. } if client_id.is_empty() => {
                return Err(ProvisionerError::Config("client_id must not be empty".into()));
            }
            _ => {}
        }
        for (name, bound) in [
            ("create", Some(self.timeouts.create)),
            ("read", Some(self.timeouts.read)),
            ("update", Some(self.timeouts.update)),
            ("delete", self.timeouts.delete),
        ] {
            if bound.is_some_and(|d| d.is_negative() || d.is_zero()) {
                return Err(ProvisionerError::Config(format!(
                    "{name} timeout must be positive"
                )));
            }
        }
        self.org_url().map(|_| ())
    }

    pub fn org_url(&self) -> Result<Url, ProvisionerError> {
        let raw = format!("https://{}.{}", self.org_name, self.base_url);
        Url::parse(&raw).map_err(|e| ProvisionerError::Config(format!("invalid org URL {raw}: {e}")))
    }

    pub fn org_context(&self) -> OrgContext {
        self.features
            .iter()
            .fold(OrgContext::new(&self.org_name, self.pipeline), |org, f| {
                org.with_feature(*f)
            })
    }

    pub fn info(&self) -> ConfigInfo {
        let (credential_type, token_hint, client_id) = match &self.credentials {
            CredentialSource::ApiToken { token } => {
                let hint = token
                    .get(token.len().saturating_sub(4)..)
                    .filter(|_| token.len() > 8)
                    .map(|tail| format!("****{tail}"));
                ("api_token".to_string(), hint, None)
            }
            CredentialSource::PrivateKey { client_id, .. } => {
                ("private_key".to_string(), None, Some(client_id.clone()))
            }
        };

        ConfigInfo {
            org_url: self
                .org_url()
                .map(|u| u.to_string())
                .unwrap_or_default(),
            pipeline: self.pipeline,
            credential_type,
            token_hint,
            client_id,
        }
    }
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(
    mut json: serde_json::Value,
    from_version: u32,
) -> Result<serde_json::Value, ProvisionerError> {
    if from_version > CURRENT_VERSION {
        return Err(ProvisionerError::Config(format!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }

    // v0 → v1: add timeouts with one-hour defaults
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ProvisionerError::Config("config is not a JSON object".into()))?;
        if !obj.contains_key("timeouts") {
            obj.insert("timeouts".to_string(), serde_json::to_value(Timeouts::default())?);
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added timeouts)");
    }

    Ok(json)
}
