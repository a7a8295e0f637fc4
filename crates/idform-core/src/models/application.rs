use serde::{Deserialize, Serialize};

/// Application name the service assigns to custom (non-catalog) SWA apps.
pub const TEMPLATE_SWA: &str = "template_swa";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignOnMode {
    #[default]
    BrowserPlugin,
    AutoLogin,
}

impl SignOnMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BrowserPlugin => "BROWSER_PLUGIN",
            Self::AutoLogin => "AUTO_LOGIN",
        }
    }
}

/// Secure Web Authentication application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaApplication {
    /// Catalog name: [`TEMPLATE_SWA`] or a preconfigured app's name.
    pub name: String,
    pub label: String,
    pub sign_on_mode: SignOnMode,
    pub settings: SwaSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<AppVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AppAccessibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AppCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaSettings {
    #[serde(default)]
    pub app: SwaSettingsApp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<AppNotes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwaSettingsApp {
    pub button_field: Option<String>,
    pub username_field: Option<String>,
    pub password_field: Option<String>,
    pub url: Option<String>,
    pub login_url_regex: Option<String>,
    pub redirect_url: Option<String>,
    pub checkbox: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppNotes {
    pub admin: Option<String>,
    pub enduser: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppVisibility {
    pub auto_submit_toolbar: bool,
    pub hide: AppHide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppHide {
    #[serde(rename = "iOS")]
    pub ios: bool,
    pub web: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppAccessibility {
    pub self_service: bool,
    pub error_redirect_url: Option<String>,
    pub login_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppCredentials {
    pub user_name_template: Option<UserNameTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserNameTemplate {
    pub template: String,
    #[serde(rename = "type")]
    pub template_type: String,
    pub suffix: Option<String>,
    pub push_status: Option<String>,
}
