use idform_core::models::{
    AppAccessibility, AppCredentials, AppHide, AppNotes, AppVisibility, ObjectBody, ObjectType,
    RemoteObject, SignOnMode, SwaApplication, SwaSettings, SwaSettingsApp,
    UserNameTemplate, LOGO_LINK, TEMPLATE_SWA,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::mapper::Mapper;
use crate::mappers::non_empty;
use crate::schema::{AttributeSchema, Effect, ResourceSchema};
use crate::status::Activation;

pub const DEFAULT_USER_NAME_TEMPLATE: &str = "${source.login}";
pub const DEFAULT_USER_NAME_TEMPLATE_TYPE: &str = "BUILT_IN";

/// Declared attributes of an `okta_app_swa` resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaApp {
    /// Display name.
    pub label: String,
    /// Catalog app to instantiate; empty for a custom SWA app.
    pub preconfigured_app: String,
    pub button_field: String,
    pub username_field: String,
    pub password_field: String,
    pub url: String,
    pub url_regex: String,
    pub checkbox: String,
    pub redirect_url: String,
    pub status: Activation,
    pub accessibility: Accessibility,
    pub visibility: Visibility,
    pub notes: Notes,
    pub user_name_template: UserNameTemplateSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accessibility {
    pub self_service: bool,
    pub error_redirect_url: String,
    pub login_redirect_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub auto_submit_toolbar: bool,
    pub hide_ios: bool,
    pub hide_web: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notes {
    pub admin_note: String,
    pub enduser_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserNameTemplateSpec {
    pub template: String,
    #[serde(rename = "type")]
    pub template_type: String,
    pub suffix: String,
    pub push_status: String,
}

impl Default for UserNameTemplateSpec {
    fn default() -> Self {
        Self {
            template: DEFAULT_USER_NAME_TEMPLATE.to_string(),
            template_type: DEFAULT_USER_NAME_TEMPLATE_TYPE.to_string(),
            suffix: String::new(),
            push_status: String::new(),
        }
    }
}

/// Server-assigned attributes of an `okta_app_swa` resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaAppComputed {
    pub name: String,
    pub sign_on_mode: String,
    pub logo_url: String,
}

pub struct SwaAppMapper;

impl Mapper for SwaAppMapper {
    type Desired = SwaApp;
    type Computed = SwaAppComputed;

    fn type_name(&self) -> &'static str {
        "okta_app_swa"
    }

    fn label(&self) -> &'static str {
        "SWA application"
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Application
    }

    fn manages_sub_resources(&self) -> bool {
        true
    }

    fn to_remote_shape(&self, desired: &SwaApp) -> ObjectBody {
        // A preconfigured app may offer several sign-on modes; pin it to
        // AUTO_LOGIN so the template does not pick one for us.
        let (name, sign_on_mode) = if desired.preconfigured_app.is_empty() {
            (TEMPLATE_SWA.to_string(), SignOnMode::BrowserPlugin)
        } else {
            (desired.preconfigured_app.clone(), SignOnMode::AutoLogin)
        };

        ObjectBody::SwaApplication(SwaApplication {
            name,
            label: desired.label.clone(),
            sign_on_mode,
            settings: SwaSettings {
                app: SwaSettingsApp {
                    button_field: non_empty(&desired.button_field),
                    username_field: non_empty(&desired.username_field),
                    password_field: non_empty(&desired.password_field),
                    url: non_empty(&desired.url),
                    login_url_regex: non_empty(&desired.url_regex),
                    redirect_url: non_empty(&desired.redirect_url),
                    checkbox: non_empty(&desired.checkbox),
                },
                notes: Some(AppNotes {
                    admin: non_empty(&desired.notes.admin_note),
                    enduser: non_empty(&desired.notes.enduser_note),
                }),
            },
            visibility: Some(AppVisibility {
                auto_submit_toolbar: desired.visibility.auto_submit_toolbar,
                hide: AppHide {
                    ios: desired.visibility.hide_ios,
                    web: desired.visibility.hide_web,
                },
            }),
            accessibility: Some(AppAccessibility {
                self_service: desired.accessibility.self_service,
                error_redirect_url: non_empty(&desired.accessibility.error_redirect_url),
                login_redirect_url: non_empty(&desired.accessibility.login_redirect_url),
            }),
            credentials: Some(AppCredentials {
                user_name_template: Some(UserNameTemplate {
                    template: desired.user_name_template.template.clone(),
                    template_type: desired.user_name_template.template_type.clone(),
                    suffix: non_empty(&desired.user_name_template.suffix),
                    push_status: non_empty(&desired.user_name_template.push_status),
                }),
            }),
        })
    }

    fn from_remote_shape(&self, object: &RemoteObject) -> (SwaApp, SwaAppComputed) {
        let Some(app) = object.as_swa_application() else {
            tracing::warn!(id = %object.id, object_type = %object.object_type(), "not a SWA application");
            return Default::default();
        };

        let settings = &app.settings.app;
        let notes = app.settings.notes.clone().unwrap_or_default();
        let visibility = app.visibility.clone().unwrap_or_default();
        let accessibility = app.accessibility.clone().unwrap_or_default();
        let user_name_template = app
            .credentials
            .as_ref()
            .and_then(|c| c.user_name_template.as_ref())
            .map(|t| UserNameTemplateSpec {
                template: t.template.clone(),
                template_type: t.template_type.clone(),
                suffix: t.suffix.clone().unwrap_or_default(),
                push_status: t.push_status.clone().unwrap_or_default(),
            })
            .unwrap_or_default();

        let desired = SwaApp {
            label: app.label.clone(),
            // Only a custom app is both named template_swa and in
            // BROWSER_PLUGIN mode; anything else came from the catalog.
            preconfigured_app: if app.name == TEMPLATE_SWA
                && app.sign_on_mode == SignOnMode::BrowserPlugin
            {
                String::new()
            } else {
                app.name.clone()
            },
            button_field: settings.button_field.clone().unwrap_or_default(),
            username_field: settings.username_field.clone().unwrap_or_default(),
            password_field: settings.password_field.clone().unwrap_or_default(),
            url: settings.url.clone().unwrap_or_default(),
            url_regex: settings.login_url_regex.clone().unwrap_or_default(),
            checkbox: settings.checkbox.clone().unwrap_or_default(),
            redirect_url: settings.redirect_url.clone().unwrap_or_default(),
            status: Activation::from_status(&object.status),
            accessibility: Accessibility {
                self_service: accessibility.self_service,
                error_redirect_url: accessibility.error_redirect_url.unwrap_or_default(),
                login_redirect_url: accessibility.login_redirect_url.unwrap_or_default(),
            },
            visibility: Visibility {
                auto_submit_toolbar: visibility.auto_submit_toolbar,
                hide_ios: visibility.hide.ios,
                hide_web: visibility.hide.web,
            },
            notes: Notes {
                admin_note: notes.admin.unwrap_or_default(),
                enduser_note: notes.enduser.unwrap_or_default(),
            },
            user_name_template,
        };

        let computed = SwaAppComputed {
            name: app.name.clone(),
            sign_on_mode: app.sign_on_mode.as_str().to_string(),
            logo_url: object.links.href(LOGO_LINK).unwrap_or_default().to_string(),
        };

        (desired, computed)
    }

    fn activation(&self, desired: &SwaApp) -> Activation {
        desired.status
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.type_name(), "Secure Web Authentication application")
            .with_attribute(AttributeSchema::required_string("label").describe("Display name"))
            .with_attribute(
                AttributeSchema::optional_string("preconfigured_app")
                    .describe("Preconfigured app name"),
            )
            .with_attribute(
                AttributeSchema::optional_string("button_field").describe("Login button field"),
            )
            .with_attribute(
                AttributeSchema::optional_string("username_field")
                    .describe("Login username field"),
            )
            .with_attribute(
                AttributeSchema::optional_string("password_field")
                    .describe("Login password field"),
            )
            .with_attribute(
                AttributeSchema::optional_string("url")
                    .describe("Login URL")
                    .url(),
            )
            .with_attribute(
                AttributeSchema::optional_string("url_regex")
                    .describe("A regex that further restricts URL to the specified regex"),
            )
            .with_attribute(
                AttributeSchema::optional_string("checkbox").describe("CSS selector for the checkbox"),
            )
            .with_attribute(
                AttributeSchema::optional_string("redirect_url")
                    .describe("URL to use if the login page redirects elsewhere"),
            )
            .with_attribute(
                AttributeSchema::optional_string("status")
                    .describe("Status of the application")
                    .one_of(["ACTIVE", "INACTIVE"])
                    .default_value(json!("ACTIVE"))
                    .effect(Effect::OptionalComputed),
            )
            .with_attribute(AttributeSchema::object(
                "accessibility",
                vec![
                    AttributeSchema::optional_bool("self_service"),
                    AttributeSchema::optional_string("error_redirect_url").url(),
                    AttributeSchema::optional_string("login_redirect_url").url(),
                ],
            ))
            .with_attribute(AttributeSchema::object(
                "visibility",
                vec![
                    AttributeSchema::optional_bool("auto_submit_toolbar"),
                    AttributeSchema::optional_bool("hide_ios"),
                    AttributeSchema::optional_bool("hide_web"),
                ],
            ))
            .with_attribute(AttributeSchema::object(
                "notes",
                vec![
                    AttributeSchema::optional_string("admin_note"),
                    AttributeSchema::optional_string("enduser_note"),
                ],
            ))
            .with_attribute(AttributeSchema::object(
                "user_name_template",
                vec![
                    AttributeSchema::optional_string("template")
                        .default_value(json!(DEFAULT_USER_NAME_TEMPLATE)),
                    AttributeSchema::optional_string("type")
                        .one_of(["NONE", "CUSTOM", "BUILT_IN"])
                        .default_value(json!(DEFAULT_USER_NAME_TEMPLATE_TYPE)),
                    AttributeSchema::optional_string("suffix"),
                    AttributeSchema::optional_string("push_status")
                        .one_of(["PUSH", "DONT_PUSH", "NOT_CONFIGURED"]),
                ],
            ))
            .with_attribute(
                AttributeSchema::optional_string("logo").describe("Local path to a logo image"),
            )
            .with_attribute(
                AttributeSchema::string_set("groups").describe("Groups assigned to the app"),
            )
            .with_attribute(
                AttributeSchema::string_set("users").describe("Users assigned to the app"),
            )
            .with_attribute(AttributeSchema::computed_string("name"))
            .with_attribute(AttributeSchema::computed_string("sign_on_mode"))
            .with_attribute(
                AttributeSchema::computed_string("logo_url").describe("URL of the uploaded logo"),
            )
    }
}

