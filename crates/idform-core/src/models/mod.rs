pub mod application;
pub mod assignment;
pub mod object;
pub mod org;
pub mod policy;

pub use application::{
    AppAccessibility, AppCredentials, AppHide, AppNotes, AppVisibility, SignOnMode,
    SwaApplication, SwaSettings, SwaSettingsApp, UserNameTemplate, TEMPLATE_SWA,
};
pub use assignment::Memberships;
pub use object::{Link, Links, ObjectBody, ObjectStatus, ObjectType, RemoteObject, LOGO_LINK};
pub use org::{Feature, OrgContext, OrgPipeline};
pub use policy::{Policy, PolicyType};
