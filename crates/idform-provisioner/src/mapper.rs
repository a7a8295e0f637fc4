use std::fmt::Debug;

use idform_core::models::{Feature, ObjectBody, ObjectType, RemoteObject};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::ResourceSchema;
use crate::state::ResourceState;
use crate::status::Activation;

/// State record of the resource type handled by `M`.
pub type StateOf<M> = ResourceState<<M as Mapper>::Desired, <M as Mapper>::Computed>;

/// One impl per resource type. Converts between the declared record and
/// the remote representation; the reconciler does everything else.
pub trait Mapper: Send + Sync {
    /// Read/write attributes.
    type Desired: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    /// Server-assigned attributes.
    type Computed: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Resource type name in the schema, e.g. "okta_app_swa".
    fn type_name(&self) -> &'static str;

    /// Label used in log lines and error messages, e.g. "SWA application".
    fn label(&self) -> &'static str;

    fn object_type(&self) -> ObjectType;

    /// Feature the organization must have; checked before every operation.
    fn required_feature(&self) -> Option<Feature> {
        None
    }

    /// Whether group/user assignments and a logo are synchronized for this
    /// resource type.
    fn manages_sub_resources(&self) -> bool {
        false
    }

    /// Build the create/update payload. Never sets server-assigned fields.
    fn to_remote_shape(&self, desired: &Self::Desired) -> ObjectBody;

    /// Map a remote object back into attributes. Absent nested records
    /// become defaults.
    fn from_remote_shape(&self, object: &RemoteObject) -> (Self::Desired, Self::Computed);

    fn activation(&self, desired: &Self::Desired) -> Activation;

    fn schema(&self) -> ResourceSchema;
}
