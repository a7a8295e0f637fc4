use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;

use crate::error::ClientError;
use crate::models::{Memberships, ObjectBody, ObjectType, RemoteObject};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Calls against the directory service.
///
/// Implementations own authentication, transport and any retry policy.
/// The reconciler issues at most one call at a time per resource and never
/// retries on its own.
///
/// Methods return boxed futures for dyn compatibility.
pub trait RemoteClient: Send + Sync {
    /// Create an object. `activate` selects the initial lifecycle status.
    fn create_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        payload: &'a ObjectBody,
        activate: bool,
    ) -> BoxFuture<'a, Result<RemoteObject, ClientError>>;

    /// Read an object by identifier. `Ok(None)` = doesn't exist.
    fn read_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<RemoteObject>, ClientError>>;

    fn update_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
        payload: &'a ObjectBody,
    ) -> BoxFuture<'a, Result<RemoteObject, ClientError>>;

    /// Delete an object. May report [`ClientError::NotFound`] when the
    /// object is already gone.
    fn delete_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), ClientError>>;

    /// Activate or deactivate an object.
    fn set_activation<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
        active: bool,
    ) -> BoxFuture<'a, Result<(), ClientError>>;

    fn list_objects_by_type<'a>(
        &'a self,
        object_type: &'a ObjectType,
    ) -> BoxFuture<'a, Result<Vec<RemoteObject>, ClientError>>;

    /// Current group and user assignments of an application.
    fn read_assignments<'a>(&'a self, id: &'a str)
    -> BoxFuture<'a, Result<Memberships, ClientError>>;

    /// Make the application's group assignments equal `groups`.
    fn sync_group_assignments<'a>(
        &'a self,
        id: &'a str,
        groups: &'a BTreeSet<String>,
    ) -> BoxFuture<'a, Result<(), ClientError>>;

    /// Make the application's user assignments equal `users`.
    fn sync_user_assignments<'a>(
        &'a self,
        id: &'a str,
        users: &'a BTreeSet<String>,
    ) -> BoxFuture<'a, Result<(), ClientError>>;

    /// Upload an asset (e.g. a logo) to the location named by `asset_link`.
    fn upload_asset<'a>(
        &'a self,
        id: &'a str,
        asset_link: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), ClientError>>;
}
