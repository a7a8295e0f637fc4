//! In-memory directory service implementing `RemoteClient`.
//!
//! Records every call, and can be told to fail or hang on a given
//! operation to exercise error paths.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use idform_core::models::{
    Memberships, ObjectBody, ObjectStatus, ObjectType, RemoteObject, LOGO_LINK,
};
use idform_core::{BoxFuture, ClientError, RemoteClient};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Read,
    Update,
    Delete,
    SetActivation,
    List,
    ReadAssignments,
    SyncGroups,
    SyncUsers,
    UploadAsset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub id: Option<String>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, RemoteObject>,
    assignments: HashMap<String, Memberships>,
    uploads: HashMap<String, Vec<u8>>,
    calls: Vec<Call>,
    failing: HashSet<Op>,
    hanging: HashSet<Op>,
    reads_miss: bool,
}

#[derive(Default)]
pub struct FakeDirectory {
    inner: Mutex<Inner>,
}

impl FakeDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake directory lock poisoned")
    }

    /// Make every later call of `op` fail with an API error.
    pub fn fail(&self, op: Op) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.lock().failing.remove(&op);
    }

    /// Make every later call of `op` never complete.
    pub fn hang(&self, op: Op) {
        self.lock().hanging.insert(op);
    }

    /// Make reads report every object as missing, as a lagging replica
    /// would right after a create.
    pub fn miss_reads(&self) {
        self.lock().reads_miss = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.lock().calls.iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.lock().calls.iter().filter(|c| c.op == op).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn insert(&self, object: RemoteObject) {
        self.lock().objects.insert(object.id.clone(), object);
    }

    /// Delete an object behind the reconciler's back.
    pub fn remove(&self, id: &str) {
        self.lock().objects.remove(id);
    }

    pub fn object(&self, id: &str) -> Option<RemoteObject> {
        self.lock().objects.get(id).cloned()
    }

    pub fn assignments(&self, id: &str) -> Memberships {
        self.lock().assignments.get(id).cloned().unwrap_or_default()
    }

    pub fn uploaded(&self, id: &str) -> Option<Vec<u8>> {
        self.lock().uploads.get(id).cloned()
    }

    /// Record a call. Returns whether the call should hang.
    fn begin(&self, op: Op, id: Option<&str>) -> Result<bool, ClientError> {
        let mut inner = self.lock();
        inner.calls.push(Call {
            op,
            id: id.map(String::from),
        });
        if inner.failing.contains(&op) {
            return Err(ClientError::Api {
                status: 500,
                summary: format!("injected {op:?} failure"),
            });
        }
        Ok(inner.hanging.contains(&op))
    }

    async fn enter(&self, op: Op, id: Option<&str>) -> Result<(), ClientError> {
        if self.begin(op, id)? {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

fn not_found(object_type: &ObjectType, id: &str) -> ClientError {
    ClientError::NotFound {
        object_type: object_type.to_string(),
        id: id.to_string(),
    }
}

impl RemoteClient for FakeDirectory {
    fn create_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        payload: &'a ObjectBody,
        activate: bool,
    ) -> BoxFuture<'a, Result<RemoteObject, ClientError>> {
        Box::pin(async move {
            self.enter(Op::Create, None).await?;

            let id = Uuid::new_v4().simple().to_string();
            let mut object = RemoteObject {
                id: id.clone(),
                status: if activate {
                    ObjectStatus::Active
                } else {
                    ObjectStatus::Inactive
                },
                body: payload.clone(),
                links: Default::default(),
            };
            if *object_type == ObjectType::Application {
                object.links.insert(
                    LOGO_LINK,
                    format!("https://fake.example.com/api/v1/apps/{id}/logo"),
                );
            }
            self.lock().objects.insert(id, object.clone());
            Ok(object)
        })
    }

    fn read_object<'a>(
        &'a self,
        _object_type: &'a ObjectType,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<RemoteObject>, ClientError>> {
        Box::pin(async move {
            self.enter(Op::Read, Some(id)).await?;
            let inner = self.lock();
            if inner.reads_miss {
                return Ok(None);
            }
            Ok(inner.objects.get(id).cloned())
        })
    }

    fn update_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
        payload: &'a ObjectBody,
    ) -> BoxFuture<'a, Result<RemoteObject, ClientError>> {
        Box::pin(async move {
            self.enter(Op::Update, Some(id)).await?;
            let mut inner = self.lock();
            let object = inner
                .objects
                .get_mut(id)
                .ok_or_else(|| not_found(object_type, id))?;
            object.body = payload.clone();
            Ok(object.clone())
        })
    }

    fn delete_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), ClientError>> {
        Box::pin(async move {
            self.enter(Op::Delete, Some(id)).await?;
            let mut inner = self.lock();
            inner.assignments.remove(id);
            inner
                .objects
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| not_found(object_type, id))
        })
    }

    fn set_activation<'a>(
        &'a self,
        object_type: &'a ObjectType,
        id: &'a str,
        active: bool,
    ) -> BoxFuture<'a, Result<(), ClientError>> {
        Box::pin(async move {
            self.enter(Op::SetActivation, Some(id)).await?;
            let mut inner = self.lock();
            let object = inner
                .objects
                .get_mut(id)
                .ok_or_else(|| not_found(object_type, id))?;
            object.status = if active {
                ObjectStatus::Active
            } else {
                ObjectStatus::Inactive
            };
            Ok(())
        })
    }

    fn list_objects_by_type<'a>(
        &'a self,
        object_type: &'a ObjectType,
    ) -> BoxFuture<'a, Result<Vec<RemoteObject>, ClientError>> {
        Box::pin(async move {
            self.enter(Op::List, None).await?;
            let mut objects: Vec<RemoteObject> = self
                .lock()
                .objects
                .values()
                .filter(|o| o.object_type() == *object_type)
                .cloned()
                .collect();
            objects.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(objects)
        })
    }

    fn read_assignments<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Memberships, ClientError>> {
        Box::pin(async move {
            self.enter(Op::ReadAssignments, Some(id)).await?;
            Ok(self.assignments(id))
        })
    }

    fn sync_group_assignments<'a>(
        &'a self,
        id: &'a str,
        groups: &'a BTreeSet<String>,
    ) -> BoxFuture<'a, Result<(), ClientError>> {
        Box::pin(async move {
            self.enter(Op::SyncGroups, Some(id)).await?;
            self.lock()
                .assignments
                .entry(id.to_string())
                .or_default()
                .groups = groups.clone();
            Ok(())
        })
    }

    fn sync_user_assignments<'a>(
        &'a self,
        id: &'a str,
        users: &'a BTreeSet<String>,
    ) -> BoxFuture<'a, Result<(), ClientError>> {
        Box::pin(async move {
            self.enter(Op::SyncUsers, Some(id)).await?;
            self.lock()
                .assignments
                .entry(id.to_string())
                .or_default()
                .users = users.clone();
            Ok(())
        })
    }

    fn upload_asset<'a>(
        &'a self,
        id: &'a str,
        _asset_link: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), ClientError>> {
        Box::pin(async move {
            self.enter(Op::UploadAsset, Some(id)).await?;
            self.lock().uploads.insert(id.to_string(), bytes);
            Ok(())
        })
    }
}
