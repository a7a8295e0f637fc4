use std::fmt;

use idform_core::models::Memberships;
use serde::{Deserialize, Serialize};

/// Reconciliation phase of one resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Absent,
    Creating,
    Present,
    Updating,
    Deleting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Creating => "creating",
            Self::Present => "present",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
        })
    }
}

/// Which sub-resources have been synchronized since the last create or
/// update of a present object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubResourceSync {
    pub groups_and_users: bool,
    pub logo: bool,
}

/// The state record of one resource instance, exchanged with the IaC
/// engine on every call.
///
/// `desired` holds the read/write attributes, `computed` the
/// server-assigned ones. Memberships and the logo path live beside them
/// because they are synchronized independently of the main object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState<D, C> {
    /// Remote identifier; empty while the resource is absent.
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub desired: D,
    #[serde(flatten)]
    pub computed: C,
    #[serde(flatten)]
    pub memberships: Memberships,
    /// Local path of the logo image to upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, rename = "_sync")]
    pub sync: SubResourceSync,
}

impl<D: Default, C: Default> ResourceState<D, C> {
    /// A planned record for an object that does not exist yet.
    pub fn planned(desired: D) -> Self {
        Self {
            desired,
            ..Self::default()
        }
    }

    pub fn with_memberships(mut self, memberships: Memberships) -> Self {
        self.memberships = memberships;
        self
    }

    pub fn with_logo(mut self, path: impl Into<String>) -> Self {
        self.logo = Some(path.into());
        self
    }
}

impl<D, C> ResourceState<D, C> {
    pub fn phase(&self) -> Phase {
        if self.id.is_empty() {
            Phase::Absent
        } else {
            Phase::Present
        }
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    /// Forget the remote object. Called when it no longer exists.
    pub fn clear(&mut self) {
        self.id.clear();
        self.sync = SubResourceSync::default();
    }
}
