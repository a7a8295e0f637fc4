//! idform-core
//!
//! Shared vocabulary of the idform provider: the remote object models of the
//! directory service, organization capabilities, and the `RemoteClient`
//! surface the reconciler drives. No transport lives here.

pub mod client;
pub mod error;
pub mod models;

pub use crate::client::{BoxFuture, RemoteClient};
pub use crate::error::ClientError;
