//! User catalog seam
//!
//! The bootstrap statement only needs two things from the server: create a
//! principal, and read a principal's grants back.

mod mongo;

#[cfg(test)]
pub(crate) mod memory;

pub use mongo::{MongoCatalog, MongoTarget};

use crate::descriptor::{RoleGrant, UserDescriptor};
use crate::error::BootstrapError;
use std::future::Future;

pub trait UserCatalog {
    /// Issue exactly one create-user request in `database`.
    fn create_user(
        &self,
        database: &str,
        user: &UserDescriptor,
    ) -> impl Future<Output = Result<(), BootstrapError>> + Send;

    /// Role grants of `name` in `database`, or `None` if no such principal.
    fn user_grants(
        &self,
        database: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Vec<RoleGrant>>, BootstrapError>> + Send;
}
