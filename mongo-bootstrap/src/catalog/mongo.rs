//! MongoDB-backed user catalog
//!
//! Uses the `createUser` and `usersInfo` database commands. Driver errors are
//! classified into `BootstrapError` but never retried.

use super::UserCatalog;
use crate::bootstrap::DatabaseConfig;
use crate::descriptor::{RoleGrant, UserDescriptor};
use crate::error::BootstrapError;
use mongodb::bson::{self, doc, Document};
use mongodb::error::{Error as DriverError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Server error code for `createUser` on an existing principal.
const USER_ALREADY_EXISTS: i32 = 51003;
/// Server error code when the session lacks the required privilege.
const UNAUTHORIZED: i32 = 13;

/// A parsed connection target: driver options plus the resolved database.
#[derive(Debug)]
pub struct MongoTarget {
    options: ClientOptions,
    database: String,
}

impl MongoTarget {
    /// Parse the connection URI with the driver's own parser.
    ///
    /// `mongodb+srv://` URIs are resolved through DNS here. No server
    /// connection is opened until `connect`.
    pub async fn parse(config: &DatabaseConfig) -> Result<Self, BootstrapError> {
        let mut options = ClientOptions::parse(config.connection_uri.as_str())
            .await
            .map_err(|e| Failure::from_driver(&e).into_error(e, "", ""))?;

        options.app_name = Some(config.app_name.clone());
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));

        let database = config.target_database(options.default_database.as_deref());
        Ok(Self { options, database })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// User name and hosts, for logging. Never includes the password.
    pub fn describe(&self) -> String {
        let hosts: Vec<String> = self.options.hosts.iter().map(ToString::to_string).collect();
        let user = self
            .options
            .credential
            .as_ref()
            .and_then(|c| c.username.as_deref());
        match user {
            Some(user) => format!("{}@{}", user, hosts.join(",")),
            None => hosts.join(","),
        }
    }

    /// Build the client. The driver starts monitoring the hosts in the
    /// background immediately; an unreachable server surfaces from the first
    /// command as `ConnectionError`.
    pub fn connect(self) -> Result<MongoCatalog, BootstrapError> {
        let client = Client::with_options(self.options)?;
        Ok(MongoCatalog { client })
    }
}

#[derive(Debug)]
pub struct MongoCatalog {
    client: Client,
}

impl UserCatalog for MongoCatalog {
    #[instrument(skip_all, fields(database = %database, user = %user.name))]
    async fn create_user(&self, database: &str, user: &UserDescriptor) -> Result<(), BootstrapError> {
        debug!(roles = user.roles.len(), "Sending createUser");

        self.client
            .database(database)
            .run_command(create_user_command(user))
            .await
            .map_err(|e| Failure::from_driver(&e).into_error(e, &user.name, database))?;

        Ok(())
    }

    #[instrument(skip_all, fields(database = %database, user = %name))]
    async fn user_grants(
        &self,
        database: &str,
        name: &str,
    ) -> Result<Option<Vec<RoleGrant>>, BootstrapError> {
        debug!("Sending usersInfo");

        let reply = self
            .client
            .database(database)
            .run_command(doc! { "usersInfo": name })
            .await
            .map_err(|e| Failure::from_driver(&e).into_error(e, name, database))?;

        let reply: UsersInfoReply = bson::from_document(reply).map_err(DriverError::from)?;

        Ok(reply
            .users
            .into_iter()
            .find(|u| u.user == name && u.db == database)
            .map(|u| u.roles))
    }
}

fn create_user_command(user: &UserDescriptor) -> Document {
    let roles: Vec<Document> = user
        .roles
        .iter()
        .map(|grant| doc! { "role": grant.role.as_str(), "db": grant.db.as_str() })
        .collect();

    doc! {
        "createUser": user.name.as_str(),
        "pwd": user.credential.as_str(),
        "roles": roles,
    }
}

#[derive(Debug, Deserialize)]
struct UsersInfoReply {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    user: String,
    db: String,
    #[serde(default)]
    roles: Vec<RoleGrant>,
}

/// What a driver error means for the operator.
#[derive(Debug, PartialEq)]
enum Failure {
    Command { code: i32, message: String },
    Unreachable(String),
    Unauthenticated(String),
    Other,
}

impl Failure {
    fn from_driver(err: &DriverError) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Command(cmd) => Self::Command {
                code: cmd.code,
                message: cmd.message.clone(),
            },
            ErrorKind::ServerSelection { message, .. } | ErrorKind::DnsResolve { message, .. } => {
                Self::Unreachable(message.clone())
            }
            ErrorKind::Io(io) => Self::Unreachable(io.to_string()),
            ErrorKind::Authentication { message, .. } => Self::Unauthenticated(message.clone()),
            _ => Self::Other,
        }
    }

    fn into_error(self, err: DriverError, user: &str, database: &str) -> BootstrapError {
        match self {
            Self::Command {
                code: USER_ALREADY_EXISTS,
                ..
            } => BootstrapError::AlreadyExists {
                user: user.to_string(),
                database: database.to_string(),
            },
            Self::Command {
                code: UNAUTHORIZED,
                message,
            } => BootstrapError::PermissionDenied(message),
            Self::Unauthenticated(message) => {
                BootstrapError::PermissionDenied(format!("authentication failed: {}", message))
            }
            Self::Unreachable(message) => BootstrapError::ConnectionError(message),
            Self::Command { .. } | Self::Other => BootstrapError::Driver(err),
        }
    }
}
