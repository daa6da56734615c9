//! The bootstrap statement: one create-user request against one database

use super::BootstrapConfig;
use crate::catalog::{MongoCatalog, MongoTarget, UserCatalog};
use crate::descriptor::{RoleGrant, UserDescriptor};
use crate::error::BootstrapError;
use tracing::{info, instrument, warn};

/// A validated (database, user) pair ready to be sent.
#[derive(Debug)]
pub struct BootstrapStatement {
    database: String,
    user: UserDescriptor,
}

/// Outcome of reading a principal back from the server.
#[derive(Debug, PartialEq, Eq)]
pub enum Verification {
    /// Exists with exactly the expected grants.
    Verified,
    Missing,
    /// Exists, but its grants differ from the descriptor's.
    Mismatch { granted: Vec<RoleGrant> },
}

impl BootstrapStatement {
    /// Validate the inputs. Nothing is sent to the server on failure.
    pub fn new(
        database: impl Into<String>,
        user: UserDescriptor,
        custom_roles: &[String],
    ) -> Result<Self, BootstrapError> {
        let database = database.into();
        if database.trim().is_empty() {
            return Err(BootstrapError::InvalidDescriptor(
                "target database name is empty".to_string(),
            ));
        }
        user.validate(custom_roles)?;
        Ok(Self { database, user })
    }

    /// Validate the configuration, resolve the target from the connection
    /// URI, then build the client, in that order. An invalid descriptor is
    /// reported before any DNS lookup or connection attempt.
    pub async fn prepare(config: BootstrapConfig) -> Result<(Self, MongoCatalog), BootstrapError> {
        config.validate()?;

        let target = MongoTarget::parse(&config.database).await?;
        info!(
            target = %target.describe(),
            database = target.database(),
            timeout_secs = config.database.server_selection_timeout_secs,
            "Target resolved"
        );

        let statement = Self::new(target.database(), config.user, &config.custom_roles)?;
        let catalog = target.connect()?;
        Ok((statement, catalog))
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn user(&self) -> &UserDescriptor {
        &self.user
    }

    /// Create the user. Failures propagate unchanged: an existing user is
    /// `AlreadyExists`, never silently accepted.
    #[instrument(skip_all, fields(database = %self.database, user = %self.user.name))]
    pub async fn execute<C: UserCatalog>(&self, catalog: &C) -> Result<(), BootstrapError> {
        catalog.create_user(&self.database, &self.user).await?;

        let roles: Vec<String> = self.user.roles.iter().map(ToString::to_string).collect();
        info!(roles = ?roles, "User created");
        Ok(())
    }

    /// Read the user back and compare its grants with the descriptor.
    #[instrument(skip_all, fields(database = %self.database, user = %self.user.name))]
    pub async fn verify<C: UserCatalog>(&self, catalog: &C) -> Result<Verification, BootstrapError> {
        let verification = match catalog.user_grants(&self.database, &self.user.name).await? {
            None => Verification::Missing,
            Some(granted) if self.user.grants_match(&granted) => Verification::Verified,
            Some(granted) => Verification::Mismatch { granted },
        };

        match &verification {
            Verification::Verified => info!("User grants verified"),
            Verification::Missing => warn!("User not found"),
            Verification::Mismatch { granted } => {
                let granted: Vec<String> = granted.iter().map(ToString::to_string).collect();
                warn!(granted = ?granted, "User grants differ from configuration");
            }
        }

        Ok(verification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::MemoryCatalog;

    fn tester_statement() -> BootstrapStatement {
        BootstrapStatement::new("mongo", UserDescriptor::tester(), &[]).unwrap()
    }

    #[tokio::test]
    async fn test_literal_scenario_creates_tester_on_mongo() {
        let catalog = MemoryCatalog::new();
        let statement = tester_statement();

        statement.execute(&catalog).await.unwrap();

        let stored = catalog.user("mongo", "tester").unwrap();
        assert_eq!(
            stored.roles,
            vec![
                RoleGrant::new("readWrite", "mongo"),
                RoleGrant::new("dbAdmin", "mongo"),
            ]
        );
        assert_eq!(catalog.user_count(), 1);

        assert!(catalog.authenticate("mongo", "tester", "tester"));
        assert!(!catalog.authenticate("mongo", "tester", "wrong"));
        assert!(!catalog.authenticate("admin", "tester", "tester"));
    }

    #[tokio::test]
    async fn test_grants_are_scoped_to_target_database_only() {
        let catalog = MemoryCatalog::new();
        let statement = tester_statement();
        statement.execute(&catalog).await.unwrap();

        assert_eq!(statement.verify(&catalog).await.unwrap(), Verification::Verified);

        let granted = catalog.user_grants("mongo", "tester").await.unwrap().unwrap();
        assert!(granted.iter().all(|g| g.db == "mongo"));
        assert_eq!(catalog.user_grants("other", "tester").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rerun_fails_with_already_exists() {
        let catalog = MemoryCatalog::new();
        let statement = tester_statement();

        statement.execute(&catalog).await.unwrap();
        for _ in 0..3 {
            let err = statement.execute(&catalog).await.unwrap_err();
            assert!(matches!(err, BootstrapError::AlreadyExists { .. }));
        }

        assert_eq!(catalog.user_count(), 1);
        assert_eq!(catalog.create_calls(), 4);
    }

    #[tokio::test]
    async fn test_unreachable_server_creates_nothing() {
        let catalog = MemoryCatalog::unreachable();
        let statement = tester_statement();

        let err = statement.execute(&catalog).await.unwrap_err();
        assert!(matches!(err, BootstrapError::ConnectionError(_)));
        assert_eq!(catalog.user_count(), 0);
    }

    #[tokio::test]
    async fn test_permission_denied_propagates() {
        let catalog = MemoryCatalog::read_only();
        let err = tester_statement().execute(&catalog).await.unwrap_err();
        assert!(matches!(err, BootstrapError::PermissionDenied(_)));
        assert_eq!(catalog.user_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_reports_missing_and_mismatch() {
        let catalog = MemoryCatalog::new();
        let statement = tester_statement();

        assert_eq!(statement.verify(&catalog).await.unwrap(), Verification::Missing);

        catalog.insert("mongo", "tester", vec![RoleGrant::new("read", "mongo")]);
        assert_eq!(
            statement.verify(&catalog).await.unwrap(),
            Verification::Mismatch {
                granted: vec![RoleGrant::new("read", "mongo")]
            }
        );
    }

    #[test]
    fn test_invalid_input_is_rejected_before_sending() {
        let err = BootstrapStatement::new(" ", UserDescriptor::tester(), &[]).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidDescriptor(_)));

        let mut user = UserDescriptor::tester();
        user.roles.clear();
        let err = BootstrapStatement::new("mongo", user, &[]).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidDescriptor(_)));
    }

    #[tokio::test]
    async fn test_prepare_resolves_database_from_uri() {
        let mut config = BootstrapConfig::default();
        config.database.connection_uri = "mongodb://127.0.0.1:1/fromuri".to_string();

        let (statement, _catalog) = BootstrapStatement::prepare(config).await.unwrap();
        assert_eq!(statement.database(), "fromuri");
        assert_eq!(statement.user().name, "tester");
    }

    #[tokio::test]
    async fn test_prepare_rejects_invalid_descriptor_before_resolving_host() {
        let mut config = BootstrapConfig::default();
        config.database.connection_uri =
            "mongodb+srv://cluster.nonexistent-host.invalid/mongo".to_string();
        config.user.roles.clear();

        let err = BootstrapStatement::prepare(config).await.unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidDescriptor(_)), "{:?}", err);
    }
}
