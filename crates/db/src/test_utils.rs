//! Throwaway PostgreSQL databases for integration tests.
//!
//! Connection settings come from `TEST_DB_*` environment variables. Each
//! test that writes data creates its own migrated database and drops it
//! when done, so tests can run in parallel.

use crate::migrations::Migrator;
use outliers_common::IdGenerator;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;

/// Where the test server lives.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role to connect as.
    pub username: String,
    /// Password of that role.
    pub password: String,
    /// Database used by tests that share one schema.
    pub database: String,
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: env_or("TEST_DB_HOST", "localhost"),
            port: env_or("TEST_DB_PORT", "5433").parse().unwrap_or(5433),
            username: env_or("TEST_DB_USER", "outliers_test"),
            password: env_or("TEST_DB_PASSWORD", "outliers_test"),
            database: env_or("TEST_DB_NAME", "outliers_test"),
        }
    }
}

impl TestDbConfig {
    /// URL of `database` on the test server.
    #[must_use]
    pub fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }

    /// URL of the shared test database.
    #[must_use]
    pub fn database_url(&self) -> String {
        self.url_for(&self.database)
    }

    /// URL of the maintenance database, used to create and drop others.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        self.url_for("postgres")
    }
}

/// A migrated test database.
pub struct TestDatabase {
    /// Connection to the database.
    pub conn: DatabaseConnection,
    config: TestDbConfig,
    name: String,
}

async fn run_on_server(config: &TestDbConfig, sql: String) -> Result<(), DbErr> {
    let admin = Database::connect(&config.postgres_url()).await?;
    let result = admin
        .execute(Statement::from_string(DatabaseBackend::Postgres, sql))
        .await;
    admin.close().await?;
    result.map(|_| ())
}

impl TestDatabase {
    /// Connect to the shared test database and migrate it.
    pub async fn connect(config: TestDbConfig) -> Result<Self, DbErr> {
        let name = config.database.clone();
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;
        Ok(Self { conn, config, name })
    }

    /// Create and migrate a database only this test uses.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let config = TestDbConfig::default();
        let name = format!("outliers_test_{}", IdGenerator::new().generate());

        run_on_server(&config, format!("CREATE DATABASE \"{name}\"")).await?;

        let conn = Database::connect(&config.url_for(&name)).await?;
        Migrator::up(&conn, None).await?;
        tracing::info!(database = %name, "Created test database");

        Ok(Self { conn, config, name })
    }

    /// Close the connection and drop the database.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;
        run_on_server(
            &self.config,
            format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name),
        )
        .await?;
        tracing::info!(database = %self.name, "Dropped test database");
        Ok(())
    }
}
