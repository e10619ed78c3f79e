use std::{env, str::FromStr};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub mod data_model;
pub mod queries;

const DEFAULT_DATABASE_URL: &str = "sqlite://restrooms.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub struct DatabaseConnectionInfo {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConnectionInfo {
    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`, falling back to a
    /// `restrooms.db` file in the working directory. Returns `None` if a
    /// variable is set but unusable.
    pub fn from_env() -> Option<Self> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.parse().ok()?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        Some(Self {
            url,
            max_connections,
        })
    }

    /// A private database living as long as the pool. Limited to a single
    /// connection, every new connection would open an empty database.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    connection: SqlitePool,
}

/// Runs every statement on its own pooled connection, committing immediately.
#[derive(Debug)]
pub struct SqliteDatabaseAutocommit {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&database_connection_info.url)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(database_connection_info.max_connections)
            // an in-memory database is lost with its last connection
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("database ready at {}", database_connection_info.url);

        Ok(Self { connection: pool })
    }
}

impl restrooms::database::Database for SqliteDatabase {
    type Autocommit = SqliteDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        SqliteDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }
}
