//! A pooled connection handle to one SQLite database URI

use std::str::FromStr;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::config::EnginePoolConfig;
use crate::error::{Error, Result};

/// A reusable, pooled connection handle to one physical database.
///
/// An engine is uniquely identified by the URI it was constructed from. The
/// pool behind it is created lazily: constructing an engine performs no I/O,
/// and connections are only established when a query runs or a connection is
/// acquired. Pool-level timeouts and sizing come from [`EnginePoolConfig`].
///
/// Engines are intended to live inside an [`EngineCache`] and be handed out
/// as `Arc<Engine>` clones; dropping a handle never tears down the pool.
///
/// [`EngineCache`]: crate::EngineCache
#[derive(Debug)]
pub struct Engine {
   uri: String,
   pool: Pool<Sqlite>,
}

impl Engine {
   /// Build an engine for `uri` without connecting.
   ///
   /// The URI is parsed eagerly, so a malformed URI fails here rather than
   /// on first query. Missing database files are created on first use.
   pub fn from_uri(uri: &str, config: &EnginePoolConfig) -> Result<Self> {
      let options = SqliteConnectOptions::from_str(uri)
         .map_err(|source| Error::InvalidUri {
            uri: uri.to_string(),
            source,
         })?
         .create_if_missing(true);

      let pool = SqlitePoolOptions::new()
         .max_connections(config.max_connections)
         .acquire_timeout(config.acquire_timeout)
         .idle_timeout(config.idle_timeout)
         .connect_lazy_with(options);

      debug!("Created engine for uri: {}", uri);

      Ok(Self {
         uri: uri.to_string(),
         pool,
      })
   }

   /// The URI this engine was constructed from.
   pub fn uri(&self) -> &str {
      &self.uri
   }

   /// The underlying connection pool.
   pub fn pool(&self) -> &Pool<Sqlite> {
      &self.pool
   }

   /// Acquire a connection from the pool.
   pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
      Ok(self.pool.acquire().await?)
   }

   /// Execute a statement and return the number of affected rows.
   pub async fn execute(&self, sql: &str) -> Result<u64> {
      let result = sqlx::query(sql).execute(&self.pool).await?;
      Ok(result.rows_affected())
   }

   /// Execute a query and return all rows.
   pub async fn fetch_all(&self, sql: &str) -> Result<Vec<SqliteRow>> {
      Ok(sqlx::query(sql).fetch_all(&self.pool).await?)
   }

   /// Close the pool, waiting for in-flight connections to be released.
   pub async fn close(&self) {
      self.pool.close().await;
      debug!("Closed engine for uri: {}", self.uri);
   }
}
