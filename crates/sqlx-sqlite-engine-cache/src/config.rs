//! Configuration for cached engine connection pools

use std::time::Duration;

use serde::Deserialize;

/// Pool settings applied to every engine constructed by an [`EngineCache`].
///
/// [`EngineCache`]: crate::EngineCache
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_engine_cache::EnginePoolConfig;
///
/// // Use defaults
/// let config = EnginePoolConfig::default();
///
/// // Override just one field
/// let config = EnginePoolConfig {
///     max_connections: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnginePoolConfig {
   /// Maximum number of concurrent connections per engine
   ///
   /// Higher values allow more concurrent queries against one database but
   /// consume more resources.
   ///
   /// Default: 6
   pub max_connections: u32,

   /// Timeout for acquiring a connection from an engine's pool
   ///
   /// Default: 30 seconds
   pub acquire_timeout: Duration,

   /// Idle timeout for pooled connections (`None` = never closed)
   ///
   /// Connections that remain idle for this duration are closed
   /// automatically.
   ///
   /// Default: 30 seconds
   pub idle_timeout: Option<Duration>,
}

impl Default for EnginePoolConfig {
   fn default() -> Self {
      Self {
         max_connections: 6,
         acquire_timeout: Duration::from_secs(30),
         idle_timeout: Some(Duration::from_secs(30)),
      }
   }
}
