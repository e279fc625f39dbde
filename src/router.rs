//! Bind-key routing: master/replica URI selection and engine retrieval
//!
//! [`BindRouter`] is the single entry point the rest of the system goes
//! through to turn (bind key, read/write intent) into a pooled engine.
//! Raw URIs stay inside this module; callers only ever see engine handles.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rand::seq::SliceRandom;
use sqlx_sqlite_engine_cache::{Engine, EngineCache, EnginePoolConfig};
use tracing::{debug, warn};

use crate::binds::BindResolver;
use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::schema::{Schema, TableDef};

/// Routes logical table access to physical database engines.
///
/// Construction and schema registration happen in a startup phase that
/// needs `&mut self`; once the router is shared (typically behind an
/// `Arc`), every serving-path operation takes `&self` and the only lock
/// anywhere is the engine cache's construction mutex.
#[derive(Debug)]
pub struct BindRouter {
   masters: HashMap<String, String>,
   replicas: HashMap<String, Vec<String>>,
   resolver: BindResolver,
   cache: EngineCache,
   schemas: Vec<Schema>,
}

impl BindRouter {
   /// Build a router from raw configuration, with default pool settings.
   pub fn new(config: RouterConfig) -> Result<Self> {
      Self::with_pool_config(config, EnginePoolConfig::default())
   }

   /// Build a router whose cached engines use `pool_config`.
   pub fn with_pool_config(config: RouterConfig, pool_config: EnginePoolConfig) -> Result<Self> {
      let normalized = config.normalize()?;

      debug!(
         "Router configured with {} master(s), {} replica set(s)",
         normalized.masters.len(),
         normalized.replicas.len()
      );

      Ok(Self {
         masters: normalized.masters,
         replicas: normalized.replicas,
         resolver: BindResolver::new(normalized.table_bind_keys),
         cache: EngineCache::with_config(pool_config),
         schemas: Vec::new(),
      })
   }

   /// Register a schema's tables and retain the schema for DDL operations.
   ///
   /// `bind_key` forces the whole schema onto one bind; a table's own
   /// pre-associated key takes precedence over it. Either way, first
   /// registration wins, so a schema registered later cannot steal a table
   /// already bound by configuration or an earlier schema.
   ///
   /// Startup-phase only: must complete before the router is shared with
   /// serving traffic.
   pub fn register_schema(&mut self, schema: Schema, bind_key: Option<&str>) {
      for table in schema.tables() {
         if let Some(key) = table.bind_key().or(bind_key) {
            self.resolver.register(table.name(), key, false);
         }
      }
      debug!(
         "Registered schema '{}' with {} table(s)",
         schema.name(),
         schema.tables().len()
      );
      self.schemas.push(schema);
   }

   /// Record a single table-to-bind mapping. Startup-phase only.
   pub fn register_table(&mut self, table: &str, bind_key: &str, overwrite: bool) -> bool {
      self.resolver.register(table, bind_key, overwrite)
   }

   /// The bind key for `table`; `default` when unmapped. Never fails.
   pub fn bind_key_for(&self, table: &str) -> &str {
      self.resolver.bind_key_for(table)
   }

   /// Select the URI serving (`bind_key`, read/write intent).
   ///
   /// Reads draw one URI uniformly at random from the bind key's replica
   /// list when one is configured: independent choice per call, no
   /// stickiness, no health checking. Writes, and reads without replicas,
   /// go to the bind key's master.
   pub fn resolve_uri(&self, bind_key: &str, want_read: bool) -> Result<&str> {
      if want_read {
         match self
            .replicas
            .get(bind_key)
            .and_then(|uris| uris.choose(&mut rand::thread_rng()))
         {
            Some(uri) => return Ok(uri),
            // Reads degrade gracefully to the master; only worth a warning
            // when other bind keys do have replicas configured.
            None if self.replicas.is_empty() => {
               debug!("No replicas configured; read for bind key '{}' uses master", bind_key);
            }
            None => {
               warn!("No replicas for bind key '{}'; read falls back to master", bind_key);
            }
         }
      }

      self
         .masters
         .get(bind_key)
         .map(String::as_str)
         .ok_or_else(|| Error::UndefinedBind(bind_key.to_string()))
   }

   /// The engine serving (`bind_key`, read/write intent).
   ///
   /// This is the single entry point all higher components use; repeated
   /// calls that resolve to the same URI return the identical engine.
   pub fn engine_for(&self, bind_key: &str, want_read: bool) -> Result<Arc<Engine>> {
      let uri = self.resolve_uri(bind_key, want_read)?;
      Ok(self.cache.get(uri)?)
   }

   /// The engine serving (`table`, read/write intent).
   pub fn engine_for_table(&self, table: &str, want_read: bool) -> Result<Arc<Engine>> {
      self.engine_for(self.resolver.bind_key_for(table), want_read)
   }

   /// A schema's table names grouped by resolved bind key, in definition
   /// order, optionally restricted to one bind key.
   pub fn tables_by_bind(
      &self,
      schema: &Schema,
      bind_key: Option<&str>,
   ) -> IndexMap<String, IndexSet<String>> {
      self
         .group_defs(schema, bind_key)
         .into_iter()
         .map(|(key, defs)| {
            let names = defs.iter().map(|def| def.name().to_string()).collect();
            (key, names)
         })
         .collect()
   }

   /// Create every registered table on its bind key's master, optionally
   /// restricted to one bind key.
   pub async fn create_all(&self, bind_key: Option<&str>) -> Result<()> {
      for schema in &self.schemas {
         for (key, defs) in self.group_defs(schema, bind_key) {
            let engine = self.engine_for(&key, false)?;
            for def in &defs {
               engine.execute(def.create_sql()).await?;
            }
            debug!(
               "Created {} table(s) on bind key '{}' for schema '{}'",
               defs.len(),
               key,
               schema.name()
            );
         }
      }
      Ok(())
   }

   /// Drop every registered table from its bind key's master, optionally
   /// restricted to one bind key. Tables drop in reverse definition order.
   pub async fn drop_all(&self, bind_key: Option<&str>) -> Result<()> {
      for schema in self.schemas.iter().rev() {
         for (key, defs) in self.group_defs(schema, bind_key) {
            let engine = self.engine_for(&key, false)?;
            for def in defs.iter().rev() {
               engine
                  .execute(&format!("DROP TABLE IF EXISTS {}", def.name()))
                  .await?;
            }
            debug!(
               "Dropped {} table(s) on bind key '{}' for schema '{}'",
               defs.len(),
               key,
               schema.name()
            );
         }
      }
      Ok(())
   }

   /// Schemas registered so far, in registration order.
   pub fn schemas(&self) -> &[Schema] {
      &self.schemas
   }

   /// The engine cache backing this router.
   pub fn cache(&self) -> &EngineCache {
      &self.cache
   }

   /// Close every cached engine. Process-teardown hook.
   pub async fn close_all(&self) {
      self.cache.close_all().await;
   }

   fn group_defs<'a>(
      &self,
      schema: &'a Schema,
      bind_key: Option<&str>,
   ) -> IndexMap<String, Vec<&'a TableDef>> {
      let mut groups: IndexMap<String, Vec<&TableDef>> = IndexMap::new();
      for table in schema.tables() {
         let key = self.resolver.bind_key_for(table.name());
         if let Some(filter) = bind_key
            && filter != key
         {
            continue;
         }
         groups.entry(key.to_string()).or_default().push(table);
      }
      groups
   }
}
