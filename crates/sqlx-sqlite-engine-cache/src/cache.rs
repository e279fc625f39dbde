//! URI-keyed engine cache with an atomic get-or-create path

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::EnginePoolConfig;
use crate::engine::Engine;
use crate::error::Result;

/// Maps a connection URI to its one-and-only [`Engine`].
///
/// The whole check-then-create sequence runs under a single mutex, so
/// concurrent `get` calls for the same URI construct exactly one engine.
/// Calls for different URIs serialize on the same lock; engine construction
/// is lazy (no I/O) and rare relative to query traffic, so the contention
/// window is a map lookup plus an options parse.
///
/// The lock is never held while an engine's pool performs I/O: pools connect
/// on first query, outside any `get` call.
#[derive(Debug, Default)]
pub struct EngineCache {
   engines: Mutex<HashMap<String, Arc<Engine>>>,
   config: EnginePoolConfig,
}

impl EngineCache {
   /// Create a cache whose engines use the default pool settings.
   pub fn new() -> Self {
      Self::with_config(EnginePoolConfig::default())
   }

   /// Create a cache whose engines use `config`.
   pub fn with_config(config: EnginePoolConfig) -> Self {
      Self {
         engines: Mutex::new(HashMap::new()),
         config,
      }
   }

   /// Return the engine for `uri`, constructing and publishing it first if
   /// no engine exists yet.
   ///
   /// Repeated calls for the same URI return handles to the identical
   /// engine instance.
   pub fn get(&self, uri: &str) -> Result<Arc<Engine>> {
      let mut engines = self.engines.lock().expect("engine cache lock poisoned");

      if let Some(engine) = engines.get(uri) {
         return Ok(Arc::clone(engine));
      }

      let engine = Arc::new(Engine::from_uri(uri, &self.config)?);
      engines.insert(uri.to_string(), Arc::clone(&engine));
      Ok(engine)
   }

   /// Remove the cached engine for `uri`, if any.
   ///
   /// The removed engine is handed back so the caller can `close()` its
   /// pool; outstanding handles elsewhere keep working until dropped. Meant
   /// for error recovery and tests, not the normal routing path.
   pub fn invalidate(&self, uri: &str) -> Option<Arc<Engine>> {
      let removed = self
         .engines
         .lock()
         .expect("engine cache lock poisoned")
         .remove(uri);

      if removed.is_some() {
         debug!("Invalidated engine for uri: {}", uri);
      }
      removed
   }

   /// Number of cached engines.
   pub fn len(&self) -> usize {
      self.engines.lock().expect("engine cache lock poisoned").len()
   }

   /// Whether the cache holds no engines.
   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }

   /// The URIs of all cached engines, in no particular order.
   pub fn uris(&self) -> Vec<String> {
      self
         .engines
         .lock()
         .expect("engine cache lock poisoned")
         .keys()
         .cloned()
         .collect()
   }

   /// Drain the cache and close every pool.
   ///
   /// Process-teardown hook; the cache is reusable (but empty) afterwards.
   pub async fn close_all(&self) {
      let drained: Vec<Arc<Engine>> = {
         let mut engines = self.engines.lock().expect("engine cache lock poisoned");
         engines.drain().map(|(_, engine)| engine).collect()
      };

      debug!("Closing {} cached engine(s)", drained.len());
      for engine in drained {
         engine.close().await;
      }
   }
}
