//! Per-unit-of-work engine binding
//!
//! A [`Session`] is the short-lived construct a logical request uses to get
//! the right engine for each entity access: the pending statement is
//! classified as a read or a write, the entity's table resolves to a bind
//! key, and the router hands back the matching engine. The session holds no
//! state of its own beyond its router reference and its released flag; the
//! surrounding unit-of-work machinery owns SQL construction and execution.
//!
//! One session serves one logical request on one thread at a time. The
//! released flag is atomic only so [`SessionRegistry`] can release through a
//! shared handle; it does not make binding concurrent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sqlx_sqlite_engine_cache::Engine;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::router::BindRouter;

/// Read/write classification of a pending statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
   /// SELECT-class statement; may be served by a replica.
   Read,
   /// Mutating statement (DML/DDL); always served by the master.
   Write,
}

impl StatementKind {
   /// Classify a SQL statement by its leading keyword.
   ///
   /// `SELECT`, `VALUES`, and `EXPLAIN` are reads. `WITH` fronts either a
   /// select or CTE-assisted DML, so the rest of the statement is scanned
   /// for a mutating keyword. Everything else is a write; misclassifying
   /// an exotic read as a write only costs master load, never correctness.
   pub fn classify(sql: &str) -> Self {
      let first = sql
         .split_whitespace()
         .next()
         .unwrap_or("")
         .trim_start_matches('(');

      match first.to_ascii_uppercase().as_str() {
         "SELECT" | "VALUES" | "EXPLAIN" => StatementKind::Read,
         "WITH" => {
            let mutating = sql.split_whitespace().any(|token| {
               matches!(
                  token.to_ascii_uppercase().as_str(),
                  "INSERT" | "UPDATE" | "DELETE" | "REPLACE"
               )
            });
            if mutating {
               StatementKind::Write
            } else {
               StatementKind::Read
            }
         }
         _ => StatementKind::Write,
      }
   }

   /// Whether this statement may be served by a replica.
   pub fn is_read(self) -> bool {
      matches!(self, StatementKind::Read)
   }
}

/// A unit of work: binds each entity access to the engine serving it.
///
/// Lifecycle: `Created → Active (zero or more bind_for calls) → Released`.
/// Released is terminal; binding afterwards fails loudly rather than
/// silently rebinding.
#[derive(Debug)]
pub struct Session {
   id: Uuid,
   router: Arc<BindRouter>,
   released: AtomicBool,
}

impl Session {
   pub fn new(router: Arc<BindRouter>) -> Self {
      Self {
         id: Uuid::new_v4(),
         router,
         released: AtomicBool::new(false),
      }
   }

   pub fn id(&self) -> Uuid {
      self.id
   }

   pub fn router(&self) -> &Arc<BindRouter> {
      &self.router
   }

   pub fn is_released(&self) -> bool {
      self.released.load(Ordering::Acquire)
   }

   /// The engine serving `table` for a statement of the given kind.
   ///
   /// Fails with [`Error::UseAfterRelease`] once the session is released.
   pub fn bind_for(&self, table: &str, kind: StatementKind) -> Result<Arc<Engine>> {
      if self.is_released() {
         return Err(Error::UseAfterRelease(self.id));
      }
      self.router.engine_for_table(table, kind.is_read())
   }

   /// Classify `sql` and bind `table` accordingly.
   pub fn bind_for_sql(&self, table: &str, sql: &str) -> Result<Arc<Engine>> {
      self.bind_for(table, StatementKind::classify(sql))
   }

   /// Mark this unit of work released. Idempotent, never fails.
   pub fn release(&self) {
      if !self.released.swap(true, Ordering::AcqRel) {
         debug!("Released session {}", self.id);
      }
   }
}

/// Scope-keyed registry of active sessions.
///
/// The host environment begins a session when a logical request starts and
/// calls [`release`](SessionRegistry::release) exactly once on teardown;
/// a second release of the same scope is a harmless no-op.
#[derive(Debug, Default)]
pub struct SessionRegistry {
   sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
   pub fn new() -> Self {
      Self::default()
   }

   /// Start a session for `scope`.
   ///
   /// Errors with [`Error::SessionAlreadyActive`] if the scope already has
   /// one: a lifecycle hook that failed to release would otherwise leak
   /// bindings across requests.
   pub fn begin(&self, scope: &str, router: &Arc<BindRouter>) -> Result<Arc<Session>> {
      use std::collections::hash_map::Entry;
      let mut sessions = self.sessions.lock().expect("session registry lock poisoned");

      match sessions.entry(scope.to_string()) {
         Entry::Vacant(e) => {
            let session = Arc::new(Session::new(Arc::clone(router)));
            debug!("Began session {} for scope: {}", session.id(), scope);
            e.insert(Arc::clone(&session));
            Ok(session)
         }
         Entry::Occupied(_) => Err(Error::SessionAlreadyActive(scope.to_string())),
      }
   }

   /// The active session for `scope`, if any.
   pub fn get(&self, scope: &str) -> Option<Arc<Session>> {
      self
         .sessions
         .lock()
         .expect("session registry lock poisoned")
         .get(scope)
         .map(Arc::clone)
   }

   /// Detach and release the session for `scope`. Idempotent, never fails.
   pub fn release(&self, scope: &str) {
      let removed = self
         .sessions
         .lock()
         .expect("session registry lock poisoned")
         .remove(scope);

      if let Some(session) = removed {
         session.release();
      }
   }

   /// Release every active session. App-teardown sweep.
   pub fn release_all(&self) {
      let drained: Vec<Arc<Session>> = {
         let mut sessions = self.sessions.lock().expect("session registry lock poisoned");
         sessions.drain().map(|(_, session)| session).collect()
      };

      debug!("Releasing {} active session(s)", drained.len());
      for session in drained {
         session.release();
      }
   }

   pub fn len(&self) -> usize {
      self
         .sessions
         .lock()
         .expect("session registry lock poisoned")
         .len()
   }

   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::config::RouterConfig;

   fn test_router() -> Arc<BindRouter> {
      Arc::new(BindRouter::new(RouterConfig::new()).unwrap())
   }

   #[test]
   fn test_classify_reads() {
      assert!(StatementKind::classify("SELECT * FROM user").is_read());
      assert!(StatementKind::classify("  select id from user").is_read());
      assert!(StatementKind::classify("(SELECT 1) UNION (SELECT 2)").is_read());
      assert!(StatementKind::classify("VALUES (1), (2)").is_read());
      assert!(StatementKind::classify("EXPLAIN QUERY PLAN SELECT 1").is_read());
      assert!(
         StatementKind::classify("WITH recent AS (SELECT * FROM post) SELECT * FROM recent")
            .is_read()
      );
   }

   #[test]
   fn test_classify_writes() {
      assert!(!StatementKind::classify("INSERT INTO user VALUES (1)").is_read());
      assert!(!StatementKind::classify("update user set name = 'x'").is_read());
      assert!(!StatementKind::classify("DELETE FROM user").is_read());
      assert!(!StatementKind::classify("CREATE TABLE t (id INTEGER)").is_read());
      assert!(!StatementKind::classify("DROP TABLE t").is_read());
      assert!(
         !StatementKind::classify("WITH doomed AS (SELECT id FROM user) DELETE FROM user").is_read()
      );
   }

   #[test]
   fn test_classify_does_not_trip_on_identifiers() {
      // Column names containing mutation keywords stay reads
      assert!(StatementKind::classify("WITH w AS (SELECT updated_at FROM t) SELECT * FROM w").is_read());
   }

   #[tokio::test]
   async fn test_bind_for_on_active_session() {
      let session = Session::new(test_router());
      let engine = session.bind_for("user", StatementKind::Write).unwrap();
      assert_eq!(engine.uri(), "sqlite::memory:");
   }

   #[test]
   fn test_bind_after_release_fails_loudly() {
      let session = Session::new(test_router());
      session.release();

      let err = session.bind_for("user", StatementKind::Read).unwrap_err();
      assert!(matches!(err, Error::UseAfterRelease(id) if id == session.id()));
   }

   #[test]
   fn test_release_is_idempotent() {
      let session = Session::new(test_router());
      session.release();
      session.release();
      assert!(session.is_released());
   }

   #[test]
   fn test_registry_one_session_per_scope() {
      let registry = SessionRegistry::new();
      let router = test_router();

      let _session = registry.begin("request-1", &router).unwrap();
      let err = registry.begin("request-1", &router).unwrap_err();
      assert!(matches!(err, Error::SessionAlreadyActive(ref scope) if scope == "request-1"));

      // A different scope is fine
      registry.begin("request-2", &router).unwrap();
      assert_eq!(registry.len(), 2);
   }

   #[test]
   fn test_registry_release_detaches_and_releases() {
      let registry = SessionRegistry::new();
      let router = test_router();

      let session = registry.begin("request-1", &router).unwrap();
      registry.release("request-1");

      assert!(registry.get("request-1").is_none());
      assert!(session.is_released());

      // Second release of the same scope is a no-op
      registry.release("request-1");

      // The scope can host a fresh session afterwards
      registry.begin("request-1", &router).unwrap();
   }

   #[test]
   fn test_registry_release_all() {
      let registry = SessionRegistry::new();
      let router = test_router();

      let a = registry.begin("a", &router).unwrap();
      let b = registry.begin("b", &router).unwrap();

      registry.release_all();
      assert!(registry.is_empty());
      assert!(a.is_released());
      assert!(b.is_released());
   }
}
