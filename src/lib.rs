//! # sqlx-sqlite-bind-router
//!
//! A connection-routing layer between data-access code and a set of
//! physical SQLite databases: tables partition across independent databases
//! ("binds"), and within a bind, writes go to the master while reads spread
//! across replicas by uniform random choice.
//!
//! ## Core Types
//!
//! - **[`RouterConfig`]**: Permissive external configuration, normalized on
//!   router construction
//! - **[`BindRouter`]**: Resolves (bind key, read/write intent) to a cached
//!   engine; the single entry point for all routing
//! - **[`Schema`]** / **[`TableDef`]**: Declarative table registration used
//!   to build the table-to-bind mapping and to scope DDL per bind
//! - **[`Session`]** / **[`SessionRegistry`]**: Per-request unit of work
//!   binding each entity access to the right engine
//! - **[`Error`]**: Error type for routing operations
//!
//! ## Architecture
//!
//! - **Startup vs. serving**: configuration and schema registration mutate
//!   the router (`&mut self`) before it is shared; the serving path is
//!   lock-free except for the engine cache's construction mutex
//! - **One engine per URI**: the [`EngineCache`] guarantees a single pooled
//!   engine per distinct URI, reused for the process lifetime
//! - **Pure decision layer**: no query planning, no transaction
//!   coordination across binds, no replica health checking; pool errors
//!   pass through unmodified

mod binds;
mod config;
mod error;
mod router;
mod schema;
mod session;

// Re-export public types
pub use binds::BindResolver;
pub use config::{DEFAULT_BIND_KEY, MasterSpec, NormalizedConfig, ReplicaSpec, RouterConfig, UriList};
pub use error::{Error, Result};
pub use router::BindRouter;
pub use schema::{Schema, TableDef};
pub use session::{Session, SessionRegistry, StatementKind};

// Engine types come from the cache crate; re-exported so callers need only
// this crate for the common path.
pub use sqlx_sqlite_engine_cache::{Engine, EngineCache, EnginePoolConfig};
