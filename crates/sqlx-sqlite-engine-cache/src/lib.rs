//! # sqlx-sqlite-engine-cache
//!
//! Caches lazily-connected SQLx SQLite pools ("engines") by connection URI,
//! guaranteeing at most one engine per distinct URI even under concurrent
//! access.
//!
//! ## Core Types
//!
//! - **[`Engine`]**: A pooled connection handle to one database URI
//! - **[`EngineCache`]**: URI → engine map with an atomic get-or-create path
//! - **[`EnginePoolConfig`]**: Pool tuning applied to every cached engine
//! - **[`Error`]**: Error type for engine construction
//!
//! ## Architecture
//!
//! - **Lazy pools**: Engines are built with `connect_lazy_with`, so creating
//!   one performs no I/O; connections are established on first use
//! - **Single critical section**: One mutex guards the cache's whole
//!   check-then-create sequence and is never held while a pool performs I/O
//! - **Shared handles**: Callers receive `Arc<Engine>` clones; the cache
//!   owns every engine for the process lifetime unless it is invalidated

mod cache;
mod config;
mod engine;
mod error;

// Re-export public types
pub use cache::EngineCache;
pub use config::EnginePoolConfig;
pub use engine::Engine;
pub use error::{Error, Result};
