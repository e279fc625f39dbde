//! Error types for sqlx-sqlite-engine-cache

use thiserror::Error;

/// Errors that may occur when constructing or using cached engines
#[derive(Error, Debug)]
pub enum Error {
   /// The connection URI could not be parsed into SQLite connect options
   #[error("invalid database uri '{uri}': {source}")]
   InvalidUri {
      uri: String,
      source: sqlx::Error,
   },

   /// Error from the sqlx library. Standard sqlx errors are converted to
   /// this variant and passed through unmodified.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
