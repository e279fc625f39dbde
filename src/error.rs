/// Result type alias for routing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bind-routing operations.
///
/// Routing is a pure decision layer: underlying connection and pool errors
/// pass through unmodified rather than being masked or reinterpreted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// A masters mapping was supplied without the required `default` key.
   /// Fatal at startup, not recoverable.
   #[error("'default' master is required in the masters configuration")]
   MissingDefaultMaster,

   /// A resolved bind key has no master URI configured.
   #[error("no master configured for bind key '{0}'")]
   UndefinedBind(String),

   /// A unit of work was used after `release()`.
   #[error("session {0} used after release")]
   UseAfterRelease(uuid::Uuid),

   /// A scope already holds an active session.
   #[error("session already active for scope: {0}")]
   SessionAlreadyActive(String),

   /// Error from the engine cache.
   #[error(transparent)]
   EngineCache(#[from] sqlx_sqlite_engine_cache::Error),

   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::MissingDefaultMaster => "MISSING_DEFAULT_MASTER".to_string(),
         Error::UndefinedBind(_) => "UNDEFINED_BIND".to_string(),
         Error::UseAfterRelease(_) => "USE_AFTER_RELEASE".to_string(),
         Error::SessionAlreadyActive(_) => "SESSION_ALREADY_ACTIVE".to_string(),
         Error::EngineCache(_) => "ENGINE_CACHE_ERROR".to_string(),
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_code_missing_default_master() {
      let err = Error::MissingDefaultMaster;
      assert_eq!(err.error_code(), "MISSING_DEFAULT_MASTER");
      assert!(err.to_string().contains("'default'"));
   }

   #[test]
   fn test_error_code_undefined_bind() {
      let err = Error::UndefinedBind("analytics".into());
      assert_eq!(err.error_code(), "UNDEFINED_BIND");
      assert!(err.to_string().contains("analytics"));
   }

   #[test]
   fn test_error_code_use_after_release() {
      let id = uuid::Uuid::new_v4();
      let err = Error::UseAfterRelease(id);
      assert_eq!(err.error_code(), "USE_AFTER_RELEASE");
      assert!(err.to_string().contains(&id.to_string()));
   }

   #[test]
   fn test_error_code_session_already_active() {
      let err = Error::SessionAlreadyActive("request-42".into());
      assert_eq!(err.error_code(), "SESSION_ALREADY_ACTIVE");
      assert!(err.to_string().contains("request-42"));
   }

   #[test]
   fn test_error_code_sqlx_non_database() {
      // RowNotFound is not a database error, so no SQLite code
      let err = Error::Sqlx(sqlx::Error::RowNotFound);
      assert_eq!(err.error_code(), "SQLX_ERROR");
   }
}
