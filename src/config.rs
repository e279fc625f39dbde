//! Router configuration: master URIs, replica pools, table bind keys
//!
//! Accepts the permissive shapes of the external configuration surface
//! (single-URI shorthands, per-bind-key mappings, scalar-or-list replica
//! entries) and normalizes them into one canonical in-memory structure.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The reserved bind key every deployment must have a master for.
pub const DEFAULT_BIND_KEY: &str = "default";

/// Master URI used when no configuration is supplied at all.
const DEFAULT_MASTER_URI: &str = "sqlite::memory:";

/// Master connection configuration: a single URI is shorthand for
/// `{default: uri}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MasterSpec {
   /// Shorthand: one URI, bound to the `default` key.
   Uri(String),
   /// Explicit bind-key → master URI mapping.
   PerBind(HashMap<String, String>),
}

/// One or more URIs; a scalar is shorthand for a one-element list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UriList {
   One(String),
   Many(Vec<String>),
}

impl UriList {
   fn into_vec(self) -> Vec<String> {
      match self {
         UriList::One(uri) => vec![uri],
         UriList::Many(uris) => uris,
      }
   }
}

/// Replica pool configuration: a URI or list is shorthand for the `default`
/// bind key; otherwise a bind-key → (URI or list) mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplicaSpec {
   /// Shorthand: replicas for the `default` bind key.
   Uris(UriList),
   /// Explicit bind-key → replica URIs mapping.
   PerBind(HashMap<String, UriList>),
}

/// Raw router configuration as consumed from the host application.
///
/// Field aliases accept the original external key spellings (`slaves`,
/// `tableBindKeys`).
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_bind_router::RouterConfig;
///
/// // Use defaults (a single in-memory default master)
/// let config = RouterConfig::new();
///
/// // Or build up explicitly
/// let config = RouterConfig::new()
///     .with_master("default", "sqlite://primary.db")
///     .with_master("archive", "sqlite://archive.db")
///     .with_replicas("default", ["sqlite://replica-1.db", "sqlite://replica-2.db"])
///     .with_table_bind("audit_log", "archive");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
   /// Master connection per bind key.
   pub masters: MasterSpec,

   /// Replica pool per bind key; absent bind keys have no replicas.
   #[serde(alias = "slaves")]
   pub replicas: Option<ReplicaSpec>,

   /// Explicit table-to-bind overrides.
   #[serde(alias = "tableBindKeys")]
   pub table_bind_keys: HashMap<String, String>,
}

impl Default for RouterConfig {
   fn default() -> Self {
      Self {
         masters: MasterSpec::Uri(DEFAULT_MASTER_URI.to_string()),
         replicas: None,
         table_bind_keys: HashMap::new(),
      }
   }
}

impl RouterConfig {
   /// Create a config with a single in-memory default master.
   pub fn new() -> Self {
      Self::default()
   }

   /// Set the master URI for a bind key.
   pub fn with_master(mut self, bind_key: impl Into<String>, uri: impl Into<String>) -> Self {
      let mut masters = match self.masters {
         MasterSpec::PerBind(map) => map,
         // Discard the implicit in-memory default once explicit masters appear
         MasterSpec::Uri(_) => HashMap::new(),
      };
      masters.insert(bind_key.into(), uri.into());
      self.masters = MasterSpec::PerBind(masters);
      self
   }

   /// Set the replica URIs for a bind key.
   pub fn with_replicas<I, S>(mut self, bind_key: impl Into<String>, uris: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      let mut replicas = match self.replicas {
         Some(ReplicaSpec::PerBind(map)) => map,
         Some(ReplicaSpec::Uris(list)) => {
            HashMap::from([(DEFAULT_BIND_KEY.to_string(), list)])
         }
         None => HashMap::new(),
      };
      replicas.insert(
         bind_key.into(),
         UriList::Many(uris.into_iter().map(Into::into).collect()),
      );
      self.replicas = Some(ReplicaSpec::PerBind(replicas));
      self
   }

   /// Bind a table name to a bind key.
   pub fn with_table_bind(
      mut self,
      table: impl Into<String>,
      bind_key: impl Into<String>,
   ) -> Self {
      self.table_bind_keys.insert(table.into(), bind_key.into());
      self
   }

   /// Normalize into the canonical structure the router consumes.
   ///
   /// Promotes shorthands, then validates that a `default` master exists.
   /// Replica entries with an empty URI list are dropped: an absent list
   /// and an empty one route identically.
   pub fn normalize(self) -> Result<NormalizedConfig> {
      let masters = match self.masters {
         MasterSpec::Uri(uri) => HashMap::from([(DEFAULT_BIND_KEY.to_string(), uri)]),
         MasterSpec::PerBind(map) => {
            if !map.contains_key(DEFAULT_BIND_KEY) {
               return Err(Error::MissingDefaultMaster);
            }
            map
         }
      };

      let replicas = match self.replicas {
         None => HashMap::new(),
         Some(ReplicaSpec::Uris(list)) => {
            let uris = list.into_vec();
            if uris.is_empty() {
               HashMap::new()
            } else {
               HashMap::from([(DEFAULT_BIND_KEY.to_string(), uris)])
            }
         }
         Some(ReplicaSpec::PerBind(map)) => map
            .into_iter()
            .map(|(bind_key, list)| (bind_key, list.into_vec()))
            .filter(|(_, uris)| !uris.is_empty())
            .collect(),
      };

      Ok(NormalizedConfig {
         masters,
         replicas,
         table_bind_keys: self.table_bind_keys,
      })
   }
}

/// Canonical configuration produced by [`RouterConfig::normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedConfig {
   /// Bind key → master URI; always contains `default`.
   pub masters: HashMap<String, String>,
   /// Bind key → non-empty replica URI list.
   pub replicas: HashMap<String, Vec<String>>,
   /// Table name → bind key.
   pub table_bind_keys: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   fn from_json(value: serde_json::Value) -> RouterConfig {
      serde_json::from_value(value).unwrap()
   }

   #[test]
   fn test_default_config_normalizes_to_memory_master() {
      let normalized = RouterConfig::new().normalize().unwrap();
      assert_eq!(
         normalized.masters.get(DEFAULT_BIND_KEY).map(String::as_str),
         Some("sqlite::memory:")
      );
      assert!(normalized.replicas.is_empty());
   }

   #[test]
   fn test_scalar_master_promoted_to_default() {
      let config = from_json(json!({ "masters": "sqlite://main.db" }));
      let normalized = config.normalize().unwrap();
      assert_eq!(
         normalized.masters.get(DEFAULT_BIND_KEY).map(String::as_str),
         Some("sqlite://main.db")
      );
   }

   #[test]
   fn test_masters_map_without_default_rejected() {
      let config = from_json(json!({ "masters": { "alt": "sqlite://alt.db" } }));
      let err = config.normalize().unwrap_err();
      assert!(matches!(err, Error::MissingDefaultMaster));
   }

   #[test]
   fn test_scalar_replica_promoted_to_one_element_list() {
      let config = from_json(json!({
         "masters": "sqlite://main.db",
         "replicas": "sqlite://replica.db",
      }));
      let normalized = config.normalize().unwrap();
      assert_eq!(
         normalized.replicas.get(DEFAULT_BIND_KEY),
         Some(&vec!["sqlite://replica.db".to_string()])
      );
   }

   #[test]
   fn test_replica_list_promoted_to_default() {
      let config = from_json(json!({
         "replicas": ["sqlite://r1.db", "sqlite://r2.db"],
      }));
      let normalized = config.normalize().unwrap();
      assert_eq!(normalized.replicas[DEFAULT_BIND_KEY].len(), 2);
   }

   #[test]
   fn test_per_bind_replicas_accept_scalar_and_list() {
      let config = from_json(json!({
         "masters": { "default": "sqlite://main.db", "alt": "sqlite://alt.db" },
         "replicas": {
            "default": ["sqlite://r1.db", "sqlite://r2.db"],
            "alt": "sqlite://alt-replica.db",
         },
      }));
      let normalized = config.normalize().unwrap();
      assert_eq!(normalized.replicas["default"].len(), 2);
      assert_eq!(
         normalized.replicas["alt"],
         vec!["sqlite://alt-replica.db".to_string()]
      );
   }

   #[test]
   fn test_empty_replica_list_dropped() {
      let config = from_json(json!({
         "replicas": { "default": [] },
      }));
      let normalized = config.normalize().unwrap();
      assert!(normalized.replicas.is_empty());
   }

   #[test]
   fn test_original_key_spellings_accepted() {
      let config = from_json(json!({
         "masters": { "default": "sqlite://main.db", "alt": "sqlite://alt.db" },
         "slaves": { "default": "sqlite://replica.db" },
         "tableBindKeys": { "topic": "alt" },
      }));
      let normalized = config.normalize().unwrap();
      assert_eq!(normalized.replicas["default"].len(), 1);
      assert_eq!(
         normalized.table_bind_keys.get("topic").map(String::as_str),
         Some("alt")
      );
   }

   #[test]
   fn test_builder_shapes_match_serde_shapes() {
      let built = RouterConfig::new()
         .with_master("default", "sqlite://main.db")
         .with_replicas("default", ["sqlite://r1.db"])
         .with_table_bind("topic", "alt")
         .normalize()
         .unwrap();

      assert_eq!(built.masters["default"], "sqlite://main.db");
      assert_eq!(built.replicas["default"], vec!["sqlite://r1.db".to_string()]);
      assert_eq!(built.table_bind_keys["topic"], "alt");
   }
}
