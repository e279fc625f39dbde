//! Table-name → bind-key resolution

use std::collections::HashMap;

use tracing::debug;

use crate::config::DEFAULT_BIND_KEY;

/// Resolves table names to bind keys.
///
/// Mappings are written during the startup phase (schema registration) and
/// read-only once serving traffic begins. That phase boundary is expressed
/// in the types: registration needs `&mut self`, so all of it happens before
/// the owning router is shared behind an `Arc`, and the steady-state read
/// path takes no lock.
#[derive(Debug, Default)]
pub struct BindResolver {
   table_bind_keys: HashMap<String, String>,
}

impl BindResolver {
   /// Create a resolver seeded with explicit table-to-bind overrides.
   pub fn new(table_bind_keys: HashMap<String, String>) -> Self {
      Self { table_bind_keys }
   }

   /// The bind key for `table`: its mapping if present, else `default`.
   ///
   /// Total function; unmapped tables always resolve.
   pub fn bind_key_for(&self, table: &str) -> &str {
      self
         .table_bind_keys
         .get(table)
         .map(String::as_str)
         .unwrap_or(DEFAULT_BIND_KEY)
   }

   /// Record a table-to-bind mapping, returning whether it was recorded.
   ///
   /// First registration wins: re-registering an already-bound table is a
   /// no-op unless `overwrite` is set. This keeps a later schema from
   /// silently stealing a table's bind.
   pub fn register(&mut self, table: &str, bind_key: &str, overwrite: bool) -> bool {
      if !overwrite && self.table_bind_keys.contains_key(table) {
         debug!(
            "Table '{}' already bound to '{}', keeping existing mapping",
            table,
            self.bind_key_for(table)
         );
         return false;
      }
      self
         .table_bind_keys
         .insert(table.to_string(), bind_key.to_string());
      true
   }

   /// Number of explicit table mappings.
   pub fn len(&self) -> usize {
      self.table_bind_keys.len()
   }

   /// Whether no explicit mappings exist.
   pub fn is_empty(&self) -> bool {
      self.table_bind_keys.is_empty()
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_unmapped_table_resolves_to_default() {
      let resolver = BindResolver::default();
      assert_eq!(resolver.bind_key_for("anything"), DEFAULT_BIND_KEY);
   }

   #[test]
   fn test_mapped_table_resolves_to_its_key() {
      let resolver = BindResolver::new(HashMap::from([("topic".to_string(), "alt".to_string())]));
      assert_eq!(resolver.bind_key_for("topic"), "alt");
      assert_eq!(resolver.bind_key_for("user"), DEFAULT_BIND_KEY);
   }

   #[test]
   fn test_first_registration_wins() {
      let mut resolver = BindResolver::default();
      assert!(resolver.register("topic", "alt", false));
      assert!(!resolver.register("topic", "other", false));
      assert_eq!(resolver.bind_key_for("topic"), "alt");
   }

   #[test]
   fn test_explicit_overwrite_replaces() {
      let mut resolver = BindResolver::default();
      resolver.register("topic", "alt", false);
      assert!(resolver.register("topic", "other", true));
      assert_eq!(resolver.bind_key_for("topic"), "other");
   }
}
