//! Declarative schema registration
//!
//! A [`Schema`] is a named collection of table definitions, registered with
//! the router once at application start and retained for the process
//! lifetime. It exists to build the table-to-bind mapping and to group
//! tables for schema-level DDL; the router never interprets the SQL beyond
//! executing it.

/// One table: its name, its CREATE statement, and an optional bind key
/// pre-associated at definition time.
#[derive(Debug, Clone)]
pub struct TableDef {
   name: String,
   create_sql: String,
   bind_key: Option<String>,
}

impl TableDef {
   pub fn new(name: impl Into<String>, create_sql: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         create_sql: create_sql.into(),
         bind_key: None,
      }
   }

   /// Pre-associate this table with a bind key.
   ///
   /// Takes precedence over any schema-wide key passed at registration.
   pub fn with_bind_key(mut self, bind_key: impl Into<String>) -> Self {
      self.bind_key = Some(bind_key.into());
      self
   }

   pub fn name(&self) -> &str {
      &self.name
   }

   pub fn create_sql(&self) -> &str {
      &self.create_sql
   }

   pub fn bind_key(&self) -> Option<&str> {
      self.bind_key.as_deref()
   }
}

/// A named collection of table definitions ("base").
///
/// # Example
///
/// ```
/// use sqlx_sqlite_bind_router::{Schema, TableDef};
///
/// let schema = Schema::new("app")
///     .table(TableDef::new(
///         "user",
///         "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT)",
///     ))
///     .table(
///         TableDef::new(
///             "topic",
///             "CREATE TABLE topic (id INTEGER PRIMARY KEY, title TEXT)",
///         )
///         .with_bind_key("alt"),
///     );
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
   name: String,
   tables: Vec<TableDef>,
}

impl Schema {
   pub fn new(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         tables: Vec::new(),
      }
   }

   /// Add a table definition. Definition order is preserved and is the
   /// order DDL runs in.
   pub fn table(mut self, table: TableDef) -> Self {
      self.tables.push(table);
      self
   }

   pub fn name(&self) -> &str {
      &self.name
   }

   pub fn tables(&self) -> &[TableDef] {
      &self.tables
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_definition_order_preserved() {
      let schema = Schema::new("app")
         .table(TableDef::new("z_last", "CREATE TABLE z_last (id INTEGER)"))
         .table(TableDef::new("a_first", "CREATE TABLE a_first (id INTEGER)"));

      let names: Vec<&str> = schema.tables().iter().map(TableDef::name).collect();
      assert_eq!(names, vec!["z_last", "a_first"]);
   }

   #[test]
   fn test_table_level_bind_key() {
      let table = TableDef::new("topic", "CREATE TABLE topic (id INTEGER)").with_bind_key("alt");
      assert_eq!(table.bind_key(), Some("alt"));
      assert!(
         TableDef::new("user", "CREATE TABLE user (id INTEGER)")
            .bind_key()
            .is_none()
      );
   }
}
