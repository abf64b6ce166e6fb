//! Field registry
//!
//! Maps field names to typed accessors. A registry is built once per model
//! type and shared by every query against that type.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::{QueryError, QueryResult};

use super::value::{FieldKind, FieldValue};

/// Reads one field out of a record
pub type Accessor<T> = Box<dyn Fn(&T) -> FieldValue + Send + Sync>;

/// A named, typed field of `T`
pub struct FieldDef<T> {
    name: String,
    kind: FieldKind,
    accessor: Accessor<T>,
}

impl<T> FieldDef<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Reads this field from a record
    pub fn read(&self, record: &T) -> FieldValue {
        (self.accessor)(record)
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Name -> accessor mapping for a model type
pub struct FieldRegistry<T> {
    fields: Vec<FieldDef<T>>,
    by_name: HashMap<String, usize>,
}

impl<T> Default for FieldRegistry<T> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T> FieldRegistry<T> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field. Registering a name twice replaces the earlier accessor.
    pub fn field<F>(mut self, name: impl Into<String>, kind: FieldKind, accessor: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        let def = FieldDef {
            name: name.into(),
            kind,
            accessor: Box::new(accessor),
        };

        match self.by_name.get(&def.name) {
            Some(&idx) => self.fields[idx] = def,
            None => {
                self.by_name.insert(def.name.clone(), self.fields.len());
                self.fields.push(def);
            }
        }
        self
    }

    /// Looks up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldDef<T>> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    /// Looks up a field, rejecting unknown names
    pub fn resolve(&self, name: &str) -> QueryResult<&FieldDef<T>> {
        self.get(name)
            .ok_or_else(|| QueryError::invalid(format!("unknown field '{}'", name)))
    }

    /// Field names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

/// Declared field of a JSON record, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name; dots address nested objects (`address.city`)
    pub name: String,
    pub kind: FieldKind,
    /// Whether free-text search looks at this field
    #[serde(default)]
    pub searchable: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            searchable: false,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    fn pointer(&self) -> String {
        let mut pointer = String::with_capacity(self.name.len() + 1);
        for segment in self.name.split('.') {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        pointer
    }
}

impl FieldRegistry<serde_json::Value> {
    /// Builds a registry over JSON objects from field declarations
    pub fn from_declarations(decls: &[FieldDecl]) -> Self {
        decls.iter().fold(Self::new(), |registry, decl| {
            let pointer = decl.pointer();
            let kind = decl.kind;
            registry.field(decl.name.clone(), kind, move |doc: &serde_json::Value| {
                doc.pointer(&pointer)
                    .map(|v| FieldValue::from_json(v, kind))
                    .unwrap_or(FieldValue::Null)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct User {
        name: String,
        age: u32,
    }

    fn user_registry() -> FieldRegistry<User> {
        FieldRegistry::new()
            .field("name", FieldKind::Text, |u: &User| FieldValue::from(&u.name))
            .field("age", FieldKind::Int, |u: &User| FieldValue::from(u.age))
    }

    #[test]
    fn test_typed_accessors() {
        let registry = user_registry();
        let user = User {
            name: "Alice".into(),
            age: 30,
        };

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("age").unwrap().read(&user), FieldValue::Int(30));
        assert_eq!(registry.get("name").unwrap().kind(), FieldKind::Text);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let registry = user_registry();
        let err = registry.resolve("email").unwrap_err();
        assert!(matches!(err, QueryError::InvalidQuery(_)));
    }

    #[test]
    fn test_reregistering_replaces() {
        let registry = user_registry().field("age", FieldKind::Float, |u: &User| {
            FieldValue::Float(u.age as f64)
        });

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("age").unwrap().kind(), FieldKind::Float);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["name", "age"]);
    }

    #[test]
    fn test_json_registry_nested_fields() {
        let registry = FieldRegistry::from_declarations(&[
            FieldDecl::new("name", FieldKind::Text).searchable(),
            FieldDecl::new("address.city", FieldKind::Text),
            FieldDecl::new("score", FieldKind::Float),
        ]);

        let doc = json!({"name": "Ann", "address": {"city": "Oslo"}});

        assert_eq!(
            registry.resolve("address.city").unwrap().read(&doc),
            FieldValue::from("Oslo")
        );
        // missing field reads as null
        assert_eq!(registry.resolve("score").unwrap().read(&doc), FieldValue::Null);
    }

    #[test]
    fn test_decl_json_form() {
        let decl: FieldDecl =
            serde_json::from_value(json!({"name": "tags", "kind": "list"})).unwrap();
        assert_eq!(decl.kind, FieldKind::List);
        assert!(!decl.searchable);
    }
}
