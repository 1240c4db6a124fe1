//! Hydrated entity instances.
//!
//! An [`Entity`] is the materialized form of one database row: declared
//! fields keyed by host-convention name, an overflow bag for row fields
//! with no matching declared column (aggregate aliases, ad hoc selects),
//! and an attachment slot per loaded relation.
//!
//! Entities are created fresh per row per query and never shared or cached
//! across queries.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::row::FromValue;
use crate::value::Value;
use std::collections::HashMap;

/// A loaded relation attachment.
#[derive(Debug, Clone, PartialEq)]
pub enum Attached {
    /// A to-one relation: a single child, or none matched.
    One(Option<Box<Entity>>),
    /// A to-many relation: zero or more children.
    Many(Vec<Entity>),
}

/// A materialized entity instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    /// Declared fields, keyed by host-convention field name.
    fields: HashMap<String, Value>,
    /// Overflow bag, keyed by the original database field name.
    extras: HashMap<String, Value>,
    /// Loaded relation attachments, keyed by relation name.
    relations: HashMap<String, Attached>,
}

impl Entity {
    /// Create a blank entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a declared field.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Get a declared field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a typed declared field value.
    pub fn get_named<T: FromValue>(&self, field: &str) -> Result<T> {
        let value = self.get(field).ok_or_else(|| {
            Error::Type(TypeError {
                expected: std::any::type_name::<T>(),
                actual: format!("field '{}' not set", field),
                column: Some(field.to_string()),
            })
        })?;
        T::from_value(value).map_err(|e| match e {
            Error::Type(mut te) => {
                te.column = Some(field.to_string());
                Error::Type(te)
            }
            e => e,
        })
    }

    /// All declared fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Insert into the overflow bag.
    pub fn set_extra(&mut self, name: impl Into<String>, value: Value) {
        self.extras.insert(name.into(), value);
    }

    /// Get an overflow-bag value.
    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }

    /// The whole overflow bag.
    pub fn extras(&self) -> &HashMap<String, Value> {
        &self.extras
    }

    /// Attach a to-one relation.
    pub fn attach_one(&mut self, name: impl Into<String>, child: Option<Entity>) {
        self.relations
            .insert(name.into(), Attached::One(child.map(Box::new)));
    }

    /// Attach a to-many relation.
    pub fn attach_many(&mut self, name: impl Into<String>, children: Vec<Entity>) {
        self.relations.insert(name.into(), Attached::Many(children));
    }

    /// Get a loaded to-one relation (None if unloaded or no match).
    pub fn related(&self, name: &str) -> Option<&Entity> {
        match self.relations.get(name) {
            Some(Attached::One(Some(child))) => Some(child),
            _ => None,
        }
    }

    /// Get a loaded to-many relation (empty if unloaded).
    pub fn related_many(&self, name: &str) -> &[Entity] {
        match self.relations.get(name) {
            Some(Attached::Many(children)) => children,
            _ => &[],
        }
    }

    /// Check whether a relation slot has been loaded.
    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_fields_and_extras_are_separate() {
        let mut entity = Entity::new();
        entity.set("name", Value::Text("Ada".to_string()));
        entity.set_extra("row_count", Value::BigInt(3));

        assert_eq!(entity.get("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(entity.get("row_count"), None);
        assert_eq!(entity.extra("row_count"), Some(&Value::BigInt(3)));
    }

    #[test]
    fn typed_access() {
        let mut entity = Entity::new();
        entity.set("age", Value::Int(30));

        assert_eq!(entity.get_named::<i32>("age").unwrap(), 30);
        assert!(entity.get_named::<String>("age").is_err());
        assert!(entity.get_named::<i32>("missing").is_err());
    }

    #[test]
    fn relation_attachments() {
        let mut parent = Entity::new();
        let mut child = Entity::new();
        child.set("id", Value::BigInt(1));

        parent.attach_one("team", Some(child.clone()));
        parent.attach_many("posts", vec![child.clone(), child]);
        parent.attach_one("missing_team", None);

        assert!(parent.related("team").is_some());
        assert_eq!(parent.related_many("posts").len(), 2);
        assert!(parent.related("missing_team").is_none());
        assert!(parent.has_relation("missing_team"));
        assert!(!parent.has_relation("never_loaded"));
        assert!(parent.related_many("never_loaded").is_empty());
    }
}
