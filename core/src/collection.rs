//! A deduplicated, key-indexed, order-preserving store of loaded entities.

use std::collections::HashMap;

use crate::error::{Result, StrataError};
use crate::model::Model;
use crate::value::Value;

/// An insertion-ordered collection of models, deduplicated by identity key.
///
/// Each entity is held exactly once per identity: re-adding a key replaces
/// the stored instance in place, at its original position. Lookup is O(1)
/// through an internal key index.
#[derive(Debug, Clone)]
pub struct Collection<M: Model> {
    objects: Vec<M>,
    /// Index from identity key to position for fast lookups
    index: HashMap<Value, usize>,
}

impl<M: Model> Default for Collection<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Collection<M> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a collection from an iterable of entities.
    pub fn from_objects<I>(objs: I) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
    {
        let mut collection = Self::new();
        collection.merge(objs)?;
        Ok(collection)
    }

    /// Add an entity, indexing it by its identity key.
    ///
    /// Fails with `InvalidArgument` when the entity has no identity key; the
    /// collection is left unchanged. An entity with an already-present key
    /// replaces the stored instance at its original position.
    pub fn add(&mut self, obj: M) -> Result<()> {
        let key = obj.id();
        if key.is_null() {
            return Err(StrataError::invalid(
                "entity has no identity key and can not be indexed",
            ));
        }
        match self.index.get(&key) {
            Some(&position) => self.objects[position] = obj,
            None => {
                self.index.insert(key, self.objects.len());
                self.objects.push(obj);
            }
        }
        Ok(())
    }

    /// Add every entity from an iterable.
    ///
    /// Not atomic: a failure partway through leaves prior successful adds in
    /// place.
    pub fn merge<I>(&mut self, objs: I) -> Result<()>
    where
        I: IntoIterator<Item = M>,
    {
        for obj in objs {
            self.add(obj)?;
        }
        Ok(())
    }

    /// Look up an entity by identity key. Never constructs a placeholder.
    pub fn by_key(&self, key: &Value) -> Option<&M> {
        self.index.get(key).map(|&position| &self.objects[position])
    }

    /// Look up the stored instance matching another entity's identity key.
    pub fn by_model(&self, obj: &M) -> Option<&M> {
        self.by_key(&obj.id())
    }

    /// Positional lookup. Negative positions resolve from the end.
    pub fn by_position(&self, position: i64) -> Option<&M> {
        let len = self.objects.len() as i64;
        let index = if position < 0 { len + position } else { position };
        if index < 0 || index >= len {
            return None;
        }
        Some(&self.objects[index as usize])
    }

    pub fn has(&self, key: &Value) -> bool {
        self.index.contains_key(key)
    }

    /// Remove an entity by identity key; a no-op when the key is absent.
    pub fn remove(&mut self, key: &Value) -> Option<M> {
        let position = self.index.remove(key)?;
        let obj = self.objects.remove(position);
        for index in self.index.values_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        Some(obj)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.index.clear();
    }

    /// The first entity in insertion order.
    pub fn first(&self) -> Option<&M> {
        self.objects.first()
    }

    /// The last entity in insertion order.
    pub fn last(&self) -> Option<&M> {
        self.objects.last()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Identity keys in insertion order.
    pub fn keys(&self) -> Vec<Value> {
        self.objects.iter().map(Model::id).collect()
    }

    /// Entities in insertion order.
    pub fn values(&self) -> &[M] {
        &self.objects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.objects.iter()
    }
}

impl<'a, M: Model> IntoIterator for &'a Collection<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl<M: Model> IntoIterator for Collection<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Property, RowData};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: Value,
        name: String,
    }

    impl Item {
        fn new(id: impl Into<Value>, name: &str) -> Self {
            Self {
                id: id.into(),
                name: name.to_string(),
            }
        }
    }

    impl Model for Item {
        fn id(&self) -> Value {
            self.id.clone()
        }

        fn key(&self) -> &str {
            "id"
        }

        fn property_idents(&self) -> Vec<String> {
            vec!["id".to_string(), "name".to_string()]
        }

        fn property(&self, _ident: &str) -> Option<Arc<dyn Property>> {
            None
        }

        fn field_value(&self, field_ident: &str) -> Value {
            match field_ident {
                "id" => self.id.clone(),
                "name" => Value::from(self.name.as_str()),
                _ => Value::Null,
            }
        }

        fn set_flat_data(&mut self, _data: &RowData) {}
    }

    #[test]
    fn add_then_lookup_by_key() {
        let mut collection = Collection::new();
        let item = Item::new(1i64, "one");
        collection.add(item.clone()).unwrap();
        assert_eq!(collection.by_key(&Value::Integer(1)), Some(&item));
        assert_eq!(collection.by_model(&item), Some(&item));
    }

    #[test]
    fn entity_without_identity_is_rejected_and_state_unchanged() {
        let mut collection = Collection::new();
        collection.add(Item::new(1i64, "one")).unwrap();
        let err = collection.add(Item::new(Value::Null, "anonymous"));
        assert!(matches!(err, Err(StrataError::InvalidArgument(_))));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn duplicate_key_replaces_in_place() {
        let mut collection = Collection::new();
        collection.add(Item::new(1i64, "one")).unwrap();
        collection.add(Item::new(2i64, "two")).unwrap();
        collection.add(Item::new(1i64, "uno")).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.by_position(0).unwrap().name, "uno");
        assert_eq!(collection.by_key(&Value::Integer(1)).unwrap().name, "uno");
    }

    #[test]
    fn merge_is_not_atomic() {
        let mut collection = Collection::new();
        let result = collection.merge([
            Item::new(1i64, "one"),
            Item::new(Value::Null, "bad"),
            Item::new(2i64, "two"),
        ]);
        assert!(result.is_err());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn negative_positions_resolve_from_the_end() {
        let mut collection = Collection::new();
        collection
            .merge([Item::new(1i64, "a"), Item::new(2i64, "b"), Item::new(3i64, "c")])
            .unwrap();
        assert_eq!(collection.by_position(-1).unwrap().name, "c");
        assert_eq!(collection.by_position(-3).unwrap().name, "a");
        assert_eq!(collection.by_position(-4), None);
        assert_eq!(collection.by_position(3), None);
    }

    #[test]
    fn remove_is_a_noop_on_absent_keys() {
        let mut collection = Collection::new();
        collection.add(Item::new(1i64, "one")).unwrap();
        assert!(collection.remove(&Value::Integer(9)).is_none());
        assert_eq!(collection.len(), 1);

        collection.remove(&Value::Integer(1));
        assert!(collection.is_empty());
        assert_eq!(collection.first(), None);
        assert_eq!(collection.last(), None);
    }

    #[test]
    fn removal_keeps_the_index_consistent() {
        let mut collection = Collection::new();
        collection
            .merge([Item::new(1i64, "a"), Item::new(2i64, "b"), Item::new(3i64, "c")])
            .unwrap();
        collection.remove(&Value::Integer(1));
        assert_eq!(collection.by_key(&Value::Integer(3)).unwrap().name, "c");
        assert_eq!(collection.keys(), vec![Value::Integer(2), Value::Integer(3)]);
    }
}

