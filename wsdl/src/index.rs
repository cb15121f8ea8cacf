use indexmap::IndexMap;

use crate::types::TypeModel;

/// Registry of built type models for one generation run, in registration
/// order. Nested types register before the type that references them.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    models: IndexMap<String, TypeModel>,
}

impl SchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeModel> {
        self.models.get(name)
    }

    /// Registers `model` unless its name is already taken, and returns the
    /// registered instance either way.
    pub fn register(&mut self, model: TypeModel) -> &TypeModel {
        self.models.entry(model.name.clone()).or_insert(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> impl Iterator<Item = &TypeModel> {
        self.models.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
