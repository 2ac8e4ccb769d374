//! Shared fixtures: a small article model and an in-memory source.

use std::rc::Rc;
use std::sync::Arc;

use strata::{
    ConnectionRegistry, DatabaseConfig, DatabaseSource, MemoryConfigSource, Model, Property,
    PropertyDef, RowData, Source, Value,
};

/// A blog article with a localized title and a multi-valued tag set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub id: Value,
    pub title_en: String,
    pub title_fr: String,
    pub status: String,
    pub tags: Vec<String>,
    pub views: i64,
}

impl Article {
    pub fn new(id: impl Into<Value>, title_en: &str) -> Self {
        Self {
            id: id.into(),
            title_en: title_en.to_string(),
            status: "draft".to_string(),
            ..Self::default()
        }
    }
}

impl Model for Article {
    fn id(&self) -> Value {
        self.id.clone()
    }

    fn key(&self) -> &str {
        "id"
    }

    fn property_idents(&self) -> Vec<String> {
        ["id", "title", "status", "tags", "views"]
            .map(str::to_string)
            .to_vec()
    }

    fn property(&self, ident: &str) -> Option<Arc<dyn Property>> {
        match ident {
            "id" => Some(PropertyDef::new("id", "INTEGER").into_arc()),
            "title" => Some(
                PropertyDef::new("title", "TEXT")
                    .localized(["en", "fr"])
                    .into_arc(),
            ),
            "status" => Some(
                PropertyDef::new("status", "TEXT")
                    .required()
                    .with_default("draft")
                    .into_arc(),
            ),
            "tags" => Some(PropertyDef::new("tags", "TEXT").multi().into_arc()),
            "views" => Some(PropertyDef::new("views", "INTEGER").into_arc()),
            _ => None,
        }
    }

    fn field_value(&self, field_ident: &str) -> Value {
        match field_ident {
            "id" => self.id.clone(),
            "title_en" => Value::from(self.title_en.as_str()),
            "title_fr" => Value::from(self.title_fr.as_str()),
            "status" => Value::from(self.status.as_str()),
            "tags" => Value::from(self.tags.join(",")),
            "views" => Value::from(self.views),
            _ => Value::Null,
        }
    }

    fn set_flat_data(&mut self, data: &RowData) {
        if let Some(value) = data.get("id") {
            self.id = value.clone();
        }
        if let Some(value) = data.get("title_en").and_then(Value::as_str) {
            self.title_en = value.to_string();
        }
        if let Some(value) = data.get("title_fr").and_then(Value::as_str) {
            self.title_fr = value.to_string();
        }
        if let Some(value) = data.get("status").and_then(Value::as_str) {
            self.status = value.to_string();
        }
        if let Some(value) = data.get("tags").and_then(Value::as_str) {
            self.tags = if value.is_empty() {
                Vec::new()
            } else {
                value.split(',').map(str::to_string).collect()
            };
        }
        if let Some(value) = data.get("views").and_then(Value::as_i64) {
            self.views = value;
        }
    }
}

pub fn registry() -> Rc<ConnectionRegistry> {
    Rc::new(ConnectionRegistry::new(Box::new(
        MemoryConfigSource::new().with_database("main", DatabaseConfig::memory()),
    )))
}

/// A source over a fresh in-memory database, model bound, table set.
pub fn article_source() -> DatabaseSource<Article> {
    let mut source = DatabaseSource::new(registry());
    source.set_table("articles").unwrap();
    source.base_mut().set_model(Article::default());
    source
}
