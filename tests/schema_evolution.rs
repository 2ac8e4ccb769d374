mod common;

use std::rc::Rc;
use std::sync::Arc;

use common::{Article, article_source, registry};
use strata::{
    ConnectionRegistry, DatabaseSource, Model, Property, PropertyDef, RowData, Source,
    StrataError, Value,
};

fn article_source_on(registry: Rc<ConnectionRegistry>) -> DatabaseSource<Article> {
    let mut source = DatabaseSource::new(registry);
    source.set_table("articles").unwrap();
    source.base_mut().set_model(Article::default());
    source
}

#[test]
fn saving_creates_the_table_on_demand() {
    let source = article_source();
    assert!(!source.table_exists().unwrap());

    source.save_item(&Article::new(1i64, "Hello")).unwrap();
    assert!(source.table_exists().unwrap());

    let columns = source.table_structure().unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["id", "title_en", "title_fr", "status", "tags", "views"]
    );
}

#[test]
fn auto_create_can_be_disabled() {
    let mut source = article_source();
    source.set_auto_create_schema(false);

    assert!(matches!(
        source.save_item(&Article::new(1i64, "Hello")),
        Err(StrataError::NotConfigured(_))
    ));
    assert!(!source.table_exists().unwrap());
}

#[test]
fn create_table_is_a_noop_when_present() {
    let source = article_source();
    source.create_table().unwrap();
    source.save_item(&Article::new(1i64, "Hello")).unwrap();

    source.create_table().unwrap();
    assert_eq!(source.load_items().unwrap().len(), 1);
}

#[test]
fn alter_table_creates_a_missing_table() {
    let source = article_source();
    source.alter_table().unwrap();
    assert!(source.table_exists().unwrap());
}

/// The article model plus a summary column; no existing column changed.
#[derive(Debug, Clone, Default)]
struct WithSummary(Article);

impl Model for WithSummary {
    fn id(&self) -> Value {
        self.0.id()
    }

    fn key(&self) -> &str {
        "id"
    }

    fn property_idents(&self) -> Vec<String> {
        let mut idents = self.0.property_idents();
        idents.push("summary".to_string());
        idents
    }

    fn property(&self, ident: &str) -> Option<Arc<dyn Property>> {
        match ident {
            "summary" => Some(PropertyDef::new("summary", "TEXT").into_arc()),
            other => self.0.property(other),
        }
    }

    fn field_value(&self, field_ident: &str) -> Value {
        self.0.field_value(field_ident)
    }

    fn set_flat_data(&mut self, data: &RowData) {
        self.0.set_flat_data(data);
    }
}

#[test]
fn alter_table_adds_missing_columns() {
    let shared = registry();
    let source = article_source_on(Rc::clone(&shared));
    source.save_item(&Article::new(1i64, "Hello")).unwrap();

    let mut upgraded: DatabaseSource<WithSummary> = DatabaseSource::new(shared);
    upgraded.set_table("articles").unwrap();
    upgraded.base_mut().set_model(WithSummary::default());
    upgraded.alter_table().unwrap();

    let columns = upgraded.table_structure().unwrap();
    assert!(columns.iter().any(|c| c.name == "summary"));

    // The existing row survived.
    let loaded = upgraded.load_item(&Value::Integer(1)).unwrap().unwrap();
    assert_eq!(loaded.0.title_en, "Hello");
}

/// The article model with a summary column and a widened views type.
#[derive(Debug, Clone, Default)]
struct ArticleV2 {
    inner: Article,
    summary: String,
}

impl Model for ArticleV2 {
    fn id(&self) -> Value {
        self.inner.id()
    }

    fn key(&self) -> &str {
        "id"
    }

    fn property_idents(&self) -> Vec<String> {
        let mut idents = self.inner.property_idents();
        idents.push("summary".to_string());
        idents
    }

    fn property(&self, ident: &str) -> Option<Arc<dyn Property>> {
        match ident {
            "summary" => Some(PropertyDef::new("summary", "TEXT").into_arc()),
            "views" => Some(PropertyDef::new("views", "REAL").into_arc()),
            other => self.inner.property(other),
        }
    }

    fn field_value(&self, field_ident: &str) -> Value {
        match field_ident {
            "summary" => Value::from(self.summary.as_str()),
            other => self.inner.field_value(other),
        }
    }

    fn set_flat_data(&mut self, data: &RowData) {
        self.inner.set_flat_data(data);
        if let Some(value) = data.get("summary").and_then(Value::as_str) {
            self.summary = value.to_string();
        }
    }
}

#[test]
fn alter_table_rebuilds_on_column_drift() {
    let shared = registry();
    let source = article_source_on(Rc::clone(&shared));
    let mut article = Article::new(1i64, "Hello");
    article.views = 9;
    source.save_item(&article).unwrap();

    // views changes type INTEGER -> REAL, which forces a rebuild.
    let mut upgraded: DatabaseSource<ArticleV2> = DatabaseSource::new(shared);
    upgraded.set_table("articles").unwrap();
    upgraded.base_mut().set_model(ArticleV2::default());
    upgraded.alter_table().unwrap();

    let columns = upgraded.table_structure().unwrap();
    let views = columns.iter().find(|c| c.name == "views").unwrap();
    assert!(views.sql_type.eq_ignore_ascii_case("REAL"));
    assert!(columns.iter().any(|c| c.name == "summary"));

    let loaded = upgraded.load_item(&Value::Integer(1)).unwrap().unwrap();
    assert_eq!(loaded.inner.title_en, "Hello");
    assert_eq!(loaded.summary, "");
}
