//! A model persistence layer with a structured query-expression model.
//!
//! The facade re-exports the backend-neutral primitives of `strata-core`
//! together with the SQLite backend of `strata-sqlite`. Most applications
//! only need the [`prelude`].
//!
//! ```no_run
//! use std::rc::Rc;
//! use strata::prelude::*;
//! use strata::{ConnectionRegistry, DatabaseConfig, DatabaseSource, MemoryConfigSource};
//!
//! # #[derive(Clone)] struct Article;
//! # impl strata::Model for Article {
//! #     fn id(&self) -> Value { Value::Null }
//! #     fn key(&self) -> &str { "id" }
//! #     fn property_idents(&self) -> Vec<String> { Vec::new() }
//! #     fn property(&self, _: &str) -> Option<std::sync::Arc<dyn strata::Property>> { None }
//! #     fn field_value(&self, _: &str) -> Value { Value::Null }
//! #     fn set_flat_data(&mut self, _: &strata::RowData) {}
//! # }
//! # fn main() -> strata::Result<()> {
//! let registry = Rc::new(ConnectionRegistry::new(Box::new(
//!     MemoryConfigSource::new().with_database("main", DatabaseConfig::memory()),
//! )));
//! let mut source = DatabaseSource::<Article>::new(registry);
//! source.set_table("articles")?;
//! source.base_mut().set_model(Article);
//! source.base_mut().filter("status", "published")?;
//! source.base_mut().order_by("posted_on", OrderMode::Desc)?;
//! let articles = source.load_items()?;
//! # let _ = articles;
//! # Ok(())
//! # }
//! ```

pub use strata_core::{
    Collection, ConfigSource, Conjunction, DatabaseConfig, Field, FieldSpec, Filter, FilterData,
    MemoryConfigSource, Model, Operator, Order, OrderData, OrderMode, Pagination, PaginationData,
    Property, PropertyDef, PropertyRef, Result, RowData, Source, SourceBase, StrataError, Value,
    quote_identifier,
};
pub use strata_sqlite::{ColumnInfo, ConnectionRegistry, DatabaseSource};

/// The handful of items nearly every caller needs.
pub mod prelude {
    pub use strata_core::{
        Filter, Model, Operator, Order, OrderMode, Pagination, Property, Source, Value,
    };
    pub use strata_sqlite::DatabaseSource;
}
