//! Backend-neutral persistence primitives.
//!
//! This crate holds everything a storage backend does not need to know the
//! database for: the dynamic [`Value`] type, the [`Model`] / [`Property`]
//! capability traits, query expressions ([`Filter`], [`Order`],
//! [`Pagination`]), the key-indexed [`Collection`], connection
//! configuration, and the [`Source`] contract with its shared
//! [`SourceBase`] criteria state.
//!
//! Concrete backends (such as `strata-sqlite`) compile the expressions into
//! parameterized SQL and implement [`Source`].

pub mod collection;
pub mod config;
pub mod error;
pub mod expression;
pub mod field;
pub mod model;
pub mod source;
pub mod value;

pub use collection::Collection;
pub use config::{ConfigSource, DatabaseConfig, MemoryConfigSource};
pub use error::{Result, StrataError};
pub use expression::{
    Conjunction, Filter, FilterData, Operator, Order, OrderData, OrderMode, Pagination,
    PaginationData,
};
pub use field::{Field, PropertyRef, quote_identifier};
pub use model::{FieldSpec, Model, Property, PropertyDef, RowData};
pub use source::{Source, SourceBase};
pub use value::Value;
