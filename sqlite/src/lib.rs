//! SQLite backend for the strata persistence layer.
//!
//! [`ConnectionRegistry`] owns the named connection handles, [`compile`]
//! turns backend-neutral expressions into parameterized SQL, [`schema`]
//! introspects live tables, and [`DatabaseSource`] ties it all together as a
//! [`strata_core::Source`] implementation.

pub mod compile;
pub mod connection;
pub mod schema;
pub mod source;

pub use compile::{Params, filters_sql, orders_sql, pagination_sql};
pub use connection::ConnectionRegistry;
pub use schema::ColumnInfo;
pub use source::DatabaseSource;
