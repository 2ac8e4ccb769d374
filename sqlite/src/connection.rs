//! Lazily opened, shared SQLite connection handles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use rusqlite::Connection;
use tracing::debug;

use strata_core::{ConfigSource, DatabaseConfig, Result, StrataError};

/// An explicit registry of named connections.
///
/// Connections are opened on first use and shared by handle afterwards;
/// sources hold the registry, never a bare connection. Dropping the registry
/// (or calling [`ConnectionRegistry::close`]) releases the handles it owns.
pub struct ConnectionRegistry {
    config: Box<dyn ConfigSource>,
    connections: RefCell<HashMap<String, Rc<Connection>>>,
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("default_database", &self.config.default_database())
            .field(
                "open",
                &self.connections.borrow().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ConnectionRegistry {
    pub fn new(config: Box<dyn ConfigSource>) -> Self {
        Self {
            config,
            connections: RefCell::new(HashMap::new()),
        }
    }

    /// The identifier of the default connection.
    pub fn default_database(&self) -> &str {
        self.config.default_database()
    }

    /// The shared handle for a named connection, opening it on first use.
    pub fn handle(&self, ident: &str) -> Result<Rc<Connection>> {
        if let Some(connection) = self.connections.borrow().get(ident) {
            return Ok(Rc::clone(connection));
        }
        let config = self.config.database_config(ident)?;
        let connection = Rc::new(open(ident, &config)?);
        self.connections
            .borrow_mut()
            .insert(ident.to_string(), Rc::clone(&connection));
        Ok(connection)
    }

    /// Drop a named connection handle; returns whether one was open.
    ///
    /// Outstanding handles keep the underlying connection alive until they
    /// are dropped as well.
    pub fn close(&self, ident: &str) -> bool {
        self.connections.borrow_mut().remove(ident).is_some()
    }
}

fn open(ident: &str, config: &DatabaseConfig) -> Result<Connection> {
    if !config.kind.eq_ignore_ascii_case("sqlite") {
        return Err(StrataError::not_configured(format!(
            "connection \"{ident}\" is of kind \"{}\", not sqlite",
            config.kind
        )));
    }
    let path = sqlite_path(ident, config)?;
    let connection = if path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };
    connection.pragma_update(None, "foreign_keys", true)?;
    debug!(database = %ident, path = %path, "opened sqlite connection");
    Ok(connection)
}

/// The filesystem path (or `:memory:`) a configuration points at.
///
/// `database` is the path. An empty one is rejected rather than falling back
/// to the hostname, which is not a filename; `:memory:` in either field is
/// honored for host-style configs.
fn sqlite_path<'a>(ident: &str, config: &'a DatabaseConfig) -> Result<&'a str> {
    if !config.database.is_empty() {
        return Ok(&config.database);
    }
    if config.hostname == ":memory:" {
        return Ok(":memory:");
    }
    Err(StrataError::not_configured(format!(
        "connection \"{ident}\" has no database path"
    )))
}
