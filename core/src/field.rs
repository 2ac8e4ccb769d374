//! The physical-identifier aspect of a property or raw column reference.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StrataError};
use crate::model::Property;

/// Quote an identifier for direct interpolation into SQL text.
///
/// Embedded backticks are doubled; the escaping step is mandatory and is the
/// only path by which identifiers reach generated SQL.
pub fn quote_identifier(ident: &str, table: Option<&str>) -> String {
    let ident = ident.replace('`', "``");
    match table {
        Some(table) => format!("`{}`.`{}`", table.replace('`', "``"), ident),
        None => format!("`{ident}`"),
    }
}

/// Either a structured property reference or a raw field identifier.
///
/// Exactly one is set at any time; assigning one form replaces the other.
#[derive(Clone)]
pub enum PropertyRef {
    Property(Arc<dyn Property>),
    Ident(String),
}

impl fmt::Debug for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyRef::Property(p) => f.debug_tuple("Property").field(&p.ident()).finish(),
            PropertyRef::Ident(s) => f.debug_tuple("Ident").field(s).finish(),
        }
    }
}

/// A `(property reference | raw identifier, optional table qualifier)` pair.
///
/// Produces fully qualified, quote-escaped identifiers for use in generated
/// SQL. Constructed while an expression is built and immutable once the
/// expression is handed to a source.
#[derive(Debug, Clone, Default)]
pub struct Field {
    reference: Option<PropertyRef>,
    table_name: Option<String>,
}

impl Field {
    /// Assign a structured property reference, replacing any raw identifier.
    pub fn set_property(&mut self, property: Arc<dyn Property>) -> Result<&mut Self> {
        if property.ident().is_empty() {
            return Err(StrataError::invalid("property must have an identifier"));
        }
        self.reference = Some(PropertyRef::Property(property));
        Ok(self)
    }

    /// Assign a raw field identifier, replacing any structured reference.
    pub fn set_property_ident(&mut self, ident: &str) -> Result<&mut Self> {
        if ident.is_empty() {
            return Err(StrataError::invalid("property can not be empty"));
        }
        self.reference = Some(PropertyRef::Ident(ident.to_string()));
        Ok(self)
    }

    pub fn clear_property(&mut self) -> &mut Self {
        self.reference = None;
        self
    }

    pub fn has_property(&self) -> bool {
        self.reference.is_some()
    }

    pub fn property(&self) -> Option<&PropertyRef> {
        self.reference.as_ref()
    }

    /// Set the table name or alias qualifying this field.
    pub fn set_table_name(&mut self, table: &str) -> Result<&mut Self> {
        if table.is_empty() {
            return Err(StrataError::invalid("table name can not be empty"));
        }
        self.table_name = Some(table.to_string());
        Ok(self)
    }

    pub fn clear_table_name(&mut self) -> &mut Self {
        self.table_name = None;
        self
    }

    pub fn has_table_name(&self) -> bool {
        self.table_name.is_some()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn has_fields(&self) -> bool {
        !self.field_names().is_empty()
    }

    /// The physical field identifiers for the assigned property: the
    /// property's declared expansion, or the raw identifier itself.
    pub fn field_names(&self) -> Vec<String> {
        match &self.reference {
            Some(PropertyRef::Property(p)) => p.field_names(),
            Some(PropertyRef::Ident(ident)) => vec![ident.clone()],
            None => Vec::new(),
        }
    }

    /// The primary field name: the property identifier or the raw identifier.
    pub fn field_name(&self) -> Option<String> {
        match &self.reference {
            Some(PropertyRef::Property(p)) => Some(p.ident().to_string()),
            Some(PropertyRef::Ident(ident)) => Some(ident.clone()),
            None => None,
        }
    }

    /// Fully qualified, quote-escaped identifiers for all physical fields.
    pub fn field_identifiers(&self) -> Vec<String> {
        self.field_names()
            .iter()
            .map(|name| quote_identifier(name, self.table_name()))
            .collect()
    }

    /// Fully qualified, quote-escaped identifier for the primary field.
    pub fn field_identifier(&self) -> Option<String> {
        self.field_name()
            .map(|name| quote_identifier(&name, self.table_name()))
    }
}
