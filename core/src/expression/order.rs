use std::sync::Arc;

use crate::error::{Result, StrataError};
use crate::field::Field;
use crate::model::Property;
use crate::value::Value;

/// Sort direction, or a fixed user-supplied value ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    #[default]
    Asc,
    Desc,
    /// Rank rows by an explicit sequence of values.
    Values,
}

impl OrderMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(OrderMode::Asc),
            "desc" => Ok(OrderMode::Desc),
            "values" => Ok(OrderMode::Values),
            other => Err(StrataError::invalid(format!(
                "unknown order mode \"{other}\""
            ))),
        }
    }
}

/// One backend-neutral sort key.
///
/// Invariant: the explicit value list is non-empty exactly when the mode is
/// [`OrderMode::Values`]; switching to a plain direction clears it.
#[derive(Debug, Clone, Default)]
pub struct Order {
    field: Field,
    mode: OrderMode,
    values: Vec<Value>,
}

/// Bulk-construction data for [`Order`].
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderData {
    pub property: Option<String>,
    pub table_name: Option<String>,
    pub mode: Option<String>,
    pub values: Option<Vec<Value>>,
}

impl Order {
    pub fn new(property: &str, mode: OrderMode) -> Result<Self> {
        let mut order = Self::default();
        order.set_property_ident(property)?;
        if mode != OrderMode::Values {
            order.set_mode(mode)?;
        }
        Ok(order)
    }

    /// Build a fixed-value-ordering sort key.
    pub fn with_values(property: &str, values: Vec<Value>) -> Result<Self> {
        let mut order = Self::default();
        order.set_property_ident(property)?;
        order.set_values(values)?;
        Ok(order)
    }

    pub fn from_data(data: OrderData) -> Result<Self> {
        let mut order = Self::default();
        order.apply_data(data)?;
        Ok(order)
    }

    /// Apply bulk-construction data onto this order.
    ///
    /// Values are applied before the mode so `{mode: "values", values: […]}`
    /// arrives in a valid order.
    pub fn apply_data(&mut self, data: OrderData) -> Result<&mut Self> {
        if let Some(property) = data.property {
            self.set_property_ident(&property)?;
        }
        if let Some(table) = data.table_name {
            self.field.set_table_name(&table)?;
        }
        if let Some(values) = data.values {
            self.set_values(values)?;
        }
        if let Some(mode) = data.mode {
            self.set_mode(OrderMode::parse(&mode)?)?;
        }
        Ok(self)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn set_property(&mut self, property: Arc<dyn Property>) -> Result<&mut Self> {
        self.field.set_property(property)?;
        Ok(self)
    }

    pub fn set_property_ident(&mut self, ident: &str) -> Result<&mut Self> {
        self.field.set_property_ident(ident)?;
        Ok(self)
    }

    pub fn set_table_name(&mut self, table: &str) -> Result<&mut Self> {
        self.field.set_table_name(table)?;
        Ok(self)
    }

    pub fn set_mode(&mut self, mode: OrderMode) -> Result<&mut Self> {
        if mode == OrderMode::Values && self.values.is_empty() {
            return Err(StrataError::invalid(
                "order mode \"values\" requires a non-empty value list",
            ));
        }
        if mode != OrderMode::Values {
            self.values.clear();
        }
        self.mode = mode;
        Ok(self)
    }

    pub fn mode(&self) -> OrderMode {
        self.mode
    }

    /// Assign the explicit value list, switching the mode to `Values`.
    pub fn set_values(&mut self, values: Vec<Value>) -> Result<&mut Self> {
        if values.is_empty() {
            return Err(StrataError::invalid(
                "explicit value ordering requires a non-empty value list",
            ));
        }
        self.values = values;
        self.mode = OrderMode::Values;
        Ok(self)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}
