use std::sync::Arc;

use crate::error::Result;
use crate::expression::{Conjunction, Operator};
use crate::field::Field;
use crate::model::Property;
use crate::value::Value;

/// One backend-neutral filter condition.
///
/// A field plus a comparison value, an operator and the conjunction used to
/// combine it with its preceding sibling.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    field: Field,
    value: Value,
    operator: Operator,
    conjunction: Conjunction,
}

/// Bulk-construction data for [`Filter`].
///
/// Every recognized key is an explicit field; an unrecognized key is a
/// compile error from Rust and a deserialization error from serde, never a
/// silent no-op.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterData {
    pub property: Option<String>,
    pub table_name: Option<String>,
    pub value: Option<Value>,
    pub operator: Option<String>,
    pub conjunction: Option<String>,
}

impl Filter {
    /// Build a filter on a property identifier with the default `=` operator.
    pub fn new(property: &str, value: impl Into<Value>) -> Result<Self> {
        let mut filter = Self::default();
        filter.set_property_ident(property)?;
        filter.set_value(value);
        Ok(filter)
    }

    /// Build a filter from bulk-construction data.
    pub fn from_data(data: FilterData) -> Result<Self> {
        let mut filter = Self::default();
        filter.apply_data(data)?;
        Ok(filter)
    }

    /// Apply bulk-construction data onto this filter.
    pub fn apply_data(&mut self, data: FilterData) -> Result<&mut Self> {
        if let Some(property) = data.property {
            self.set_property_ident(&property)?;
        }
        if let Some(table) = data.table_name {
            self.field.set_table_name(&table)?;
        }
        if let Some(value) = data.value {
            self.set_value(value);
        }
        if let Some(operator) = data.operator {
            self.set_operator(Operator::parse(&operator)?);
        }
        if let Some(conjunction) = data.conjunction {
            self.set_conjunction(Conjunction::parse(&conjunction)?);
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

    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = value.into();
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_operator(&mut self, operator: Operator) -> &mut Self {
        self.operator = operator;
        self
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn set_conjunction(&mut self, conjunction: Conjunction) -> &mut Self {
        self.conjunction = conjunction;
        self
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_equality_and_conjunction_and() {
        let filter = Filter::new("status", "published").unwrap();
        assert_eq!(filter.operator(), Operator::Eq);
        assert_eq!(filter.conjunction(), Conjunction::And);
        assert_eq!(filter.field().field_name().as_deref(), Some("status"));
        assert_eq!(filter.value(), &Value::from("published"));
    }

    #[test]
    fn from_data_parses_operator_and_conjunction() {
        let filter = Filter::from_data(FilterData {
            property: Some("views".to_string()),
            value: Some(Value::Integer(100)),
            operator: Some("<=".to_string()),
            conjunction: Some("or".to_string()),
            ..FilterData::default()
        })
        .unwrap();
        assert_eq!(filter.operator(), Operator::Lte);
        assert_eq!(filter.conjunction(), Conjunction::Or);
    }

    #[test]
    fn from_data_rejects_bad_operator() {
        let result = Filter::from_data(FilterData {
            property: Some("views".to_string()),
            operator: Some("almost".to_string()),
            ..FilterData::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn empty_property_is_rejected() {
        assert!(Filter::new("", 1i64).is_err());
    }

    #[test]
    fn data_deserializes_and_rejects_unknown_keys() {
        let data: FilterData = serde_json::from_str(
            r#"{"property": "status", "value": "published", "operator": "!=", "conjunction": "or"}"#,
        )
        .unwrap();
        let filter = Filter::from_data(data).unwrap();
        assert_eq!(filter.operator(), Operator::Neq);
        assert_eq!(filter.value(), &Value::from("published"));

        assert!(serde_json::from_str::<FilterData>(r#"{"proprety": "status"}"#).is_err());
    }
}
