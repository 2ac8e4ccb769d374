//! Model and property capabilities consumed by sources.
//!
//! The persistence layer is polymorphic over these traits: a model exposes an
//! identity key and a property registry, and each property knows how it
//! expands into physical storage fields. Concrete domain types live with the
//! host application; [`PropertyDef`] is provided so hosts do not have to
//! hand-roll the property side.

use std::collections::HashMap;
use std::sync::Arc;

use crate::field::quote_identifier;
use crate::value::Value;

/// A flat row of column name to value, as loaded from or written to storage.
pub type RowData = HashMap<String, Value>;

/// One physical storage column derived from a property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Physical column identifier.
    pub ident: String,
    /// SQL type used for the column definition and as a binding hint.
    pub sql_type: String,
    pub not_null: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    /// The column definition fragment for CREATE/ALTER statements.
    pub fn sql(&self) -> String {
        let mut def = format!("{} {}", quote_identifier(&self.ident, None), self.sql_type);
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(&default_literal(default));
        }
        def
    }
}

/// Render a default value as a SQL literal for a column definition.
///
/// Only reaches DDL text, never DML: data values always travel through
/// parameter binding.
pub fn default_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        other => format!("'{}'", other.transport_text().replace('\'', "''")),
    }
}

impl Value {
    /// Text form used when a value is embedded as a quoted literal.
    fn transport_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.transport(),
        }
    }
}

/// A named, typed attribute of a model.
///
/// A property may be localized (one physical field per active locale) or
/// multi-valued (a delimited set in a single column, matched with a
/// set-membership operator rather than equality).
pub trait Property {
    /// Logical property identifier.
    fn ident(&self) -> &str;

    /// Inactive properties are skipped for storage purposes.
    fn active(&self) -> bool {
        true
    }

    /// Whether the property expands to one physical field per locale.
    fn l10n(&self) -> bool {
        false
    }

    /// Whether the property stores a set of values in one column.
    fn multiple(&self) -> bool {
        false
    }

    /// The locale-specific field identifier for the active locale.
    fn l10n_ident(&self) -> String {
        self.ident().to_string()
    }

    /// SQL type hint for parameter binding and column definitions.
    fn sql_type(&self) -> &str;

    /// The physical field identifiers this property expands to.
    fn field_names(&self) -> Vec<String>;

    /// The physical field specifications this property expands to.
    fn fields(&self) -> Vec<FieldSpec>;
}

/// A buildable [`Property`] implementation.
///
/// Localized expansion is one field per declared locale (`{ident}_{locale}`);
/// the first declared locale is the active one.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    ident: String,
    sql_type: String,
    active: bool,
    l10n: bool,
    multiple: bool,
    locales: Vec<String>,
    not_null: bool,
    default: Option<Value>,
}

impl PropertyDef {
    pub fn new(ident: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            sql_type: sql_type.into(),
            active: true,
            l10n: false,
            multiple: false,
            locales: Vec::new(),
            not_null: false,
            default: None,
        }
    }

    /// Mark the property as localized over the given locales.
    pub fn localized<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.l10n = true;
        self.locales = locales.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the property as multi-valued (a delimited set in one column).
    pub fn multi(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Convenience for storing the definition behind a shared handle.
    pub fn into_arc(self) -> Arc<dyn Property> {
        Arc::new(self)
    }
}

impl Property for PropertyDef {
    fn ident(&self) -> &str {
        &self.ident
    }

    fn active(&self) -> bool {
        self.active
    }

    fn l10n(&self) -> bool {
        self.l10n
    }

    fn multiple(&self) -> bool {
        self.multiple
    }

    fn l10n_ident(&self) -> String {
        match self.locales.first() {
            Some(locale) => format!("{}_{}", self.ident, locale),
            None => self.ident.clone(),
        }
    }

    fn sql_type(&self) -> &str {
        &self.sql_type
    }

    fn field_names(&self) -> Vec<String> {
        if self.l10n {
            self.locales
                .iter()
                .map(|locale| format!("{}_{}", self.ident, locale))
                .collect()
        } else {
            vec![self.ident.clone()]
        }
    }

    fn fields(&self) -> Vec<FieldSpec> {
        self.field_names()
            .into_iter()
            .map(|ident| FieldSpec {
                ident,
                sql_type: self.sql_type.clone(),
                not_null: self.not_null,
                default: self.default.clone(),
            })
            .collect()
    }
}

/// A domain entity with an identity key and a declared set of properties.
///
/// Sources that need a template entity (loading rows into fresh instances)
/// additionally require `Clone`.
pub trait Model {
    /// The identity key value; `Value::Null` when unset.
    fn id(&self) -> Value;

    /// The identifier of the key property.
    fn key(&self) -> &str;

    /// The identifiers of all declared properties, in declaration order.
    fn property_idents(&self) -> Vec<String>;

    /// Look up a property by identifier.
    fn property(&self, ident: &str) -> Option<Arc<dyn Property>>;

    fn has_property(&self, ident: &str) -> bool {
        self.property(ident).is_some()
    }

    /// The current value of one physical field.
    fn field_value(&self, field_ident: &str) -> Value;

    /// Copy a flat row of column values into the entity's state.
    ///
    /// Unknown columns are ignored; missing columns leave state untouched.
    fn set_flat_data(&mut self, data: &RowData);
}
