//! The SQLite-backed storage source.

use std::rc::Rc;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use strata_core::{
    Collection, FieldSpec, Model, Result, RowData, Source, SourceBase, StrataError, Value,
    quote_identifier,
};

use crate::compile::{Params, filters_sql, orders_sql, pagination_sql};
use crate::connection::ConnectionRegistry;
use crate::schema::{ColumnInfo, find_column, table_exists, table_structure};

/// A [`Source`] persisting models to one SQLite table.
///
/// Criteria accumulate in the shared [`SourceBase`]; the source itself only
/// adds the physical coordinates (registry, connection ident, table name) and
/// the schema policy.
#[derive(Debug)]
pub struct DatabaseSource<M: Model + Clone> {
    base: SourceBase<M>,
    registry: Rc<ConnectionRegistry>,
    database_ident: Option<String>,
    table: Option<String>,
    auto_create_schema: bool,
}

impl<M: Model + Clone> DatabaseSource<M> {
    pub fn new(registry: Rc<ConnectionRegistry>) -> Self {
        Self {
            base: SourceBase::new(),
            registry,
            database_ident: None,
            table: None,
            auto_create_schema: true,
        }
    }

    pub fn set_table(&mut self, table: &str) -> Result<&mut Self> {
        if table.is_empty() {
            return Err(StrataError::invalid("table name can not be empty"));
        }
        self.table = Some(table.to_string());
        Ok(self)
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }

    pub fn table(&self) -> Result<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| StrataError::not_configured("no table set on this source"))
    }

    /// Target a named connection instead of the registry default.
    pub fn set_database_ident(&mut self, ident: &str) -> Result<&mut Self> {
        if ident.is_empty() {
            return Err(StrataError::invalid("database ident can not be empty"));
        }
        self.database_ident = Some(ident.to_string());
        Ok(self)
    }

    pub fn database_ident(&self) -> &str {
        self.database_ident
            .as_deref()
            .unwrap_or_else(|| self.registry.default_database())
    }

    /// Whether writes create the backing table when it is missing.
    pub fn set_auto_create_schema(&mut self, auto_create: bool) -> &mut Self {
        self.auto_create_schema = auto_create;
        self
    }

    pub fn auto_create_schema(&self) -> bool {
        self.auto_create_schema
    }

    /// The shared connection handle this source writes through.
    pub fn db(&self) -> Result<Rc<Connection>> {
        self.registry.handle(self.database_ident())
    }

    pub fn table_exists(&self) -> Result<bool> {
        let connection = self.db()?;
        table_exists(&connection, self.table()?)
    }

    pub fn table_structure(&self) -> Result<Vec<ColumnInfo>> {
        let connection = self.db()?;
        table_structure(&connection, self.table()?)
    }

    /// Create the backing table from the bound model's declared properties.
    ///
    /// A no-op when the table already exists.
    pub fn create_table(&self) -> Result<()> {
        let model = self.base.model()?.clone();
        self.create_table_for(&model)
    }

    /// Create the backing table from a model's declared properties.
    pub fn create_table_for(&self, model: &M) -> Result<()> {
        let table = self.table()?;
        if self.table_exists()? {
            return Ok(());
        }
        let definitions = column_definitions(model)?;
        let sql = format!(
            "CREATE TABLE {} ({})",
            quote_identifier(table, None),
            definitions.join(", ")
        );
        info!(sql = %sql, "creating table");
        self.db()?.execute_batch(&sql)?;
        Ok(())
    }

    /// Reconcile the live table with the bound model's declared properties.
    ///
    /// Missing columns are added in place. A column whose type, null
    /// constraint or default drifted forces a table rebuild, since SQLite
    /// can not alter an existing column.
    pub fn alter_table(&self) -> Result<()> {
        let model = self.base.model()?.clone();
        if !self.table_exists()? {
            return self.create_table_for(&model);
        }
        let columns = self.table_structure()?;
        let fields = model_fields(&model, None);

        let drifted = fields.iter().any(|field| {
            find_column(&columns, &field.ident)
                .is_some_and(|column| !column.matches(field))
        });
        if drifted {
            return self.rebuild_table(&model, &columns);
        }

        for field in &fields {
            if find_column(&columns, &field.ident).is_none() {
                let sql = format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote_identifier(self.table()?, None),
                    field.sql()
                );
                info!(sql = %sql, "adding column");
                self.db()?.execute_batch(&sql)?;
            }
        }
        Ok(())
    }

    /// Rebuild the table under its declared layout, carrying over the data
    /// of every column both layouts share.
    fn rebuild_table(&self, model: &M, columns: &[ColumnInfo]) -> Result<()> {
        let table = self.table()?;
        let shadow = format!("{table}__rebuild");
        let definitions = column_definitions(model)?;

        let shared: Vec<String> = model_fields(model, None)
            .iter()
            .filter(|field| find_column(columns, &field.ident).is_some())
            .map(|field| quote_identifier(&field.ident, None))
            .collect();

        let table_q = quote_identifier(table, None);
        let shadow_q = quote_identifier(&shadow, None);
        let copy = if shared.is_empty() {
            String::new()
        } else {
            format!(
                "INSERT INTO {shadow_q} ({shared}) SELECT {shared} FROM {table_q};",
                shared = shared.join(", ")
            )
        };
        let sql = format!(
            "BEGIN;\
             CREATE TABLE {shadow_q} ({definitions});\
             {copy}\
             DROP TABLE {table_q};\
             ALTER TABLE {shadow_q} RENAME TO {table_q};\
             COMMIT;",
            definitions = definitions.join(", "),
        );
        info!(table = %table, "rebuilding table for column drift");
        self.db()?.execute_batch(&sql)?;
        Ok(())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql = %sql, params = params.len(), "executing statement");
        let connection = self.db()?;
        let rows = connection.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(rows)
    }

    /// Load the first row whose field matches a value into a clone of the
    /// template.
    fn fetch_one(&self, field_ident: &str, value: &Value, template: &M) -> Result<Option<M>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1 LIMIT 1",
            quote_identifier(self.table()?, None),
            quote_identifier(field_ident, None)
        );
        debug!(sql = %sql, "loading item");
        let connection = self.db()?;
        let mut statement = connection.prepare(&sql)?;
        let mut rows = statement.query([value])?;
        match rows.next()? {
            Some(row) => {
                let data = row_data(row)?;
                let mut obj = template.clone();
                obj.set_flat_data(&data);
                Ok(Some(obj))
            }
            None => Ok(None),
        }
    }

    /// The quoted column list a load selects, or `*` without a subset.
    ///
    /// The identity key column is always included so loaded entities stay
    /// addressable.
    fn select_columns(&self, model: &M) -> String {
        if !self.base.has_properties() {
            return "*".to_string();
        }
        let subset: Vec<&str> = self.base.properties().iter().map(String::as_str).collect();
        let mut columns: Vec<String> = model_fields(model, Some(&subset))
            .iter()
            .map(|field| quote_identifier(&field.ident, None))
            .collect();
        let key = quote_identifier(model.key(), None);
        if !columns.contains(&key) {
            columns.insert(0, key);
        }
        columns.join(", ")
    }
}

/// The column definition fragments for a model's active properties, with the
/// identity key promoted to the primary key.
fn column_definitions<M: Model>(model: &M) -> Result<Vec<String>> {
    let mut definitions = Vec::new();
    for field in model_fields(model, None) {
        let mut definition = field.sql();
        if field.ident == model.key() {
            definition.push_str(" PRIMARY KEY");
        }
        definitions.push(definition);
    }
    if definitions.is_empty() {
        return Err(StrataError::invalid(
            "model declares no storable properties",
        ));
    }
    Ok(definitions)
}

/// The physical fields of a model's active properties, optionally restricted
/// to a property-identifier subset.
fn model_fields<M: Model>(model: &M, subset: Option<&[&str]>) -> Vec<FieldSpec> {
    let mut fields = Vec::new();
    for ident in model.property_idents() {
        if let Some(subset) = subset
            && !subset.contains(&ident.as_str())
        {
            continue;
        }
        let Some(property) = model.property(&ident) else {
            continue;
        };
        if !property.active() {
            continue;
        }
        fields.extend(property.fields());
    }
    fields
}

/// Collect a row into flat column data.
fn row_data(row: &rusqlite::Row<'_>) -> Result<RowData> {
    let statement = row.as_ref();
    let mut data = RowData::new();
    for (index, name) in statement.column_names().into_iter().enumerate() {
        data.insert(name.to_string(), row.get::<_, Value>(index)?);
    }
    Ok(data)
}

impl<M: Model + Clone> Source<M> for DatabaseSource<M> {
    fn base(&self) -> &SourceBase<M> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SourceBase<M> {
        &mut self.base
    }

    fn load_item(&self, key: &Value) -> Result<Option<M>> {
        if key.is_null() {
            return Err(StrataError::invalid(
                "can not load an entity from a null key",
            ));
        }
        let model = self.base.model()?;
        self.fetch_one(model.key(), key, model)
    }

    fn load_item_into(&self, key: &Value, template: &M) -> Result<Option<M>> {
        if key.is_null() {
            return Err(StrataError::invalid(
                "can not load an entity from a null key",
            ));
        }
        self.fetch_one(template.key(), key, template)
    }

    fn load_from(&self, property: &str, value: &Value) -> Result<Option<M>> {
        if property.is_empty() {
            return Err(StrataError::invalid("property can not be empty"));
        }
        if value.is_null() {
            return Err(StrataError::invalid(
                "can not load an entity from a null value",
            ));
        }
        let model = self.base.model()?;
        let field_ident = match model.property(property) {
            Some(prop) if prop.l10n() => prop.l10n_ident(),
            _ => property.to_string(),
        };
        self.fetch_one(&field_ident, value, model)
    }

    fn load_items(&self) -> Result<Collection<M>> {
        let model = self.base.model()?;
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_columns(model),
            quote_identifier(self.table()?, None)
        );
        let mut params = Params::new();
        if self.base.has_filters() {
            let (body, filter_params) = filters_sql(self.base.filters())?;
            sql.push_str(" WHERE ");
            sql.push_str(&body);
            params.extend(filter_params);
        }
        if self.base.has_orders() {
            let (body, order_params) = orders_sql(self.base.orders())?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&body);
            params.extend(order_params);
        }
        if let Some(pagination) = self.base.current_pagination()
            && let Some(clause) = pagination_sql(pagination)
        {
            sql.push(' ');
            sql.push_str(&clause);
        }
        debug!(sql = %sql, params = params.len(), "loading items");

        let connection = self.db()?;
        let mut statement = connection.prepare(&sql)?;
        let mut rows = statement.query(rusqlite::params_from_iter(params.iter()))?;
        let mut collection = Collection::new();
        while let Some(row) = rows.next()? {
            let data = row_data(row)?;
            let mut obj = model.clone();
            obj.set_flat_data(&data);
            collection.add(obj)?;
        }
        Ok(collection)
    }

    fn save_item(&self, obj: &M) -> Result<Value> {
        let table = self.table()?;
        if !self.table_exists()? {
            if !self.auto_create_schema {
                return Err(StrataError::not_configured(format!(
                    "table \"{table}\" does not exist"
                )));
            }
            self.create_table_for(obj)?;
        }
        let columns = self.table_structure()?;
        let id_is_unset = obj.id().is_null();

        let mut idents = Vec::new();
        let mut params = Params::new();
        for field in model_fields(obj, None) {
            // An unset key is left to the database to assign.
            if id_is_unset && field.ident == obj.key() {
                continue;
            }
            if find_column(&columns, &field.ident).is_none() {
                warn!(column = %field.ident, table = %table, "skipping column absent from table");
                continue;
            }
            idents.push(quote_identifier(&field.ident, None));
            params.push(obj.field_value(&field.ident));
        }
        if idents.is_empty() {
            return Err(StrataError::invalid(
                "entity has no storable fields to insert",
            ));
        }
        let placeholders = vec!["?"; idents.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table, None),
            idents.join(", "),
            placeholders
        );
        self.execute(&sql, &params)?;

        if id_is_unset {
            Ok(Value::Integer(self.db()?.last_insert_rowid()))
        } else {
            Ok(obj.id())
        }
    }

    fn update_item(&self, obj: &M, properties: Option<&[&str]>) -> Result<bool> {
        let id = obj.id();
        if id.is_null() {
            return Err(StrataError::invalid(
                "can not update an entity without an identity key",
            ));
        }
        let table = self.table()?;
        let columns = self.table_structure()?;

        let mut assignments = Vec::new();
        let mut params = Params::new();
        for field in model_fields(obj, properties) {
            if field.ident == obj.key() {
                continue;
            }
            if find_column(&columns, &field.ident).is_none() {
                warn!(column = %field.ident, table = %table, "skipping column absent from table");
                continue;
            }
            assignments.push(format!("{} = ?", quote_identifier(&field.ident, None)));
            params.push(obj.field_value(&field.ident));
        }
        if assignments.is_empty() {
            return Err(StrataError::invalid(
                "entity has no storable fields to update",
            ));
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_identifier(table, None),
            assignments.join(", "),
            quote_identifier(obj.key(), None)
        );
        params.push(id);
        let rows = self.execute(&sql, &params)?;
        Ok(rows > 0)
    }

    fn delete_item(&self, obj: Option<&M>) -> Result<bool> {
        let (key_ident, id) = match obj {
            Some(obj) => (obj.key().to_string(), obj.id()),
            None => {
                let model = self.base.model()?;
                (model.key().to_string(), model.id())
            }
        };
        if id.is_null() {
            return Err(StrataError::invalid(
                "can not delete an entity without an identity key",
            ));
        }
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_identifier(self.table()?, None),
            quote_identifier(&key_ident, None)
        );
        let rows = self.execute(&sql, &[id])?;
        Ok(rows > 0)
    }
}
