//! Compilation of backend-neutral expressions into parameterized SQLite SQL.
//!
//! Identifiers are quote-escaped by the expression layer; every data value
//! travels through a bind parameter. SQLite has no native `FIND_IN_SET`, so
//! set membership compiles to an `instr` probe over the comma-delimited
//! column.

use smallvec::SmallVec;

use strata_core::{Filter, Operator, Order, OrderMode, Pagination, Result, StrataError, Value};

/// Bind parameters accumulated while compiling a statement.
pub type Params = SmallVec<[Value; 4]>;

/// Compile one filter into a condition fragment, appending its parameters.
///
/// A filter whose property expands to several physical fields (a localized
/// property) matches when any of them does, so it compiles to a
/// parenthesized `OR` group with the value bound once per field.
pub fn filter_sql(filter: &Filter, params: &mut Params) -> Result<String> {
    let identifiers = filter.field().field_identifiers();
    if identifiers.is_empty() {
        return Err(StrataError::invalid(
            "filter has no property and can not be compiled",
        ));
    }
    let mut conditions = Vec::with_capacity(identifiers.len());
    for identifier in &identifiers {
        conditions.push(condition_sql(identifier, filter, params)?);
    }
    if conditions.len() == 1 {
        Ok(conditions.pop().unwrap_or_default())
    } else {
        Ok(format!("({})", conditions.join(" OR ")))
    }
}

fn condition_sql(identifier: &str, filter: &Filter, params: &mut Params) -> Result<String> {
    let operator = filter.operator();
    let value = filter.value();
    match operator {
        Operator::IsNull | Operator::IsNotNull => {
            Ok(format!("{identifier} {}", operator.sql()))
        }
        Operator::In => {
            let members = match value {
                Value::List(members) => members.as_slice(),
                scalar => std::slice::from_ref(scalar),
            };
            if members.is_empty() {
                return Err(StrataError::invalid(
                    "IN requires a non-empty value list",
                ));
            }
            let placeholders = vec!["?"; members.len()].join(", ");
            params.extend(members.iter().cloned());
            Ok(format!("{identifier} IN ({placeholders})"))
        }
        Operator::Between => match value {
            Value::List(bounds) if bounds.len() == 2 => {
                params.extend(bounds.iter().cloned());
                Ok(format!("{identifier} BETWEEN ? AND ?"))
            }
            _ => Err(StrataError::invalid(
                "BETWEEN requires a list of exactly two values",
            )),
        },
        Operator::FindInSet => {
            if !value.is_scalar() || value.is_null() {
                return Err(StrataError::invalid(
                    "set membership requires a scalar value",
                ));
            }
            params.push(value.clone());
            Ok(format!(
                "instr(',' || {identifier} || ',', ',' || ? || ',') > 0"
            ))
        }
        _ => {
            params.push(value.clone());
            Ok(format!("{identifier} {} ?", operator.sql()))
        }
    }
}

/// Compile a filter list into a `WHERE` body.
///
/// Each filter after the first is joined by its own conjunction.
pub fn filters_sql(filters: &[Filter]) -> Result<(String, Params)> {
    let mut params = Params::new();
    let mut sql = String::new();
    for (index, filter) in filters.iter().enumerate() {
        let condition = filter_sql(filter, &mut params)?;
        if index > 0 {
            sql.push(' ');
            sql.push_str(filter.conjunction().sql());
            sql.push(' ');
        }
        sql.push_str(&condition);
    }
    Ok((sql, params))
}

/// Compile one sort key into an `ORDER BY` term, appending its parameters.
///
/// Explicit value ordering ranks each listed value by position through a
/// `CASE` expression; unlisted values sort last.
pub fn order_sql(order: &Order, params: &mut Params) -> Result<String> {
    let identifier = order
        .field()
        .field_identifier()
        .ok_or_else(|| StrataError::invalid("order has no property and can not be compiled"))?;
    match order.mode() {
        OrderMode::Asc => Ok(format!("{identifier} ASC")),
        OrderMode::Desc => Ok(format!("{identifier} DESC")),
        OrderMode::Values => {
            let values = order.values();
            let mut sql = format!("CASE {identifier}");
            for (rank, value) in values.iter().enumerate() {
                sql.push_str(&format!(" WHEN ? THEN {rank}"));
                params.push(value.clone());
            }
            sql.push_str(&format!(" ELSE {} END", values.len()));
            Ok(sql)
        }
    }
}

/// Compile a sort-key list into an `ORDER BY` body.
pub fn orders_sql(orders: &[Order]) -> Result<(String, Params)> {
    let mut params = Params::new();
    let mut terms = Vec::with_capacity(orders.len());
    for order in orders {
        terms.push(order_sql(order, &mut params)?);
    }
    Ok((terms.join(", "), params))
}

/// Compile a pagination window into a `LIMIT … OFFSET …` clause.
///
/// `None` when no row limit applies.
pub fn pagination_sql(pagination: &Pagination) -> Option<String> {
    if !pagination.has_limit() {
        return None;
    }
    Some(format!(
        "LIMIT {} OFFSET {}",
        pagination.num_per_page(),
        pagination.offset()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Conjunction, FilterData, PropertyDef};

    #[test]
    fn default_filter_compiles_to_a_bound_equality() {
        let filter = Filter::new("status", "published").unwrap();
        let mut params = Params::new();
        let sql = filter_sql(&filter, &mut params).unwrap();
        assert_eq!(sql, "`status` = ?");
        assert_eq!(params.as_slice(), [Value::from("published")]);
    }

    #[test]
    fn null_probes_bind_nothing() {
        let mut filter = Filter::new("deleted_on", Value::Null).unwrap();
        filter.set_operator(Operator::IsNull);
        let mut params = Params::new();
        assert_eq!(filter_sql(&filter, &mut params).unwrap(), "`deleted_on` IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn in_expands_placeholders_and_rejects_empty_lists() {
        let mut filter = Filter::new("status", vec![Value::from("a"), Value::from("b")]).unwrap();
        filter.set_operator(Operator::In);
        let mut params = Params::new();
        assert_eq!(
            filter_sql(&filter, &mut params).unwrap(),
            "`status` IN (?, ?)"
        );
        assert_eq!(params.len(), 2);

        let mut empty = Filter::new("status", Value::List(Vec::new())).unwrap();
        empty.set_operator(Operator::In);
        assert!(filter_sql(&empty, &mut Params::new()).is_err());
    }

    #[test]
    fn between_requires_exactly_two_bounds() {
        let mut filter =
            Filter::new("views", vec![Value::Integer(10), Value::Integer(20)]).unwrap();
        filter.set_operator(Operator::Between);
        let mut params = Params::new();
        assert_eq!(
            filter_sql(&filter, &mut params).unwrap(),
            "`views` BETWEEN ? AND ?"
        );

        let mut bad = Filter::new("views", vec![Value::Integer(10)]).unwrap();
        bad.set_operator(Operator::Between);
        assert!(filter_sql(&bad, &mut Params::new()).is_err());
    }

    #[test]
    fn set_membership_compiles_to_a_delimited_probe() {
        let mut filter = Filter::new("tags", "rust").unwrap();
        filter.set_operator(Operator::FindInSet);
        let mut params = Params::new();
        assert_eq!(
            filter_sql(&filter, &mut params).unwrap(),
            "instr(',' || `tags` || ',', ',' || ? || ',') > 0"
        );
        assert_eq!(params.as_slice(), [Value::from("rust")]);
    }

    #[test]
    fn localized_property_compiles_to_an_or_group() {
        let mut filter = Filter::new("x", "Hello").unwrap();
        filter
            .set_property(
                PropertyDef::new("title", "TEXT")
                    .localized(["en", "fr"])
                    .into_arc(),
            )
            .unwrap();
        let mut params = Params::new();
        assert_eq!(
            filter_sql(&filter, &mut params).unwrap(),
            "(`title_en` = ? OR `title_fr` = ?)"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn filters_join_on_each_conjunction() {
        let a = Filter::new("status", "published").unwrap();
        let mut b = Filter::new("status", "pending").unwrap();
        b.set_conjunction(Conjunction::Or);
        let c = Filter::new("views", 10i64).unwrap();

        let (sql, params) = filters_sql(&[a, b, c]).unwrap();
        assert_eq!(sql, "`status` = ? OR `status` = ? AND `views` = ?");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn order_directions_and_value_ranking() {
        let asc = Order::new("posted_on", OrderMode::Asc).unwrap();
        let mut params = Params::new();
        assert_eq!(order_sql(&asc, &mut params).unwrap(), "`posted_on` ASC");

        let ranked =
            Order::with_values("status", vec![Value::from("published"), Value::from("draft")])
                .unwrap();
        assert_eq!(
            order_sql(&ranked, &mut params).unwrap(),
            "CASE `status` WHEN ? THEN 0 WHEN ? THEN 1 ELSE 2 END"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn orders_join_with_commas() {
        let orders = vec![
            Order::new("status", OrderMode::Asc).unwrap(),
            Order::new("posted_on", OrderMode::Desc).unwrap(),
        ];
        let (sql, params) = orders_sql(&orders).unwrap();
        assert_eq!(sql, "`status` ASC, `posted_on` DESC");
        assert!(params.is_empty());
    }

    #[test]
    fn pagination_only_renders_under_a_limit() {
        assert_eq!(pagination_sql(&Pagination::default()), None);
        let page = Pagination::new(3, 20).unwrap();
        assert_eq!(pagination_sql(&page).as_deref(), Some("LIMIT 20 OFFSET 40"));
    }

    #[test]
    fn table_qualified_filter_from_data() {
        let filter = Filter::from_data(FilterData {
            property: Some("status".to_string()),
            table_name: Some("posts".to_string()),
            value: Some(Value::from("published")),
            ..FilterData::default()
        })
        .unwrap();
        let mut params = Params::new();
        assert_eq!(
            filter_sql(&filter, &mut params).unwrap(),
            "`posts`.`status` = ?"
        );
    }
}
