//! Database-agnostic query expressions: filters, sort orders and pagination.

mod filter;
mod order;
mod pagination;

pub use filter::{Filter, FilterData};
pub use order::{Order, OrderData, OrderMode};
pub use pagination::{Pagination, PaginationData};

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StrataError};

/// Comparison operator of a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    In,
    Between,
    IsNull,
    IsNotNull,
    /// Set membership in a delimited multi-value column.
    FindInSet,
}

impl Operator {
    /// The SQL spelling of the operator.
    pub fn sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::FindInSet => "FIND_IN_SET",
        }
    }

    /// Parse an operator from its SQL spelling, case-insensitively.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "=" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Neq),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "LIKE" => Ok(Operator::Like),
            "IN" => Ok(Operator::In),
            "BETWEEN" => Ok(Operator::Between),
            "IS NULL" => Ok(Operator::IsNull),
            "IS NOT NULL" => Ok(Operator::IsNotNull),
            "FIND_IN_SET" => Ok(Operator::FindInSet),
            other => Err(StrataError::invalid(format!(
                "unknown operator \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

impl FromStr for Operator {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// How a filter combines with its preceding sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn sql(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "AND" | "&&" => Ok(Conjunction::And),
            "OR" | "||" => Ok(Conjunction::Or),
            other => Err(StrataError::invalid(format!(
                "unknown conjunction \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

impl FromStr for Conjunction {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_parse_case_insensitively() {
        assert_eq!(Operator::parse("like").unwrap(), Operator::Like);
        assert_eq!(Operator::parse(" is null ").unwrap(), Operator::IsNull);
        assert_eq!(Operator::parse("<>").unwrap(), Operator::Neq);
        assert!(Operator::parse("~=").is_err());
    }

    #[test]
    fn conjunctions_parse() {
        assert_eq!(Conjunction::parse("or").unwrap(), Conjunction::Or);
        assert_eq!(Conjunction::parse("AND").unwrap(), Conjunction::And);
        assert!(Conjunction::parse("xor").is_err());
    }
}
