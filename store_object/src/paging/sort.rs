//! Sort orders
//!
//! A `Sort` names properties, not columns. It is resolved against a model's
//! columns when a store runs the query, which is where unknown properties fail.

use crate::errors::StoreError;
use crate::traits::TableMetadata;
use crate::validation::ValidatedFieldName;
use std::cmp::Ordering;
use type_mapping::{compare_values, quote_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// `asc` / `desc` in any case
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// One property and its direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
}

/// Ordered list of sort orders; empty means unsorted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(property: impl Into<String>, direction: Direction) -> Self {
        Self::unsorted().and(property, direction)
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::by(property, Direction::Asc)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::by(property, Direction::Desc)
    }

    /// Append a lower-priority order
    pub fn and(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(Order {
            property: property.into(),
            direction,
        });
        self
    }

    /// Parse one `sort` query parameter: `prop[,prop...][,asc|desc]`.
    ///
    /// The trailing direction applies to every property of the parameter and
    /// defaults to ascending. Blank segments are ignored.
    pub fn parse(param: &str) -> Self {
        let mut parts: Vec<&str> = param
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let direction = match parts.last().and_then(|p| Direction::parse(p)) {
            Some(direction) => {
                parts.pop();
                direction
            }
            None => Direction::Asc,
        };

        parts
            .into_iter()
            .fold(Self::unsorted(), |sort, property| sort.and(property, direction))
    }

    /// Parse repeated `sort` parameters in priority order
    pub fn parse_all<S: AsRef<str>>(params: &[S]) -> Self {
        let mut sort = Self::unsorted();
        for param in params {
            sort.orders.extend(Self::parse(param.as_ref()).orders);
        }
        sort
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Resolve every property to a column of `T`
    pub fn resolve<T: TableMetadata>(&self) -> Result<Vec<(ValidatedFieldName, Direction)>, StoreError> {
        self.orders
            .iter()
            .map(|order| {
                ValidatedFieldName::resolve(&order.property, T::table_name(), T::columns())
                    .map(|field| (field, order.direction))
                    .map_err(|e| StoreError::validation(T::table_name(), e))
            })
            .collect()
    }

    /// `ORDER BY` clause for `T`, always ending with the primary key so that
    /// rows with equal sort values keep a stable order across pages
    pub fn order_by_sql<T: TableMetadata>(&self) -> Result<String, StoreError> {
        let resolved = self.resolve::<T>()?;
        let pk = T::primary_key_field();

        let mut terms: Vec<String> = resolved
            .iter()
            .map(|(field, direction)| {
                format!("{} {}", quote_identifier(field.as_str()), direction.to_sql())
            })
            .collect();
        if !resolved.iter().any(|(field, _)| field.as_str() == pk) {
            terms.push(format!("{} ASC", quote_identifier(pk)));
        }

        Ok(format!("ORDER BY {}", terms.join(", ")))
    }
}

/// Compare two records by resolved sort orders, the way PostgreSQL would order
/// their rows, breaking ties by primary key
pub fn compare_records<T: TableMetadata>(
    left: &T,
    right: &T,
    orders: &[(ValidatedFieldName, Direction)],
) -> Ordering {
    for (field, direction) in orders {
        let ordering = compare_values(
            left.field_value(field.as_str()).as_ref(),
            right.field_value(field.as_str()).as_ref(),
        );
        let ordering = match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.id().cmp(&right.id())
}
