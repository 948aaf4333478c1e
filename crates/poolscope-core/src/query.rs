//! PostgREST query-string builder.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Gte,
    Lte,
}

impl Operator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    column: String,
    operator: Operator,
    value: String,
}

/// Filtered, ordered read of one table.
///
/// Renders as `select=...&<column>=<op>.<value>...&order=<column>.<dir>`
/// with filters in insertion order and values percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: String,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    order: Option<(String, SortOrder)>,
    limit: Option<usize>,
}

impl TableQuery {
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Restricts the selected columns; no call selects `*`.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Display) -> Self {
        self.condition(column, Operator::Eq, value)
    }

    pub fn gte(self, column: impl Into<String>, value: impl Display) -> Self {
        self.condition(column, Operator::Gte, value)
    }

    pub fn lte(self, column: impl Into<String>, value: impl Display) -> Self {
        self.condition(column, Operator::Lte, value)
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortOrder) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn condition(mut self, column: impl Into<String>, operator: Operator, value: impl Display) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            operator,
            value: value.to_string(),
        });
        self
    }

    pub fn query_string(&self) -> String {
        self.to_string()
    }
}

impl Display for TableQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.columns.is_empty() {
            f.write_str("select=*")?;
        } else {
            write!(f, "select={}", self.columns.join(","))?;
        }

        for condition in &self.conditions {
            write!(
                f,
                "&{}={}.{}",
                condition.column,
                condition.operator.as_str(),
                urlencoding::encode(&condition.value)
            )?;
        }

        if let Some((column, direction)) = &self.order {
            write!(f, "&order={column}.{}", direction.as_str())?;
        }

        if let Some(limit) = self.limit {
            write!(f, "&limit={limit}")?;
        }

        Ok(())
    }
}
