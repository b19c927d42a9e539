use jobdesk_core::{CompanyFilter, JobFilter, JobdeskError, Result};
use rust_decimal::Decimal;

/// Column type tag for explicit nulls, so they bind with the right
/// parameter type instead of defaulting to TEXT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlType {
    Text,
    Int,
    Numeric,
    Bool,
}

/// A scalar destined for a positional placeholder. Values never appear in
/// clause text; they are bound at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Numeric(Decimal),
    Bool(bool),
    Null(SqlType),
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Numeric(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Text), SqlValue::Text)
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Int), SqlValue::Int)
    }
}

impl From<Option<Decimal>> for SqlValue {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Numeric), SqlValue::Numeric)
    }
}

impl From<Option<bool>> for SqlValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(SqlValue::Null(SqlType::Bool), SqlValue::Bool)
    }
}

/// An ordered list of (logical field, value) pairs. Insertion order decides
/// placeholder position, so the caller controls the statement's shape
/// explicitly rather than through map iteration.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, SqlValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        self.entries.push((field.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A SQL fragment with positional placeholders plus the values that bind
/// them: `values[i]` binds `$(i+1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPart {
    pub clause: String,
    pub values: Vec<SqlValue>,
}

impl QueryPart {
    pub fn empty() -> Self {
        Self {
            clause: String::new(),
            values: vec![],
        }
    }

    /// Attach this part's values to a prepared query, in placeholder order.
    pub fn bind<'q>(
        &'q self,
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        for value in &self.values {
            query = bind_value(query, value);
        }
        query
    }
}

/// Build the `SET` clause of a partial update.
///
/// Each field resolves its physical column through `translations` (logical
/// names absent from the table pass through verbatim) and emits
/// `"<column>"=$<n>` in insertion order. Columns are double-quoted to
/// tolerate reserved words and mixed case. Values pass through unchanged,
/// including null.
pub fn build_set_clause(fields: &FieldMap, translations: &[(&str, &str)]) -> Result<QueryPart> {
    if fields.is_empty() {
        return Err(JobdeskError::EmptyUpdate);
    }

    let mut fragments = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (field, value)) in fields.entries.iter().enumerate() {
        let column = translations
            .iter()
            .find(|(logical, _)| *logical == field.as_str())
            .map(|(_, physical)| *physical)
            .unwrap_or(field.as_str());
        fragments.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(QueryPart {
        clause: fragments.join(", "),
        values,
    })
}

/// Build the `WHERE` clause for a company listing.
///
/// Criteria are walked in a fixed order — substring match, lower bound,
/// upper bound — so identical filters always produce identical clauses.
/// An inverted employee range is rejected before any fragment is built,
/// and a filter that contributes nothing fails with `NoFilterCriteria`
/// (callers fall back to the unfiltered listing).
pub fn company_where(filter: &CompanyFilter) -> Result<QueryPart> {
    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(JobdeskError::InvalidRange { min, max });
        }
    }

    let mut fragments = Vec::new();
    let mut values = Vec::new();

    if let Some(name) = &filter.name_like {
        values.push(SqlValue::Text(format!("%{name}%")));
        fragments.push(format!("name ILIKE ${}", values.len()));
    }
    if let Some(min) = filter.min_employees {
        values.push(SqlValue::Int(min));
        fragments.push(format!("num_employees >= ${}", values.len()));
    }
    if let Some(max) = filter.max_employees {
        values.push(SqlValue::Int(max));
        fragments.push(format!("num_employees <= ${}", values.len()));
    }

    if fragments.is_empty() {
        return Err(JobdeskError::NoFilterCriteria);
    }

    Ok(QueryPart {
        clause: fragments.join(" AND "),
        values,
    })
}

/// Build the `WHERE` clause for a job listing. Same fixed walk order as
/// [`company_where`]; the equity flag, when true, emits `equity > 0` with
/// no placeholder since it carries no client-controlled literal.
pub fn job_where(filter: &JobFilter) -> Result<QueryPart> {
    let mut fragments = Vec::new();
    let mut values = Vec::new();

    if let Some(title) = &filter.title_like {
        values.push(SqlValue::Text(format!("%{title}%")));
        fragments.push(format!("title ILIKE ${}", values.len()));
    }
    if let Some(min) = filter.min_salary {
        values.push(SqlValue::Int(min));
        fragments.push(format!("salary >= ${}", values.len()));
    }
    if filter.has_equity == Some(true) {
        fragments.push("equity > 0".to_string());
    }

    if fragments.is_empty() {
        return Err(JobdeskError::NoFilterCriteria);
    }

    Ok(QueryPart {
        clause: fragments.join(" AND "),
        values,
    })
}

/// Bind one value to the next placeholder of a prepared query.
fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    value: &'q SqlValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match value {
        SqlValue::Text(s) => query.bind(s.as_str()),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Numeric(d) => query.bind(*d),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Null(SqlType::Text) => query.bind(Option::<String>::None),
        SqlValue::Null(SqlType::Int) => query.bind(Option::<i64>::None),
        SqlValue::Null(SqlType::Numeric) => query.bind(Option::<Decimal>::None),
        SqlValue::Null(SqlType::Bool) => query.bind(Option::<bool>::None),
    }
}
