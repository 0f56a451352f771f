//! Statement shaping and key derivation
//!
//! [`SelectBuilder`] assembles the final SQL from a projection plan and
//! filter fragment, renumbers the `?` markers to PostgreSQL positional
//! placeholders, and derives the two strings the batch loader groups by:
//!
//! - the **group signature**: the parameter-less SQL template, equal for
//!   structurally-equal statements and `None` whenever pagination (or an
//!   explicit un-mergeable marking) forbids merging;
//! - the **identity key**: the SQL with each parameter rendered as a
//!   literal, used for request-scoped de-duplication.
//!
//! Both forms are emitted natively during construction; the statement that
//! executes is always the placeholder form with its bound parameter vector.

use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::filter::FilterFragment;
use super::projection::ProjectionPlan;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    IntArray(Vec<i64>),
    TextArray(Vec<String>),
}

impl SqlValue {
    /// Literal rendering used for the identity key. Not fed back to the
    /// database; parameters always execute through binds.
    fn render(&self) -> String {
        fn quote(text: &str) -> String {
            format!("'{}'", text.replace('\'', "''"))
        }
        match self {
            Self::Int(v) => v.to_string(),
            Self::Text(s) => quote(s),
            Self::IntArray(vs) => {
                let items: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                format!("{{{}}}", items.join(","))
            }
            Self::TextArray(vs) => {
                let items: Vec<String> = vs.iter().map(|s| quote(s)).collect();
                format!("{{{}}}", items.join(","))
            }
        }
    }
}

/// Builder for one SELECT statement.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: &'static str,
    columns: Vec<String>,
    joins: Vec<&'static str>,
    distinct: bool,
    clauses: Vec<(String, Vec<SqlValue>)>,
    /// Qualified id column to count instead of projecting rows
    count_of: Option<String>,
    offset: Option<i64>,
    limit: Option<i64>,
    unmergeable: bool,
}

impl SelectBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            joins: Vec::new(),
            distinct: false,
            clauses: Vec::new(),
            count_of: None,
            offset: None,
            limit: None,
            unmergeable: false,
        }
    }

    /// Start from a projection plan: columns, joins, DISTINCT.
    pub fn from_plan(table: &'static str, plan: &ProjectionPlan) -> Self {
        let mut builder = Self::new(table);
        builder.columns = plan.columns.clone();
        builder.joins = plan.joins.to_vec();
        builder.distinct = plan.needs_distinct;
        builder
    }

    pub fn column(mut self, column: String) -> Self {
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
        self
    }

    /// Ensure a column is projected first (demultiplexing keys).
    pub fn leading_column(mut self, column: String) -> Self {
        if let Some(pos) = self.columns.iter().position(|c| *c == column) {
            self.columns.remove(pos);
        }
        self.columns.insert(0, column);
        self
    }

    pub fn join(mut self, join: &'static str) -> Self {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
        self
    }

    /// Append a raw predicate clause with `?` markers and its parameters.
    pub fn clause(mut self, sql: String, params: Vec<SqlValue>) -> Self {
        self.clauses.push((sql, params));
        self
    }

    /// Merge a compiled filter fragment: clauses in declaration order plus
    /// any joins (and DISTINCT requirement) the filters introduced.
    pub fn filters(mut self, fragment: &FilterFragment) -> Self {
        for join in &fragment.joins {
            if !self.joins.contains(join) {
                self.joins.push(join);
            }
        }
        if fragment.needs_distinct {
            self.distinct = true;
        }
        for clause in &fragment.clauses {
            self.clauses.push((clause.sql.clone(), clause.params.clone()));
        }
        self
    }

    /// Turn the statement into `SELECT count(...)` over the same predicates.
    /// Pagination never applies to counts.
    pub fn count_of(mut self, qualified_id: String) -> Self {
        self.count_of = Some(qualified_id);
        self
    }

    pub fn offset(mut self, offset: Option<i64>) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    /// Force a nil group signature regardless of structure.
    pub fn unmergeable(mut self) -> Self {
        self.unmergeable = true;
        self
    }

    /// Assemble the SQL, derive both key forms, and collect the parameters.
    pub fn build(self) -> SelectStatement {
        let mut sql = String::from("SELECT ");
        match &self.count_of {
            Some(id_column) => {
                if self.distinct {
                    sql.push_str(&format!("count(DISTINCT {})", id_column));
                } else {
                    sql.push_str("count(*)");
                }
            }
            None => {
                if self.distinct {
                    sql.push_str("DISTINCT ");
                }
                sql.push_str(&self.columns.join(","));
            }
        }
        sql.push_str(&format!(" FROM \"{}\"", self.table));
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        let mut params: Vec<SqlValue> = Vec::new();
        for (i, (clause, clause_params)) in self.clauses.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(clause);
            params.extend(clause_params.iter().cloned());
        }

        let paginated = self.count_of.is_none() && (self.limit.is_some() || self.offset.is_some());
        if self.count_of.is_none() {
            if let Some(limit) = self.limit {
                sql.push_str(" LIMIT ?");
                params.push(SqlValue::Int(limit));
            }
            if let Some(offset) = self.offset {
                sql.push_str(" OFFSET ?");
                params.push(SqlValue::Int(offset));
            }
        }

        let numbered = number_placeholders(&sql);
        let identity_key = substitute_literals(&sql, &params);
        let group_signature = if paginated || self.unmergeable {
            None
        } else {
            Some(numbered.clone())
        };

        SelectStatement {
            sql: numbered,
            params,
            group_signature,
            identity_key,
        }
    }
}

/// A shaped statement ready to execute, with its loader keys.
#[derive(Debug, Clone)]
pub struct SelectStatement {
    /// SQL with `$n` positional placeholders
    pub sql: String,
    /// Bound parameters in placeholder order
    pub params: Vec<SqlValue>,
    /// Parameter-less template; `None` disables group merging
    pub group_signature: Option<String>,
    /// Fully-substituted form for request-scoped de-duplication
    pub identity_key: String,
}

impl SelectStatement {
    /// Run the statement and return the raw rows.
    pub async fn fetch_all(&self, pool: &PgPool) -> Result<Vec<PgRow>, sqlx::Error> {
        tracing::debug!(sql = %self.sql, "executing query");
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlValue::Int(v) => query.bind(v),
                SqlValue::Text(s) => query.bind(s),
                SqlValue::IntArray(vs) => query.bind(vs),
                SqlValue::TextArray(vs) => query.bind(vs),
            };
        }
        query.fetch_all(pool).await
    }

    /// Run the statement as a scalar count.
    pub async fn fetch_count(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        tracing::debug!(sql = %self.sql, "executing count");
        let mut query = sqlx::query_scalar(&self.sql);
        for param in &self.params {
            query = match param {
                SqlValue::Int(v) => query.bind(v),
                SqlValue::Text(s) => query.bind(s),
                SqlValue::IntArray(vs) => query.bind(vs),
                SqlValue::TextArray(vs) => query.bind(vs),
            };
        }
        query.fetch_one(pool).await
    }
}

/// Replace each `?` marker with `$1`, `$2`, … in order.
fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut n = 0;
    for ch in sql.chars() {
        if ch == '?' {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Replace each `?` marker with the literal rendering of its parameter.
fn substitute_literals(sql: &str, params: &[SqlValue]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut values = params.iter();
    for ch in sql.chars() {
        if ch == '?' {
            match values.next() {
                Some(value) => out.push_str(&value.render()),
                None => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
