//! In-Memory Store Adapter
//!
//! Implements the `StorageGateway` port against process memory. Used by
//! tests and local development runs.
//!
//! The query path evaluates the same key-expression grammar the platform
//! uses against its document store: clauses of the form
//! `field op :placeholder` joined with `AND`, where `op` is one of
//! `=`, `>`, `<`, `>=`, `<=`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{QueryCondition, QueryResult, StorageGateway};
use crate::error::{Error, Result};

/// In-memory table store for testing and local runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with items.
    pub fn seed(&self, table: &str, items: Vec<Value>) {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .extend(items);
    }

    /// Make every operation against the named table fail. Used by tests
    /// to simulate a storage outage scoped to one table.
    pub fn set_failing(&self, table: &str, failing: bool) {
        if failing {
            self.failing.write().insert(table.to_string());
        } else {
            self.failing.write().remove(table);
        }
    }

    /// All items currently stored in a table.
    pub fn items(&self, table: &str) -> Vec<Value> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    /// Number of items stored in a table.
    pub fn len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, |t| t.len())
    }

    /// True if the table is absent or empty.
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn check_available(&self, table: &str) -> Result<()> {
        if self.failing.read().contains(table) {
            return Err(Error::StoreRequest(format!(
                "table {} is unavailable",
                table
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for InMemoryStore {
    async fn put(&self, table: &str, item: Value) -> Result<()> {
        self.check_available(table)?;
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(item);
        Ok(())
    }

    async fn query(&self, table: &str, condition: QueryCondition) -> Result<QueryResult> {
        self.check_available(table)?;

        let clauses = parse_expression(&condition)?;
        let tables = self.tables.read();
        let items: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| clauses.iter().all(|c| c.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(table, matched = items.len(), "In-memory query");

        let count = items.len();
        Ok(QueryResult { items, count })
    }
}

// =============================================================================
// Expression Evaluation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, Clone)]
struct Clause {
    field: String,
    op: Op,
    value: Value,
}

impl Clause {
    fn matches(&self, row: &Value) -> bool {
        let Some(actual) = row.get(&self.field) else {
            return false;
        };

        match (actual, &self.value) {
            (Value::Number(a), Value::Number(b)) => {
                let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) else {
                    return false;
                };
                compare(self.op, a.partial_cmp(&b))
            }
            // Lexicographic string comparison; RFC3339 timestamps order
            // correctly under it.
            (Value::String(a), Value::String(b)) => compare(self.op, a.partial_cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => self.op == Op::Eq && a == b,
            _ => false,
        }
    }
}

fn compare(op: Op, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    match (op, ordering) {
        (Op::Eq, Some(Equal)) => true,
        (Op::Gt, Some(Greater)) => true,
        (Op::Lt, Some(Less)) => true,
        (Op::Ge, Some(Greater | Equal)) => true,
        (Op::Le, Some(Less | Equal)) => true,
        _ => false,
    }
}

fn parse_expression(condition: &QueryCondition) -> Result<Vec<Clause>> {
    condition
        .key_expression
        .split(" AND ")
        .map(|raw| parse_clause(raw.trim(), &condition.attribute_values))
        .collect()
}

fn parse_clause(raw: &str, values: &HashMap<String, Value>) -> Result<Clause> {
    let mut parts = raw.split_whitespace();
    let (Some(field), Some(op), Some(placeholder), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::StoreRequest(format!(
            "unsupported key expression clause: {raw}"
        )));
    };

    let op = match op {
        "=" => Op::Eq,
        ">" => Op::Gt,
        "<" => Op::Lt,
        ">=" => Op::Ge,
        "<=" => Op::Le,
        other => {
            return Err(Error::StoreRequest(format!(
                "unsupported operator: {other}"
            )))
        }
    };

    let value = values.get(placeholder).cloned().ok_or_else(|| {
        Error::StoreRequest(format!("unbound placeholder: {placeholder}"))
    })?;

    Ok(Clause {
        field: field.to_string(),
        op,
        value,
    })
}

// =============================================================================
// Tests
// =============================================================================
