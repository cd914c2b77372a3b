//! Blackboard-pattern key/value store for runtime data passing between nodes.
//!
//! Executors write results here (detected coordinates, OCR text, found
//! flags) and downstream edge conditions and executors read them. Storage is
//! untyped (key to tagged value); the typed getters return `None` on absence
//! or type mismatch instead of panicking.

use std::collections::HashMap;
use std::fmt;

use crate::model::Point;

/// A value on the blackboard.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Point(Point),
    Blob(Vec<u8>),
}

impl fmt::Display for ContextValue {
    /// Stringified form used by `IfContextEquals` comparisons.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(s) => write!(f, "{s}"),
            ContextValue::Number(n) => write!(f, "{n}"),
            ContextValue::Bool(b) => write!(f, "{b}"),
            ContextValue::Point(p) => write!(f, "{},{}", p.x, p.y),
            ContextValue::Blob(bytes) => write!(f, "[blob:{} bytes]", bytes.len()),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<f64> for ContextValue {
    fn from(n: f64) -> Self {
        ContextValue::Number(n)
    }
}

impl From<f32> for ContextValue {
    fn from(n: f32) -> Self {
        ContextValue::Number(n as f64)
    }
}

impl From<i64> for ContextValue {
    fn from(n: i64) -> Self {
        ContextValue::Number(n as f64)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

impl From<Point> for ContextValue {
    fn from(p: Point) -> Self {
        ContextValue::Point(p)
    }
}

/// Run-scoped blackboard. Created empty at run start, discarded at run end;
/// never persisted. The engine sequences node executions, so writes made by
/// node N are visible to node N+1 without any locking.
#[derive(Debug, Default)]
pub struct FlowContext {
    store: HashMap<String, ContextValue>,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a value under `key`, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.store.insert(key.into(), value.into());
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.store.get(key)
    }

    /// Text at `key`, or `None` if absent or not text.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.store.get(key) {
            Some(ContextValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Number at `key`, or `None` if absent or not numeric.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.store.get(key) {
            Some(ContextValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Boolean at `key`, or `None` if absent or not a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.store.get(key) {
            Some(ContextValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Point at `key`. Accepts a stored `Point` or `"x,y"` encoded text, the
    /// form sensing executors write alongside their found flags.
    pub fn get_point(&self, key: &str) -> Option<Point> {
        match self.store.get(key) {
            Some(ContextValue::Point(p)) => Some(*p),
            Some(ContextValue::Text(s)) => parse_point(s),
            _ => None,
        }
    }

    /// Blob bytes at `key`, or `None` if absent or not a blob.
    pub fn get_blob(&self, key: &str) -> Option<&[u8]> {
        match self.store.get(key) {
            Some(ContextValue::Blob(b)) => Some(b),
            _ => None,
        }
    }

    /// Stringified value at `key`, the form `IfContextEquals` compares.
    pub fn get_stringified(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|v| v.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.store.remove(key)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Snapshot of all keys, for debugging.
    pub fn keys(&self) -> Vec<&str> {
        self.store.keys().map(String::as_str).collect()
    }
}

fn parse_point(s: &str) -> Option<Point> {
    let (x, y) = s.split_once(',')?;
    Some(Point {
        x: x.trim().parse().ok()?,
        y: y.trim().parse().ok()?,
    })
}
