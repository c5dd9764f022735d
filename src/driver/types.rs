//! Driver value and graph entity types.
//!
//! [`Value`] is the domain-level tagged sum handed to callers: scalars,
//! collections, and the hydrated graph entities. Wire-level
//! `PackStreamValue`s never leak out of the driver.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DriverError, DriverResult};
use crate::bolt::packstream::PackStreamValue;

/// A value produced by a query or bound as a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Pre-encoded PackStream bytes. Outbound only: bound as a parameter,
    /// the bytes are spliced into the outgoing message verbatim.
    Bytes(Vec<u8>),
    /// List of values
    List(Vec<Value>),
    /// Map with string keys
    Map(HashMap<String, Value>),
    /// A graph node
    Node(Node),
    /// A graph relationship
    Relationship(Relationship),
    /// A relationship without endpoint information
    UnboundRelationship(UnboundRelationship),
    /// A graph path
    Path(Path),
    /// A point in time, `None` being the zero timestamp. Bound as a
    /// parameter, it encodes as nanoseconds since the Unix epoch, or 0.
    Time(Option<DateTime<Utc>>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list reference.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Try to get as map reference.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get as node reference.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Try to get as relationship reference.
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Value::Relationship(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get as path reference.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Name of this value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Node(_) => "Node",
            Value::Relationship(_) => "Relationship",
            Value::UnboundRelationship(_) => "UnboundRelationship",
            Value::Path(_) => "Path",
            Value::Time(_) => "Time",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} raw bytes>", b.len()),
            Value::List(l) => write!(f, "[{} items]", l.len()),
            Value::Map(m) => write!(f, "{{{} entries}}", m.len()),
            Value::Node(n) => write!(f, "{}", n),
            Value::Relationship(r) => write!(f, "{}", r),
            Value::UnboundRelationship(r) => write!(f, "{}", r),
            Value::Path(p) => write!(f, "{}", p),
            Value::Time(Some(t)) => write!(f, "{}", t),
            Value::Time(None) => write!(f, "<zero time>"),
        }
    }
}

// Ergonomic conversions for parameter binding

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(Some(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(v: HashMap<String, T>) -> Self {
        Value::Map(v.into_iter().map(|(k, val)| (k, val.into())).collect())
    }
}

/// Outbound conversion for statement parameters.
///
/// Graph entities are query results, not parameters; binding one is an
/// error. Byte values pass through as pre-encoded PackStream, time values
/// flatten to nanoseconds since the epoch.
impl TryFrom<Value> for PackStreamValue {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Null => Ok(PackStreamValue::Null),
            Value::Boolean(b) => Ok(PackStreamValue::Boolean(b)),
            Value::Integer(i) => Ok(PackStreamValue::Integer(i)),
            Value::Float(f) => Ok(PackStreamValue::Float(f)),
            Value::String(s) => Ok(PackStreamValue::String(s)),
            Value::Bytes(b) => Ok(PackStreamValue::Raw(b)),
            Value::List(l) => Ok(PackStreamValue::List(
                l.into_iter()
                    .map(PackStreamValue::try_from)
                    .collect::<DriverResult<_>>()?,
            )),
            Value::Map(m) => Ok(PackStreamValue::Map(
                m.into_iter()
                    .map(|(k, v)| Ok((k, PackStreamValue::try_from(v)?)))
                    .collect::<DriverResult<_>>()?,
            )),
            Value::Time(t) => Ok(PackStreamValue::Integer(
                t.and_then(|t| t.timestamp_nanos_opt()).unwrap_or(0),
            )),
            other => Err(DriverError::protocol(format!(
                "{} cannot be used as a statement parameter",
                other.type_name()
            ))),
        }
    }
}

// Typed extraction used by Record getters

impl TryFrom<Value> for bool {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(conversion_error(&other, "bool")),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(conversion_error(&other, "i64")),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            other => Err(conversion_error(&other, "f64")),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(conversion_error(&other, "String")),
        }
    }
}

impl TryFrom<Value> for Node {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Node(n) => Ok(n),
            other => Err(conversion_error(&other, "Node")),
        }
    }
}

impl TryFrom<Value> for Relationship {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Relationship(r) => Ok(r),
            other => Err(conversion_error(&other, "Relationship")),
        }
    }
}

impl TryFrom<Value> for UnboundRelationship {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::UnboundRelationship(r) => Ok(r),
            other => Err(conversion_error(&other, "UnboundRelationship")),
        }
    }
}

impl TryFrom<Value> for Path {
    type Error = DriverError;

    fn try_from(value: Value) -> DriverResult<Self> {
        match value {
            Value::Path(p) => Ok(p),
            other => Err(conversion_error(&other, "Path")),
        }
    }
}

fn conversion_error(value: &Value, target: &str) -> DriverError {
    DriverError::protocol(format!("cannot convert {} to {}", value.type_name(), target))
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Entity id
    pub id: u64,
    /// Labels as carried on the wire, in order
    pub labels: Vec<String>,
    /// Node properties
    pub properties: HashMap<String, Value>,
}

impl Node {
    /// Create a new node.
    pub fn new(id: u64, labels: Vec<String>, properties: HashMap<String, Value>) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// The primary label: the first one on the wire, or `""` for an
    /// unlabelled node.
    pub fn label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }

    /// Check whether the node carries the given label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            write!(f, "({})", self.id)
        } else {
            write!(f, "({}:{})", self.id, self.labels.join(":"))
        }
    }
}

/// A relationship with no endpoint information, as carried inside a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnboundRelationship {
    /// Entity id
    pub id: u64,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Relationship properties
    pub properties: HashMap<String, Value>,
}

impl fmt::Display for UnboundRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-[{}:{}]-", self.id, self.rel_type)
    }
}

/// A graph relationship.
///
/// Standalone relationships carry only the endpoint ids; when produced as
/// part of a [`Path`], `start_index` / `end_index` also point into the
/// path's own node vector, so endpoints resolve without back-pointers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Entity id
    pub id: u64,
    /// Id of the node this relationship starts at
    pub start_node_id: u64,
    /// Id of the node this relationship ends at
    pub end_node_id: u64,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Relationship properties
    pub properties: HashMap<String, Value>,
    /// Index of the start node in the owning path, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    /// Index of the end node in the owning path, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
}

impl Relationship {
    /// Create a standalone relationship with known endpoint ids.
    pub fn new(
        id: u64,
        start_node_id: u64,
        end_node_id: u64,
        rel_type: String,
        properties: HashMap<String, Value>,
    ) -> Self {
        Self {
            id,
            start_node_id,
            end_node_id,
            rel_type,
            properties,
            start_index: None,
            end_index: None,
        }
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})-[{}:{}]->({})",
            self.start_node_id, self.id, self.rel_type, self.end_node_id
        )
    }
}

/// A graph path: an alternating sequence of nodes and relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Nodes on the path
    pub nodes: Vec<Node>,
    /// Relationships on the path, endpoints resolved against `nodes`
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// Path length: the number of relationships.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Check whether the path contains no relationships.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// The first node of the path.
    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Resolve the start node of one of this path's relationships.
    pub fn start_node_of(&self, rel: &Relationship) -> Option<&Node> {
        rel.start_index.and_then(|i| self.nodes.get(i))
    }

    /// Resolve the end node of one of this path's relationships.
    pub fn end_node_of(&self, rel: &Relationship) -> Option<&Node> {
        rel.end_index.and_then(|i| self.nodes.get(i))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<path: {} nodes, {} relationships>",
            self.nodes.len(),
            self.relationships.len()
        )
    }
}
