//! Query result records.

use std::collections::HashMap;
use std::fmt;

use super::error::{DriverError, DriverResult};
use super::types::{Node, Path, Relationship, Value};

/// One row of a query result, with values addressable by field name or
/// position.
#[derive(Debug, Clone)]
pub struct Record {
    keys: Vec<String>,
    values: Vec<Value>,
    key_index: HashMap<String, usize>,
}

impl Record {
    /// Create a new record from parallel key and value lists.
    pub fn new(keys: Vec<String>, values: Vec<Value>) -> Self {
        let key_index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();

        Self {
            keys,
            values,
            key_index,
        }
    }

    /// Field names.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Field values, in field order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by field name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.key_index.get(key).and_then(|&i| self.values.get(i))
    }

    /// Get a value by position.
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Check whether a field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    /// Get a value by field name, converted to the requested type.
    pub fn get_as<T>(&self, key: &str) -> DriverResult<T>
    where
        T: TryFrom<Value, Error = DriverError>,
    {
        self.get(key)
            .cloned()
            .ok_or_else(|| DriverError::protocol(format!("field '{}' not found", key)))
            .and_then(T::try_from)
    }

    /// Get a boolean field.
    pub fn get_bool(&self, key: &str) -> DriverResult<bool> {
        self.get_as(key)
    }

    /// Get an integer field.
    pub fn get_int(&self, key: &str) -> DriverResult<i64> {
        self.get_as(key)
    }

    /// Get a float field.
    pub fn get_float(&self, key: &str) -> DriverResult<f64> {
        self.get_as(key)
    }

    /// Get a string field.
    pub fn get_string(&self, key: &str) -> DriverResult<String> {
        self.get_as(key)
    }

    /// Get a node field.
    pub fn get_node(&self, key: &str) -> DriverResult<Node> {
        self.get_as(key)
    }

    /// Get a relationship field.
    pub fn get_relationship(&self, key: &str) -> DriverResult<Relationship> {
        self.get_as(key)
    }

    /// Get a path field.
    pub fn get_path(&self, key: &str) -> DriverResult<Path> {
        self.get_as(key)
    }

    /// Get an optional field: a missing field or a null value is `None`.
    pub fn get_optional<T>(&self, key: &str) -> DriverResult<Option<T>>
    where
        T: TryFrom<Value, Error = DriverError>,
    {
        match self.get(key) {
            Some(Value::Null) | None => Ok(None),
            Some(v) => T::try_from(v.clone()).map(Some),
        }
    }

    /// Convert into a field-name to value map.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.keys
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .keys
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<String>, std::vec::IntoIter<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter().zip(self.values)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::iter::Zip<std::slice::Iter<'a, String>, std::slice::Iter<'a, Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter().zip(self.values.iter())
    }
}

/// An iterator over the records of a fully pulled result.
#[derive(Debug)]
pub struct RecordStream {
    records: std::vec::IntoIter<Record>,
}

impl RecordStream {
    /// Create a new stream over the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }

    /// Create an empty stream.
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Number of records not yet consumed.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    /// Consume the stream, expecting exactly one record.
    pub fn single(mut self) -> DriverResult<Record> {
        match self.records.next() {
            Some(record) if self.records.next().is_none() => Ok(record),
            Some(_) => Err(DriverError::protocol("expected a single record, got several")),
            None => Err(DriverError::protocol("expected a single record, got none")),
        }
    }

    /// Consume the stream, returning the first record if any.
    pub fn first(mut self) -> Option<Record> {
        self.records.next()
    }
}

impl Iterator for RecordStream {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record::new(
            vec!["name".into(), "age".into(), "active".into()],
            vec![
                Value::String("Alice".into()),
                Value::Integer(30),
                Value::Boolean(true),
            ],
        )
    }

    #[test]
    fn test_record_access() {
        let record = sample_record();
        assert_eq!(record.len(), 3);
        assert!(!record.is_empty());
        assert_eq!(record.keys(), &["name", "age", "active"]);

        assert_eq!(record.get("name"), Some(&Value::String("Alice".into())));
        assert_eq!(record.get("unknown"), None);
        assert_eq!(record.get_by_index(1), Some(&Value::Integer(30)));
        assert_eq!(record.get_by_index(3), None);
        assert!(record.contains_key("age"));
        assert!(!record.contains_key("unknown"));
    }

    #[test]
    fn test_record_typed_getters() {
        let record = sample_record();
        assert_eq!(record.get_string("name").unwrap(), "Alice");
        assert_eq!(record.get_int("age").unwrap(), 30);
        assert!(record.get_bool("active").unwrap());

        assert!(record.get_int("name").is_err());
        assert!(record.get_string("unknown").is_err());
    }

    #[test]
    fn test_record_get_optional() {
        let record = Record::new(
            vec!["value".into(), "nothing".into()],
            vec![Value::Integer(42), Value::Null],
        );
        assert_eq!(record.get_optional::<i64>("value").unwrap(), Some(42));
        assert_eq!(record.get_optional::<i64>("nothing").unwrap(), None);
        assert_eq!(record.get_optional::<i64>("unknown").unwrap(), None);
    }

    #[test]
    fn test_record_to_map() {
        let map = sample_record().to_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("age"), Some(&Value::Integer(30)));
    }

    #[test]
    fn test_record_display() {
        let display = sample_record().to_string();
        assert!(display.contains("name: \"Alice\""));
        assert!(display.contains("age: 30"));
    }

    #[test]
    fn test_record_iteration() {
        let pairs: Vec<_> = sample_record().into_iter().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, "name");

        let record = sample_record();
        let borrowed: Vec<_> = (&record).into_iter().collect();
        assert_eq!(borrowed.len(), 3);
    }

    #[test]
    fn test_stream_iteration() {
        let records = vec![
            Record::new(vec!["n".into()], vec![Value::Integer(1)]),
            Record::new(vec!["n".into()], vec![Value::Integer(2)]),
        ];
        let mut stream = RecordStream::new(records);

        assert_eq!(stream.remaining(), 2);
        assert_eq!(stream.next().unwrap().get_int("n").unwrap(), 1);
        assert_eq!(stream.remaining(), 1);
        assert_eq!(stream.next().unwrap().get_int("n").unwrap(), 2);
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stream_single() {
        let one = RecordStream::new(vec![Record::new(
            vec!["n".into()],
            vec![Value::Integer(1)],
        )]);
        assert_eq!(one.single().unwrap().get_int("n").unwrap(), 1);

        assert!(RecordStream::empty().single().is_err());

        let two = RecordStream::new(vec![
            Record::new(vec!["n".into()], vec![Value::Integer(1)]),
            Record::new(vec!["n".into()], vec![Value::Integer(2)]),
        ]);
        assert!(two.single().is_err());
    }

    #[test]
    fn test_stream_first() {
        let records = vec![
            Record::new(vec!["n".into()], vec![Value::Integer(1)]),
            Record::new(vec!["n".into()], vec![Value::Integer(2)]),
        ];
        assert_eq!(
            RecordStream::new(records).first().unwrap().get_int("n").unwrap(),
            1
        );
        assert!(RecordStream::empty().first().is_none());
    }
}
