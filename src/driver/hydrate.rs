//! Graph entity hydration.
//!
//! Turns decoded PackStream values into domain [`Value`]s. Scalars pass
//! through, lists and maps are rewritten element-wise, and tagged structures
//! become the four graph entities. All shape checks are strict: a structure
//! that does not match its advertised signature is a protocol error.

use std::collections::HashMap;

use super::error::{DriverError, DriverResult};
use super::types::{Node, Path, Relationship, UnboundRelationship, Value};
use crate::bolt::packstream::marker::{
    NODE_SIG, PATH_SIG, RELATIONSHIP_SIG, UNBOUND_RELATIONSHIP_SIG,
};
use crate::bolt::packstream::{PackStreamStructure, PackStreamValue};

/// Hydrate one decoded value into its domain form.
pub fn hydrate(value: PackStreamValue) -> DriverResult<Value> {
    match value {
        PackStreamValue::Null => Ok(Value::Null),
        PackStreamValue::Boolean(b) => Ok(Value::Boolean(b)),
        PackStreamValue::Integer(i) => Ok(Value::Integer(i)),
        PackStreamValue::Float(f) => Ok(Value::Float(f)),
        PackStreamValue::String(s) => Ok(Value::String(s)),
        PackStreamValue::List(l) => Ok(Value::List(
            l.into_iter().map(hydrate).collect::<DriverResult<_>>()?,
        )),
        PackStreamValue::Map(m) => Ok(Value::Map(hydrate_map(m)?)),
        PackStreamValue::Structure(st) => hydrate_structure(st),
        PackStreamValue::Raw(_) => Err(DriverError::protocol(
            "raw bytes are write-only and cannot appear in a result",
        )),
    }
}

pub(crate) fn hydrate_map(
    map: HashMap<String, PackStreamValue>,
) -> DriverResult<HashMap<String, Value>> {
    map.into_iter()
        .map(|(k, v)| Ok((k, hydrate(v)?)))
        .collect()
}

fn hydrate_structure(st: PackStreamStructure) -> DriverResult<Value> {
    match st.signature {
        NODE_SIG => Ok(Value::Node(hydrate_node(st)?)),
        RELATIONSHIP_SIG => Ok(Value::Relationship(hydrate_relationship(st)?)),
        UNBOUND_RELATIONSHIP_SIG => {
            Ok(Value::UnboundRelationship(hydrate_unbound_relationship(st)?))
        }
        PATH_SIG => Ok(Value::Path(hydrate_path(st)?)),
        other => Err(DriverError::protocol(format!(
            "unknown entity signature 0x{:02X}",
            other
        ))),
    }
}

fn hydrate_node(st: PackStreamStructure) -> DriverResult<Node> {
    let [id, labels, properties] = take_fields(st.fields, "Node")?;

    let id = expect_id(id, "Node id")?;
    let labels = expect_list(labels, "Node labels")?
        .into_iter()
        .map(|label| expect_string(label, "Node label"))
        .collect::<DriverResult<Vec<_>>>()?;
    let properties = hydrate_map(expect_map(properties, "Node properties")?)?;

    Ok(Node::new(id, labels, properties))
}

fn hydrate_unbound_relationship(st: PackStreamStructure) -> DriverResult<UnboundRelationship> {
    let [id, rel_type, properties] = take_fields(st.fields, "UnboundRelationship")?;

    Ok(UnboundRelationship {
        id: expect_id(id, "UnboundRelationship id")?,
        rel_type: expect_string(rel_type, "UnboundRelationship type")?,
        properties: hydrate_map(expect_map(properties, "UnboundRelationship properties")?)?,
    })
}

fn hydrate_relationship(st: PackStreamStructure) -> DriverResult<Relationship> {
    let [id, start, end, rel_type, properties] = take_fields(st.fields, "Relationship")?;

    Ok(Relationship::new(
        expect_id(id, "Relationship id")?,
        expect_id(start, "Relationship start node id")?,
        expect_id(end, "Relationship end node id")?,
        expect_string(rel_type, "Relationship type")?,
        hydrate_map(expect_map(properties, "Relationship properties")?)?,
    ))
}

/// Rebuild a path from its nodes, unbound relationships, and the signed
/// interleaved index sequence.
///
/// The sequence alternates (relationship index, node index) pairs. A
/// positive, 1-based relationship index means forward traversal from the
/// previous node; a negative one means the relationship is traversed against
/// its direction. Zero is never legal, and every index must fall inside its
/// list.
fn hydrate_path(st: PackStreamStructure) -> DriverResult<Path> {
    let [nodes, relationships, sequence] = take_fields(st.fields, "Path")?;

    let nodes = expect_list(nodes, "Path nodes")?
        .into_iter()
        .map(|v| hydrate_node(expect_structure(v, NODE_SIG, "Path node")?))
        .collect::<DriverResult<Vec<Node>>>()?;

    let mut relationships = expect_list(relationships, "Path relationships")?
        .into_iter()
        .map(|v| {
            let unbound = hydrate_unbound_relationship(expect_structure(
                v,
                UNBOUND_RELATIONSHIP_SIG,
                "Path relationship",
            )?)?;
            Ok(Relationship {
                id: unbound.id,
                start_node_id: 0,
                end_node_id: 0,
                rel_type: unbound.rel_type,
                properties: unbound.properties,
                start_index: None,
                end_index: None,
            })
        })
        .collect::<DriverResult<Vec<Relationship>>>()?;

    let sequence = expect_list(sequence, "Path sequence")?
        .into_iter()
        .map(|v| expect_int(v, "Path sequence entry"))
        .collect::<DriverResult<Vec<i64>>>()?;

    if sequence.len() % 2 != 0 {
        return Err(DriverError::protocol("Path sequence has odd length"));
    }
    if !sequence.is_empty() && nodes.is_empty() {
        return Err(DriverError::protocol("Path sequence without nodes"));
    }

    let mut last = 0usize;
    for pair in sequence.chunks_exact(2) {
        let (rel_index, node_index) = (pair[0], pair[1]);

        if rel_index == 0 {
            return Err(DriverError::protocol("Path relationship index is zero"));
        }
        if node_index < 0 || node_index >= nodes.len() as i64 {
            return Err(DriverError::protocol(format!(
                "Path node index {} out of range",
                node_index
            )));
        }
        let node_index = node_index as usize;

        // 1-based on the wire; the sign encodes traversal direction
        let (rel_at, from, to) = if rel_index > 0 {
            (rel_index - 1, last, node_index)
        } else {
            (-(rel_index + 1), node_index, last)
        };
        if rel_at >= relationships.len() as i64 {
            return Err(DriverError::protocol(format!(
                "Path relationship index {} out of range",
                rel_index
            )));
        }

        let rel = &mut relationships[rel_at as usize];
        rel.start_index = Some(from);
        rel.end_index = Some(to);
        rel.start_node_id = nodes[from].id;
        rel.end_node_id = nodes[to].id;

        last = node_index;
    }

    Ok(Path {
        nodes,
        relationships,
    })
}

fn take_fields<const N: usize>(
    fields: Vec<PackStreamValue>,
    what: &str,
) -> DriverResult<[PackStreamValue; N]> {
    let len = fields.len();
    fields.try_into().map_err(|_| {
        DriverError::protocol(format!("{} requires {} fields, got {}", what, N, len))
    })
}

fn expect_int(value: PackStreamValue, what: &str) -> DriverResult<i64> {
    match value {
        PackStreamValue::Integer(i) => Ok(i),
        other => Err(type_mismatch(what, "integer", &other)),
    }
}

fn expect_id(value: PackStreamValue, what: &str) -> DriverResult<u64> {
    Ok(expect_int(value, what)? as u64)
}

fn expect_string(value: PackStreamValue, what: &str) -> DriverResult<String> {
    match value {
        PackStreamValue::String(s) => Ok(s),
        other => Err(type_mismatch(what, "string", &other)),
    }
}

fn expect_list(value: PackStreamValue, what: &str) -> DriverResult<Vec<PackStreamValue>> {
    match value {
        PackStreamValue::List(l) => Ok(l),
        other => Err(type_mismatch(what, "list", &other)),
    }
}

fn expect_map(
    value: PackStreamValue,
    what: &str,
) -> DriverResult<HashMap<String, PackStreamValue>> {
    match value {
        PackStreamValue::Map(m) => Ok(m),
        other => Err(type_mismatch(what, "map", &other)),
    }
}

fn expect_structure(
    value: PackStreamValue,
    signature: u8,
    what: &str,
) -> DriverResult<PackStreamStructure> {
    match value {
        PackStreamValue::Structure(st) if st.signature == signature => Ok(st),
        PackStreamValue::Structure(st) => Err(DriverError::protocol(format!(
            "{} has signature 0x{:02X}, expected 0x{:02X}",
            what, st.signature, signature
        ))),
        other => Err(type_mismatch(what, "structure", &other)),
    }
}

fn type_mismatch(what: &str, expected: &str, got: &PackStreamValue) -> DriverError {
    DriverError::protocol(format!("{} must be a {}, got {:?}", what, expected, got))
}
