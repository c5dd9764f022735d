//! Bolt protocol request messages.
//!
//! Request messages are sent from the client to the server.

use std::collections::HashMap;

use super::signature;
use crate::bolt::packstream::{PackStreamStructure, PackStreamValue};

/// All Bolt v1 request messages.
#[derive(Debug, Clone)]
pub enum Request {
    /// INIT: identify the client and authenticate
    Init {
        /// Client name and version, e.g. `"Neo4jBoltDriver/1.0"`
        client_name: String,
        /// Auth map with `scheme`, `principal` and `credentials` keys
        auth: HashMap<String, PackStreamValue>,
    },
    /// RUN: execute a statement with named parameters
    Run {
        /// Statement text
        statement: String,
        /// Parameter map
        parameters: HashMap<String, PackStreamValue>,
    },
    /// DISCARD_ALL: drop all records pending from the last RUN
    DiscardAll,
    /// PULL_ALL: stream all records pending from the last RUN
    PullAll,
    /// ACK_FAILURE: acknowledge a FAILURE and resynchronize the session
    AckFailure,
}

impl Request {
    /// Build an INIT request from the parts of an auth token.
    pub fn init(client_name: &str, scheme: &str, principal: &str, credentials: &str) -> Self {
        let mut auth = HashMap::new();
        auth.insert("scheme".to_string(), PackStreamValue::from(scheme));
        auth.insert("principal".to_string(), PackStreamValue::from(principal));
        auth.insert("credentials".to_string(), PackStreamValue::from(credentials));
        Request::Init {
            client_name: client_name.to_string(),
            auth,
        }
    }

    /// Build a RUN request.
    pub fn run(statement: &str, parameters: HashMap<String, PackStreamValue>) -> Self {
        Request::Run {
            statement: statement.to_string(),
            parameters,
        }
    }

    /// Get the message signature byte.
    pub fn signature(&self) -> u8 {
        match self {
            Request::Init { .. } => signature::INIT,
            Request::Run { .. } => signature::RUN,
            Request::DiscardAll => signature::DISCARD_ALL,
            Request::PullAll => signature::PULL_ALL,
            Request::AckFailure => signature::ACK_FAILURE,
        }
    }

    /// Get the message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Init { .. } => "INIT",
            Request::Run { .. } => "RUN",
            Request::DiscardAll => "DISCARD_ALL",
            Request::PullAll => "PULL_ALL",
            Request::AckFailure => "ACK_FAILURE",
        }
    }

    /// Convert to the wire structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        match self {
            Request::Init { client_name, auth } => PackStreamStructure::new(
                signature::INIT,
                vec![
                    PackStreamValue::String(client_name.clone()),
                    PackStreamValue::Map(auth.clone()),
                ],
            ),
            Request::Run {
                statement,
                parameters,
            } => PackStreamStructure::new(
                signature::RUN,
                vec![
                    PackStreamValue::String(statement.clone()),
                    PackStreamValue::Map(parameters.clone()),
                ],
            ),
            Request::DiscardAll => PackStreamStructure::new(signature::DISCARD_ALL, vec![]),
            Request::PullAll => PackStreamStructure::new(signature::PULL_ALL, vec![]),
            Request::AckFailure => PackStreamStructure::new(signature::ACK_FAILURE, vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_structure() {
        let request = Request::init("Neo4jBoltDriver/1.0", "basic", "neo4j", "secret");
        let st = request.to_structure();

        assert_eq!(st.signature, 0x01);
        assert_eq!(st.fields.len(), 2);
        assert_eq!(st.fields[0].as_str(), Some("Neo4jBoltDriver/1.0"));

        let auth = st.fields[1].as_map().unwrap();
        assert_eq!(auth.get("scheme").unwrap().as_str(), Some("basic"));
        assert_eq!(auth.get("principal").unwrap().as_str(), Some("neo4j"));
        assert_eq!(auth.get("credentials").unwrap().as_str(), Some("secret"));
    }

    #[test]
    fn test_run_structure() {
        let mut params = HashMap::new();
        params.insert("0".to_string(), PackStreamValue::Integer(42));
        let request = Request::run("RETURN {0}", params);
        let st = request.to_structure();

        assert_eq!(st.signature, 0x10);
        assert_eq!(st.fields.len(), 2);
        assert_eq!(st.fields[0].as_str(), Some("RETURN {0}"));
        assert_eq!(
            st.fields[1].as_map().unwrap().get("0").unwrap().as_int(),
            Some(42)
        );
    }

    #[test]
    fn test_fieldless_requests() {
        for (request, sig) in [
            (Request::DiscardAll, 0x2F),
            (Request::PullAll, 0x3F),
            (Request::AckFailure, 0x0F),
        ] {
            let st = request.to_structure();
            assert_eq!(st.signature, sig);
            assert!(st.fields.is_empty());
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Request::PullAll.name(), "PULL_ALL");
        assert_eq!(Request::AckFailure.name(), "ACK_FAILURE");
        assert_eq!(
            Request::run("RETURN 1", HashMap::new()).name(),
            "RUN"
        );
    }
}
