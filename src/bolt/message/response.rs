//! Bolt protocol response messages.
//!
//! Response messages are sent from the server to the client. Parsing is
//! strict: a response whose shape deviates from the protocol is an error,
//! never silently coerced.

use std::collections::HashMap;

use super::signature;
use crate::bolt::error::BoltError;
use crate::bolt::packstream::{PackStreamStructure, PackStreamValue};

/// All Bolt v1 response messages.
#[derive(Debug, Clone)]
pub enum Response {
    /// SUCCESS: the request completed, with metadata
    Success(SuccessMessage),
    /// RECORD: one row of a result stream
    Record(RecordMessage),
    /// IGNORED: the request was skipped because the session is failed
    Ignored,
    /// FAILURE: the request failed, with a code and message
    Failure(FailureMessage),
}

impl Response {
    /// Get the message signature byte.
    pub fn signature(&self) -> u8 {
        match self {
            Response::Success(_) => signature::SUCCESS,
            Response::Record(_) => signature::RECORD,
            Response::Ignored => signature::IGNORED,
            Response::Failure(_) => signature::FAILURE,
        }
    }

    /// Get the message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Response::Success(_) => "SUCCESS",
            Response::Record(_) => "RECORD",
            Response::Ignored => "IGNORED",
            Response::Failure(_) => "FAILURE",
        }
    }

    /// Parse a response from its wire structure.
    pub fn from_structure(st: PackStreamStructure) -> Result<Self, BoltError> {
        match st.signature {
            signature::SUCCESS => Ok(Response::Success(SuccessMessage::from_structure(st)?)),
            signature::RECORD => Ok(Response::Record(RecordMessage::from_structure(st)?)),
            signature::IGNORED => Ok(Response::Ignored),
            signature::FAILURE => Ok(Response::Failure(FailureMessage::from_structure(st)?)),
            other => Err(BoltError::protocol(format!(
                "unexpected message signature 0x{:02X}",
                other
            ))),
        }
    }
}

/// SUCCESS: the request completed, carrying a metadata map.
#[derive(Debug, Clone, Default)]
pub struct SuccessMessage {
    /// Response metadata
    pub metadata: HashMap<String, PackStreamValue>,
}

impl SuccessMessage {
    /// Get a metadata entry.
    pub fn get(&self, key: &str) -> Option<&PackStreamValue> {
        self.metadata.get(key)
    }

    /// Extract the `fields` list announced by a RUN success.
    ///
    /// The key must be present and must be a list of strings.
    pub fn fields(&self) -> Result<Vec<String>, BoltError> {
        let list = self
            .metadata
            .get("fields")
            .and_then(|v| v.as_list())
            .ok_or_else(|| BoltError::protocol("RUN success carries no fields list"))?;
        list.iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| BoltError::protocol("field name is not a string"))
            })
            .collect()
    }

    fn from_structure(st: PackStreamStructure) -> Result<Self, BoltError> {
        let mut fields = st.fields;
        match (fields.len(), fields.pop()) {
            (1, Some(PackStreamValue::Map(metadata))) => Ok(Self { metadata }),
            _ => Err(BoltError::protocol(
                "SUCCESS must carry exactly one metadata map",
            )),
        }
    }
}

/// RECORD: one row of values from a result stream.
#[derive(Debug, Clone)]
pub struct RecordMessage {
    /// Row values, one per announced field
    pub values: Vec<PackStreamValue>,
}

impl RecordMessage {
    fn from_structure(st: PackStreamStructure) -> Result<Self, BoltError> {
        let mut fields = st.fields;
        match (fields.len(), fields.pop()) {
            (1, Some(PackStreamValue::List(values))) => Ok(Self { values }),
            _ => Err(BoltError::protocol(
                "RECORD must carry exactly one value list",
            )),
        }
    }
}

/// FAILURE: the request failed with a server error code and message.
#[derive(Debug, Clone)]
pub struct FailureMessage {
    /// Server error code, e.g. `Neo.ClientError.Statement.SyntaxError`
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl FailureMessage {
    fn from_structure(st: PackStreamStructure) -> Result<Self, BoltError> {
        let metadata = match st.fields.first() {
            Some(PackStreamValue::Map(m)) if st.fields.len() == 1 => m,
            _ => {
                return Err(BoltError::protocol(
                    "FAILURE must carry exactly one metadata map",
                ))
            }
        };

        let code = metadata
            .get("code")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let message = metadata
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        if code.is_empty() && message.is_empty() {
            return Err(BoltError::protocol(
                "FAILURE carries neither code nor message",
            ));
        }

        Ok(Self { code, message })
    }
}
