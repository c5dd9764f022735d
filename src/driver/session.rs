//! Session state machine.
//!
//! A session is one strictly sequential request/response conversation over
//! an owned byte stream. It is created by the driver facade after a
//! successful handshake, authenticated with INIT, and driven by `run` until
//! closed. Concurrent use is unsupported by design; a caller that needs
//! cancellation closes the underlying stream, which surfaces as an error at
//! the next read.

use std::collections::HashMap;
use std::io::{Read, Write};

use tracing::{debug, trace};

use super::driver::AuthToken;
use super::error::{DriverError, DriverResult, UNAUTHORIZED_CODE};
use super::hydrate::{hydrate, hydrate_map};
use super::record::{Record, RecordStream};
use super::types::Value;
use crate::bolt::chunk::{ChunkReader, ChunkWriter};
use crate::bolt::message::{FailureMessage, Request, Response};
use crate::bolt::packstream::{decode, encode, PackStreamValue};

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake done, INIT not yet sent
    Handshook,
    /// Idle, ready for a request
    Ready,
    /// A result stream is being consumed
    Streaming,
    /// The server reported a failure that has not been acknowledged yet
    Failed,
    /// The stream has been released; no further requests are possible
    Closed,
}

/// A sequential Bolt session over an owned stream.
///
/// The session holds the stream plus the reader and writer framers, and
/// tracks at most one open transaction. Every fatal error releases the
/// stream and leaves the session closed.
pub struct Session<S: Read + Write> {
    stream: Option<S>,
    reader: ChunkReader,
    writer: ChunkWriter,
    state: SessionState,
    in_transaction: bool,
}

impl<S: Read + Write> Session<S> {
    /// Wrap a stream on which the Bolt handshake has already completed.
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            reader: ChunkReader::new(),
            writer: ChunkWriter::new(),
            state: SessionState::Handshook,
            in_transaction: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Authenticate with INIT.
    ///
    /// On a FAILURE the session is closed: an unauthorized code surfaces as
    /// [`DriverError::Auth`], anything else as a protocol error.
    pub fn init(&mut self, client_name: &str, auth: &AuthToken) -> DriverResult<()> {
        if self.state != SessionState::Handshook {
            return Err(DriverError::protocol("session is already initialized"));
        }
        debug!(client_name, "initializing session");
        self.send(&Request::init(
            client_name,
            &auth.scheme,
            &auth.principal,
            &auth.credentials,
        ))?;
        match self.receive()? {
            Response::Success(_) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Response::Failure(failure) => {
                let err = if failure.code == UNAUTHORIZED_CODE {
                    DriverError::Auth(failure.message)
                } else {
                    DriverError::protocol(format!("{}: {}", failure.code, failure.message))
                };
                Err(self.fail(err))
            }
            other => Err(self.fail(DriverError::protocol(format!(
                "unexpected {} in response to INIT",
                other.name()
            )))),
        }
    }

    /// Execute a statement and pull its whole result.
    ///
    /// RUN and PULL_ALL are pipelined: PULL_ALL goes out right after the RUN
    /// response is read, and the record stream is consumed up to, and never
    /// past, its terminating SUCCESS.
    pub fn run(
        &mut self,
        statement: &str,
        parameters: HashMap<String, Value>,
    ) -> DriverResult<QueryResult> {
        let fields = self.send_run(statement, parameters)?;

        self.state = SessionState::Streaming;
        self.send(&Request::PullAll)?;

        let mut records = Vec::new();
        let summary = loop {
            match self.receive()? {
                Response::Record(record) => {
                    if record.values.len() != fields.len() {
                        return Err(self.fail(DriverError::protocol(format!(
                            "record carries {} values for {} fields",
                            record.values.len(),
                            fields.len()
                        ))));
                    }
                    let values = record
                        .values
                        .into_iter()
                        .map(hydrate)
                        .collect::<DriverResult<Vec<_>>>();
                    match values {
                        Ok(values) => records.push(Record::new(fields.clone(), values)),
                        Err(err) => return Err(self.fail(err)),
                    }
                }
                Response::Success(success) => {
                    match ResultSummary::from_metadata(success.metadata) {
                        Ok(summary) => break summary,
                        Err(err) => return Err(self.fail(err)),
                    }
                }
                Response::Failure(failure) => return Err(self.recover(failure)),
                Response::Ignored => {
                    return Err(self.fail(DriverError::protocol(
                        "unexpected IGNORED in record stream",
                    )))
                }
            }
        };

        self.state = SessionState::Ready;
        Ok(QueryResult {
            fields,
            records,
            summary,
        })
    }

    /// Execute a statement and discard its result.
    ///
    /// Same pipelining as [`run`](Self::run), with DISCARD_ALL in place of
    /// PULL_ALL; only the summary comes back.
    pub fn execute(
        &mut self,
        statement: &str,
        parameters: HashMap<String, Value>,
    ) -> DriverResult<ResultSummary> {
        self.send_run(statement, parameters)?;

        self.state = SessionState::Streaming;
        self.send(&Request::DiscardAll)?;

        match self.receive()? {
            Response::Success(success) => match ResultSummary::from_metadata(success.metadata) {
                Ok(summary) => {
                    self.state = SessionState::Ready;
                    Ok(summary)
                }
                Err(err) => Err(self.fail(err)),
            },
            Response::Failure(failure) => Err(self.recover(failure)),
            other => Err(self.fail(DriverError::protocol(format!(
                "unexpected {} in response to DISCARD_ALL",
                other.name()
            )))),
        }
    }

    /// Open a transaction by running `BEGIN`.
    ///
    /// Fails without touching the wire when one is already open.
    pub fn begin(&mut self) -> DriverResult<()> {
        if self.in_transaction {
            return Err(DriverError::TransactionAlreadyOpen);
        }
        self.run("BEGIN", HashMap::new())?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commit the open transaction by running `COMMIT`.
    pub fn commit(&mut self) -> DriverResult<()> {
        self.end_transaction("COMMIT")
    }

    /// Roll back the open transaction by running `ROLLBACK`.
    pub fn rollback(&mut self) -> DriverResult<()> {
        self.end_transaction("ROLLBACK")
    }

    fn end_transaction(&mut self, statement: &str) -> DriverResult<()> {
        if !self.in_transaction {
            return Err(DriverError::protocol("no transaction is open"));
        }
        // Cleared before the statement goes out: a network error must not
        // leave the flag stranded open.
        self.in_transaction = false;
        self.run(statement, HashMap::new())?;
        Ok(())
    }

    /// Release the underlying stream. Closing is idempotent.
    pub fn close(&mut self) -> DriverResult<()> {
        if self.stream.take().is_some() {
            debug!("session closed");
        }
        self.state = SessionState::Closed;
        self.in_transaction = false;
        Ok(())
    }

    /// Send RUN and read its response, returning the announced field names.
    fn send_run(
        &mut self,
        statement: &str,
        parameters: HashMap<String, Value>,
    ) -> DriverResult<Vec<String>> {
        self.ensure_ready()?;
        let parameters = parameters
            .into_iter()
            .map(|(k, v)| Ok((k, PackStreamValue::try_from(v)?)))
            .collect::<DriverResult<HashMap<_, _>>>()?;

        debug!(statement, "running statement");
        self.send(&Request::run(statement, parameters))?;

        match self.receive()? {
            Response::Success(success) => match success.fields() {
                Ok(fields) => Ok(fields),
                Err(err) => Err(self.fail(err.into())),
            },
            Response::Failure(failure) => Err(self.recover(failure)),
            other => Err(self.fail(DriverError::protocol(format!(
                "unexpected {} in response to RUN",
                other.name()
            )))),
        }
    }

    fn ensure_ready(&self) -> DriverResult<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Handshook => Err(DriverError::protocol("session is not initialized")),
            SessionState::Closed => Err(DriverError::protocol("session is closed")),
            SessionState::Streaming | SessionState::Failed => {
                Err(DriverError::protocol("session is mid-request"))
            }
        }
    }

    /// Acknowledge a server failure and resynchronize.
    ///
    /// IGNORED responses to requests that raced the failure are drained; the
    /// acknowledgement itself must answer SUCCESS or the session is
    /// considered desynchronized and closes.
    fn ack_failure(&mut self) -> DriverResult<()> {
        trace!("acknowledging failure");
        self.send(&Request::AckFailure)?;
        loop {
            match self.receive()? {
                Response::Ignored => continue,
                Response::Success(_) => return Ok(()),
                other => {
                    return Err(self.fail(DriverError::protocol(format!(
                        "expected SUCCESS acknowledging failure, got {}",
                        other.name()
                    ))))
                }
            }
        }
    }

    /// Handle a FAILURE response: acknowledge it and surface the typed error.
    ///
    /// A recoverable server error returns the session to ready; anything
    /// else, including a failed acknowledgement, closes it.
    fn recover(&mut self, failure: FailureMessage) -> DriverError {
        self.state = SessionState::Failed;
        debug!(code = %failure.code, "server failure");
        let err = DriverError::from_failure(failure.code, failure.message);
        match self.ack_failure() {
            Ok(()) if !err.is_fatal() => {
                self.state = SessionState::Ready;
                err
            }
            Ok(()) => self.fail(err),
            Err(ack_err) => ack_err,
        }
    }

    fn send(&mut self, request: &Request) -> DriverResult<()> {
        trace!(message = request.name(), "send");
        let encoded = match encode(&PackStreamValue::Structure(request.to_structure())) {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.fail(err.into())),
        };

        let Self { stream, writer, .. } = self;
        let Some(stream) = stream.as_mut() else {
            return Err(DriverError::protocol("session is closed"));
        };
        let result = writer
            .write(stream, &encoded)
            .and_then(|_| writer.flush(stream, true));
        match result {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    fn receive(&mut self) -> DriverResult<Response> {
        let message = {
            let Self { stream, reader, .. } = self;
            let Some(stream) = stream.as_mut() else {
                return Err(DriverError::protocol("session is closed"));
            };
            reader.read_message(stream)
        };
        let message = match message {
            Ok(message) => message,
            Err(err) => return Err(self.fail(err.into())),
        };

        let structure = match decode(&message) {
            Ok(PackStreamValue::Structure(st)) => st,
            Ok(_) => {
                return Err(self.fail(DriverError::protocol("message is not a structure")))
            }
            Err(err) => return Err(self.fail(err.into())),
        };

        match Response::from_structure(structure) {
            Ok(response) => {
                trace!(message = response.name(), "receive");
                Ok(response)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Record an error against the session: fatal ones release the stream.
    fn fail(&mut self, err: DriverError) -> DriverError {
        if err.is_fatal() {
            self.stream = None;
            self.state = SessionState::Closed;
            self.in_transaction = false;
        }
        err
    }
}

impl<S: Read + Write> Drop for Session<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<S: Read + Write> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("in_transaction", &self.in_transaction)
            .finish()
    }
}

/// The fully pulled result of one statement.
#[derive(Debug)]
pub struct QueryResult {
    fields: Vec<String>,
    records: Vec<Record>,
    summary: ResultSummary,
}

impl QueryResult {
    /// Field names announced by the server.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// All records, in arrival order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Summary metadata from the terminating SUCCESS.
    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the result has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume into a record stream.
    pub fn into_stream(self) -> RecordStream {
        RecordStream::new(self.records)
    }
}

impl IntoIterator for QueryResult {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Summary metadata carried by the SUCCESS that terminates a result stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSummary {
    /// Statement type, e.g. `"r"` for a read
    pub query_type: Option<String>,
    /// Plan description, when the statement was EXPLAINed
    pub plan: Option<HashMap<String, Value>>,
    /// Profile description, when the statement was PROFILEd
    pub profile: Option<HashMap<String, Value>>,
}

impl ResultSummary {
    fn from_metadata(mut metadata: HashMap<String, PackStreamValue>) -> DriverResult<Self> {
        let query_type = match metadata.remove("type") {
            Some(PackStreamValue::String(s)) => Some(s),
            _ => None,
        };
        let plan = match metadata.remove("plan") {
            Some(PackStreamValue::Map(m)) => Some(hydrate_map(m)?),
            _ => None,
        };
        let profile = match metadata.remove("profile") {
            Some(PackStreamValue::Map(m)) => Some(hydrate_map(m)?),
            _ => None,
        };
        Ok(Self {
            query_type,
            plan,
            profile,
        })
    }
}
