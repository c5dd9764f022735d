//! # neobolt
//!
//! A synchronous client for graph databases speaking the Bolt v1 protocol.
//!
//! ## Features
//!
//! - **Bolt v1** - handshake, authentication, and the RUN / PULL_ALL
//!   request cycle over plain TCP
//! - **PackStream** - full codec for the self-describing binary value format
//! - **Graph entities** - nodes, relationships and paths hydrated into typed
//!   values, including path reconstruction
//! - **Transactions** - `BEGIN` / `COMMIT` / `ROLLBACK` with at-most-one
//!   open transaction per session
//!
//! Sessions are strictly sequential and blocking: one request/response
//! conversation per socket, timeouts enforced by the caller-supplied stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neobolt::{AuthToken, Driver, params};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = Driver::new(
//!         "bolt://localhost:7687",
//!         AuthToken::basic("neo4j", "secret"),
//!     )?;
//!
//!     let mut session = driver.session()?;
//!
//!     let result = session.run(
//!         "CREATE (n:Person {name: {0}}) RETURN n",
//!         params!("0" => "Alice"),
//!     )?;
//!     for record in result {
//!         let node = record.get_node("n")?;
//!         println!("created {} with labels {:?}", node.id, node.labels);
//!     }
//!
//!     session.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Positional parameters
//!
//! Statements use `{0}`, `{1}`, ... placeholders; an ordered argument list
//! converts with [`positional_params`]:
//!
//! ```rust,no_run
//! # use neobolt::{AuthToken, Driver, Value, positional_params};
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let driver = Driver::new("bolt://localhost:7687", AuthToken::basic("u", "p"))?;
//! # let mut session = driver.session()?;
//! let args = vec![Value::from("Alice"), Value::from(30)];
//! session.run("CREATE (n:Person {name: {0}, age: {1}})", positional_params(args))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`driver`] - the user-facing API
//! - [`bolt`] - the protocol engine underneath

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bolt;
pub mod driver;

pub use driver::{
    hydrate, negotiate, positional_params, AuthToken, Driver, DriverError, DriverResult, Node,
    Path, QueryResult, Record, RecordStream, Relationship, ResultSummary, ServerAddress, Session,
    SessionState, UnboundRelationship, Value,
};
