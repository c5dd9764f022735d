//! # Driver Module
//!
//! The user-facing API: driver factory, sessions, records and values.
//!
//! ## Core Types
//!
//! - [`Driver`] - factory that opens authenticated sessions
//! - [`Session`] - one sequential request/response conversation
//! - [`QueryResult`] / [`Record`] - fully pulled statement results
//! - [`Value`] - the domain value tree, including graph entities
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neobolt::{AuthToken, Driver};
//! use std::collections::HashMap;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Driver::new("bolt://localhost:7687", AuthToken::basic("neo4j", "secret"))?;
//! let mut session = driver.session()?;
//!
//! let result = session.run("MATCH (n) RETURN n LIMIT 10", HashMap::new())?;
//! for record in result {
//!     println!("{}", record);
//! }
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Transactions
//!
//! `BEGIN`, `COMMIT` and `ROLLBACK` are ordinary statements; the session
//! tracks at most one open transaction:
//!
//! ```rust,no_run
//! # use neobolt::{AuthToken, Driver, params};
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let driver = Driver::new("bolt://localhost:7687", AuthToken::basic("u", "p"))?;
//! let mut session = driver.session()?;
//! session.begin()?;
//! session.run("CREATE (n:Person {name: {0}})", params!("0" => "Alice"))?;
//! session.commit()?;
//! # Ok(())
//! # }
//! ```

mod driver;
mod error;
mod hydrate;
mod record;
mod session;
mod types;

pub use driver::{
    negotiate, positional_params, AuthToken, Driver, ServerAddress, CLIENT_NAME,
    DEFAULT_BOLT_PORT,
};
pub use error::{DriverError, DriverResult, UNAUTHORIZED_CODE};
pub use hydrate::hydrate;
pub use record::{Record, RecordStream};
pub use session::{QueryResult, ResultSummary, Session, SessionState};
pub use types::{Node, Path, Relationship, UnboundRelationship, Value};

/// Build a parameter map for [`Session::run`].
///
/// ```rust
/// use neobolt::params;
///
/// let params = params!("0" => "Alice", "1" => 30);
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        std::collections::HashMap::<String, $crate::Value>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), $crate::Value::from($value));
        )+
        map
    }};
}
