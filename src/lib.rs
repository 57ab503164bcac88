//! A synchronous client core for the PostgreSQL v3 frontend/backend wire
//! protocol: session establishment, trust/MD5 authentication, parameterized
//! query execution, and tabular reply decoding.
//!
//! Out of scope: TLS/GSSAPI transports, the COPY protocol, async
//! notifications (`NOTIFY`/`LISTEN`), binary result decoding, connection
//! pooling, prepared-statement reuse across queries, and SCRAM
//! authentication.
//!
//! ```no_run
//! use libpx::{Connection, ConnectionParams, Query};
//!
//! # fn main() -> libpx::Result<()> {
//! let params = ConnectionParams::new("localhost", "postgres").password("secret");
//! let mut conn = Connection::connect(params)?;
//! let results = Query::new(&mut conn, "select 1").execute()?;
//! # let _ = results;
//! # Ok(())
//! # }
//! ```

mod common;
mod config;
mod connection;
mod ext;
mod frame;
mod message;
mod parameter;
mod query;
mod result;
mod types;

mod error;

#[cfg(test)]
mod test_support;

pub(crate) use common::{trace, warn};

pub use config::ConnectionParams;
pub use connection::{Connection, Status};
pub use error::{DatabaseError, Error, Result};
pub use parameter::Parameter;
pub use query::Query;
pub use result::{ColumnDescriptor, CommandType, QueryResult, ResultList};
