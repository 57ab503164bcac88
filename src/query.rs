//! One-shot query execution: command text plus bound parameters, routed
//! to the simple or extended pipeline by parameter count (§4.3).
use crate::connection::Connection;
use crate::error::Result;
use crate::parameter::Parameter;
use crate::result::ResultList;

mod extended;
mod simple;

/// A single command plus its bound parameters, borrowing the `Connection`
/// it will run against. Its lifetime cannot outlive that borrow.
pub struct Query<'conn> {
    connection: &'conn mut Connection,
    sql: String,
    parameters: Vec<Parameter>,
}

impl<'conn> Query<'conn> {
    pub fn new(connection: &'conn mut Connection, sql: impl Into<String>) -> Self {
        Self {
            connection,
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a bound parameter. Any query with one or more parameters
    /// uses the extended pipeline (§4.3).
    pub fn bind(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Run the command to completion and collect its results.
    pub fn execute(self) -> Result<ResultList> {
        self.connection.require_open()?;

        if self.parameters.is_empty() {
            simple::execute(self.connection, &self.sql)
        } else {
            extended::execute(self.connection, &self.sql, &self.parameters)
        }
    }
}
