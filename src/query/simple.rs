//! Simple query protocol: for zero-parameter commands (§4.3).
use crate::connection::Connection;
use crate::error::Result;
use crate::message::BackendMessage;
use crate::message::frontend;
use crate::result::{QueryResult, ResultList};

/// Run `sql` (possibly several `;`-separated statements) via the simple
/// query protocol. A server error mid-batch discards the in-progress
/// result and keeps draining to `ReadyForQuery`; it is recorded on
/// `connection.last_error()`, not returned as an `Err` (§7).
pub fn execute(connection: &mut Connection, sql: &str) -> Result<ResultList> {
    connection.send(frontend::Query { sql });
    connection.flush()?;

    let mut results = ResultList::new();
    let mut current: Option<QueryResult> = None;

    loop {
        match connection.recv(-1)? {
            BackendMessage::RowDescription(desc) => {
                let mut result = QueryResult::default();
                result.install_headers(desc.fields);
                current = Some(result);
            }
            BackendMessage::DataRow(row) => {
                if let Some(result) = current.as_mut() {
                    result.push_row(row.cells);
                }
            }
            BackendMessage::CommandComplete(cc) => {
                let mut result = current.take().unwrap_or_default();
                result.finish(cc.tag);
                results.push(result);
            }
            BackendMessage::ErrorResponse(err) => {
                current = None;
                connection.record_server_error(err.into_db_error());
            }
            BackendMessage::NoticeResponse(notice) => {
                crate::warn!("NoticeResponse: {:?}", notice.body);
            }
            BackendMessage::ReadyForQuery(_) => break,
            other => return Err(crate::error::Error::UnrecognizedServerMessage(other.msgtype())),
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    use super::*;
    use crate::connection::Connection;
    use crate::test_support::*;

    /// Spawn a loopback pair and have the "server" side write `reply`
    /// once a client connects, then return the client-side `Connection`
    /// (already `Open`, skipping the handshake).
    fn fake_server(reply: Vec<u8>) -> Connection {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            // drain whatever the client sends before replying, matching a
            // real server's read-then-respond cadence.
            let mut scratch = [0u8; 1024];
            let _ = server.set_read_timeout(Some(std::time::Duration::from_millis(50)));
            let _ = std::io::Read::read(&mut server, &mut scratch);
            server.write_all(&reply).unwrap();
        });
        let client = TcpStream::connect(addr).unwrap();
        Connection::test_open(client)
    }

    #[test]
    fn select_two_rows_assembles_one_result() {
        let row_desc = row_description(&[field("id", 23, -1), field("name", 25, -1)]);
        let row_a = data_row(&[Some(b"1"), Some(b"a")]);
        let row_b = data_row(&[Some(b"2"), Some(b"b")]);
        let complete = command_complete("SELECT 2");
        let ready = ready_for_query(b'I');

        let mut reply = Vec::new();
        reply.extend(frame(b'T', row_desc));
        reply.extend(frame(b'D', row_a));
        reply.extend(frame(b'D', row_b));
        reply.extend(frame(b'C', complete));
        reply.extend(frame(b'Z', ready));

        let mut conn = fake_server(reply);
        let results = execute(&mut conn, "select id, name from t").unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.command_type, crate::result::CommandType::Select);
        assert_eq!(result.affected_rows, 2);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.render_cell(0, 0), "1");
        assert_eq!(result.render_cell(0, 1), "a");
        assert_eq!(result.render_cell(1, 0), "2");
        assert_eq!(result.render_cell(1, 1), "b");
    }

    #[test]
    fn null_cell_renders_as_null() {
        let row_desc = row_description(&[field("v", 23, -1)]);
        let row = data_row(&[None]);
        let complete = command_complete("SELECT 1");
        let ready = ready_for_query(b'I');

        let mut reply = Vec::new();
        reply.extend(frame(b'T', row_desc));
        reply.extend(frame(b'D', row));
        reply.extend(frame(b'C', complete));
        reply.extend(frame(b'Z', ready));

        let mut conn = fake_server(reply);
        let results = execute(&mut conn, "select v from t").unwrap();

        assert_eq!(results[0].rows[0][0], None);
        assert_eq!(results[0].render_cell(0, 0), "NULL");
    }

    #[test]
    fn error_mid_query_drains_to_ready_and_records_last_error() {
        let err = error_response(&[(b'S', "ERROR"), (b'C', "42601"), (b'M', "syntax error")]);
        let ready = ready_for_query(b'I');

        let mut reply = Vec::new();
        reply.extend(frame(b'E', err));
        reply.extend(frame(b'Z', ready));

        let mut conn = fake_server(reply);
        let results = execute(&mut conn, "select syntax error").unwrap();

        assert!(results.is_empty());
        let last_error = conn.last_error().unwrap();
        assert_eq!(last_error.sqlstate.as_deref(), Some("42601"));
    }
}
