//! Extended query protocol: for commands with one or more parameters.
//!
//! Pipelines `Parse`/`Bind`/`Describe`/`Execute`/`Close`(portal)/`Close`
//! (statement)/`Sync` in one flush, then drains replies (§4.3). The
//! portal and statement are always the anonymous ones and both are
//! closed before `Sync`, so the pipeline always yields exactly one
//! [`QueryResult`] and precludes prepared-statement reuse by design
//! (§9 open question — not generalized here).
use crate::connection::Connection;
use crate::error::Result;
use crate::message::BackendMessage;
use crate::message::frontend;
use crate::parameter::Parameter;
use crate::result::{QueryResult, ResultList};

pub fn execute(connection: &mut Connection, sql: &str, parameters: &[Parameter]) -> Result<ResultList> {
    let param_oids: Vec<u32> = parameters.iter().map(|p| p.type_oid).collect();
    let bind_params: Vec<Option<&[u8]>> = parameters.iter().map(Parameter::as_bind_param).collect();

    connection.send(frontend::Parse {
        sql,
        param_oids: &param_oids,
    });
    connection.send(frontend::Bind {
        params: &bind_params,
    });
    connection.send(frontend::DescribePortal);
    connection.send(frontend::Execute);
    connection.send(frontend::Close { variant: b'P' });
    connection.send(frontend::Close { variant: b'S' });
    connection.send(frontend::Sync);
    connection.flush()?;

    let mut result = QueryResult::default();
    let mut result_dropped = false;

    loop {
        match connection.recv(-1)? {
            BackendMessage::RowDescription(desc) => {
                if !result_dropped {
                    result.install_headers(desc.fields);
                }
            }
            BackendMessage::DataRow(row) => {
                if !result_dropped {
                    result.push_row(row.cells);
                }
            }
            BackendMessage::CommandComplete(cc) => {
                if !result_dropped {
                    result.finish(cc.tag);
                }
            }
            BackendMessage::ParseComplete(_) | BackendMessage::BindComplete(_) | BackendMessage::CloseComplete(_) => {}
            BackendMessage::ErrorResponse(err) => {
                result_dropped = true;
                connection.record_server_error(err.into_db_error());
            }
            BackendMessage::NoticeResponse(notice) => {
                crate::warn!("NoticeResponse: {:?}", notice.body);
            }
            BackendMessage::ReadyForQuery(_) => break,
            other => return Err(crate::error::Error::UnrecognizedServerMessage(other.msgtype())),
        }
    }

    let mut results = ResultList::new();
    if !result_dropped {
        results.push(result);
    }
    Ok(results)
}
