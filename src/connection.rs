//! Connection state machine: opening, authentication, and the
//! parameter-status / backend-key bookkeeping that follows it (§4.2).
use std::io::Write;
use std::net::TcpStream;

use bytes::BytesMut;

use crate::config::ConnectionParams;
use crate::error::{DatabaseError, Error, Result};
use crate::frame;
use crate::message::backend::Authentication;
use crate::message::{BackendMessage, FrontendProtocol, frontend};

mod auth;

const AUTH_FRAME_TIMEOUT_MS: i64 = 5_000;
const STARTUP_FRAME_TIMEOUT_MS: i64 = 15_000;

/// A [`Connection`]'s protocol state. Transitions only move forward except
/// into `Failed`, which is terminal like `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Closed,
    Opening,
    AuthenticationPending,
    Open,
    Failed,
}

type PasswordCallback = Box<dyn FnMut(&Connection) -> Option<String>>;

/// Owns a TCP socket speaking the PostgreSQL v3 protocol. Not shareable
/// across concurrent callers (§5): all operations take `&mut self` and
/// block the calling thread.
pub struct Connection {
    socket: TcpStream,
    write_buf: BytesMut,
    status: Status,
    params: ConnectionParams,
    backend_key_data: Option<(i32, i32)>,
    runtime_parameters: Vec<(String, String)>,
    last_error: Option<DatabaseError>,
    password_callback: Option<PasswordCallback>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("status", &self.status)
            .field("backend_key_data", &self.backend_key_data)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connect and run the startup/authentication handshake to completion,
    /// using `params.password` if set. Returns [`Error::AuthenticationNeeded`]
    /// if the server asks for a password and none was given.
    pub fn connect(params: ConnectionParams) -> Result<Self> {
        Self::connect_with(params, None)
    }

    /// Like [`connect`][Self::connect], but invokes `callback` once if the
    /// server asks for a password and `params.password` is unset. Returning
    /// `Some` installs the password and authentication continues; `None`
    /// surfaces [`Error::AuthenticationNeeded`] (§9 "Password callback").
    pub fn connect_with_password_callback(
        params: ConnectionParams,
        callback: impl FnMut(&Connection) -> Option<String> + 'static,
    ) -> Result<Self> {
        Self::connect_with(params, Some(Box::new(callback)))
    }

    fn connect_with(params: ConnectionParams, password_callback: Option<PasswordCallback>) -> Result<Self> {
        let socket = TcpStream::connect((params.hostname.as_str(), params.port))
            .map_err(Error::InvalidHost)?;
        socket.set_nodelay(true).ok();

        let mut conn = Connection {
            socket,
            write_buf: BytesMut::with_capacity(1024),
            status: Status::Opening,
            params,
            backend_key_data: None,
            runtime_parameters: Vec::new(),
            last_error: None,
            password_callback,
        };

        conn.send_startup()?;
        conn.authenticate()?;
        conn.startup_wait()?;
        Ok(conn)
    }

    fn send_startup(&mut self) -> Result<()> {
        let mut buf = BytesMut::new();
        frontend::Startup {
            user: &self.params.username,
            database: Some(&self.params.database),
            application_name: Some(&self.params.application_name),
        }
        .write(&mut buf);

        crate::trace!("(F) Startup {{ user: {:?} }}", self.params.username);
        match self.socket.write_all(&buf) {
            Ok(()) => Ok(()),
            Err(io_err) => {
                self.last_error = Some(DatabaseError::io_error(&io_err));
                Err(Error::CannotSendStartup(io_err))
            }
        }
    }

    fn authenticate(&mut self) -> Result<()> {
        loop {
            match self.read_frame(AUTH_FRAME_TIMEOUT_MS)? {
                BackendMessage::Authentication(Authentication::Ok) => break,
                BackendMessage::Authentication(Authentication::MD5Password { salt }) => {
                    self.status = Status::AuthenticationPending;

                    let password = match self.params.password.clone() {
                        Some(password) => password,
                        None => match self.take_password_from_callback() {
                            Some(password) => password,
                            None => return Err(Error::AuthenticationNeeded),
                        },
                    };
                    self.params.password = Some(password.clone());

                    let challenge = auth::md5_challenge(&password, &self.params.username, salt);
                    self.send(frontend::PasswordMessage { password: &challenge });
                    self.flush()?;
                }
                BackendMessage::ErrorResponse(err) => {
                    return Err(self.fail_auth(err.into_db_error()));
                }
                other => {
                    let msg = format!("unexpected message type {:?} during authentication", other.msgtype() as char);
                    return Err(self.fail_auth(DatabaseError::auth_failed(msg)));
                }
            }
        }
        Ok(())
    }

    fn take_password_from_callback(&mut self) -> Option<String> {
        let mut callback = self.password_callback.take()?;
        let result = callback(self);
        self.password_callback = Some(callback);
        result
    }

    fn fail_auth(&mut self, err: DatabaseError) -> Error {
        self.last_error = Some(err.clone());
        self.status = Status::Failed;
        Error::AuthenticationFailed(Box::new(err))
    }

    fn startup_wait(&mut self) -> Result<()> {
        loop {
            match self.read_frame(STARTUP_FRAME_TIMEOUT_MS)? {
                BackendMessage::ReadyForQuery(_) => break,
                BackendMessage::BackendKeyData(data) => {
                    self.backend_key_data = Some((data.process_id, data.secret_key));
                }
                BackendMessage::ParameterStatus(status) => {
                    self.upsert_parameter(status.name, status.value);
                }
                BackendMessage::NoticeResponse(notice) => {
                    crate::warn!("NoticeResponse during startup: {:?}", notice.body);
                }
                BackendMessage::ErrorResponse(err) => {
                    let err = err.into_db_error();
                    self.last_error = Some(err.clone());
                    self.status = Status::Failed;
                    return Err(Error::ServerError(err));
                }
                other => return Err(Error::UnrecognizedServerMessage(other.msgtype())),
            }
        }
        self.status = Status::Open;
        Ok(())
    }

    fn upsert_parameter(&mut self, name: String, value: String) {
        match self.runtime_parameters.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.runtime_parameters.push((name, value)),
        }
    }

    /// The last server-reported or synthesized error recorded against this
    /// connection, if any.
    pub fn last_error(&self) -> Option<&DatabaseError> {
        self.last_error.as_ref()
    }

    /// A server-reported run-time parameter, e.g. `server_version`.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.runtime_parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The backend process id and secret key, needed to build a
    /// `CancelRequest` on a second connection. This core does not expose
    /// cancellation itself (§5).
    pub fn backend_key_data(&self) -> Option<(i32, i32)> {
        self.backend_key_data
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Block for up to `timeout_ms` milliseconds (`-1` ⇒ forever) for the
    /// socket to have readable bytes.
    pub fn poll(&self, timeout_ms: i64) -> Result<bool> {
        Ok(frame::poll(&self.socket, timeout_ms)?)
    }

    /// Send `Sync` and, if `read_response` is set, block until
    /// `ReadyForQuery` (§4.2). Standalone counterpart to the `Sync` the
    /// extended query pipeline already pipelines as its last frame —
    /// useful for flushing the pipeline outside of a `Query` (e.g. after a
    /// caller-issued `Parse`/`Bind` sequence of its own).
    pub fn sync(&mut self, read_response: bool) -> Result<()> {
        self.require_open()?;
        self.send(frontend::Sync);
        self.flush()?;

        if read_response {
            loop {
                if let BackendMessage::ReadyForQuery(_) = self.recv(-1)? {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Best-effort `Terminate` then close the socket. Idempotent; safe to
    /// call from any state.
    pub fn close(mut self) -> Result<()> {
        if matches!(self.status, Status::Open | Status::AuthenticationPending) {
            self.send(frontend::Terminate);
            let _ = self.flush();
        }
        self.status = Status::Closed;
        let _ = self.socket.shutdown(std::net::Shutdown::Both);
        Ok(())
    }

    /// Read one frame, recording a synthetic `IoError` (§4.2, §7) into
    /// `last_error` if the read fails or times out.
    fn read_frame(&mut self, timeout_ms: i64) -> Result<BackendMessage> {
        match frame::read_message(&mut self.socket, timeout_ms) {
            Ok(message) => Ok(message),
            Err(err) => {
                if let Error::Io(io_err) = &err {
                    self.last_error = Some(DatabaseError::io_error(io_err));
                }
                Err(err)
            }
        }
    }
}

/// Internal transport operations used by [`crate::query`].
impl Connection {
    pub(crate) fn send<F: FrontendProtocol>(&mut self, message: F) {
        frontend::write(message, &mut self.write_buf);
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        match self.socket.write_all(&self.write_buf) {
            Ok(()) => {
                self.write_buf.clear();
                Ok(())
            }
            Err(io_err) => {
                self.last_error = Some(DatabaseError::io_error(&io_err));
                Err(Error::Io(io_err))
            }
        }
    }

    pub(crate) fn recv(&mut self, timeout_ms: i64) -> Result<BackendMessage> {
        self.read_frame(timeout_ms)
    }

    pub(crate) fn record_server_error(&mut self, err: DatabaseError) {
        self.last_error = Some(err);
    }

    pub(crate) fn require_open(&self) -> Result<()> {
        if self.status != Status::Open {
            return Err(Error::NotOpen);
        }
        Ok(())
    }
}

#[cfg(test)]
impl Connection {
    /// Build an already-`Open` connection directly from a socket, skipping
    /// the startup/authentication handshake. Used by `query`'s loopback
    /// tests, which drive the pipeline against a fake server thread.
    pub(crate) fn test_open(socket: TcpStream) -> Connection {
        Connection {
            socket,
            write_buf: BytesMut::with_capacity(1024),
            status: Status::Open,
            params: ConnectionParams::new("localhost", "db"),
            backend_key_data: None,
            runtime_parameters: Vec::new(),
            last_error: None,
            password_callback: None,
        }
    }
}
