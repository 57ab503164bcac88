//! Connection parameters (§3, §6).
use std::env;

/// Immutable bundle of connection parameters, cloned into a [`crate::Connection`]
/// on construction — mirrors `px_connection_params_copy`'s deep-copy semantics.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
    pub application_name: String,
}

impl ConnectionParams {
    /// Start from `hostname`/`database` with every other field defaulted:
    /// port `5432`, username from `$PGUSER` then `$USER`, application name
    /// `"libpx"`, no password. Defaults are applied here, at the calling
    /// layer, not inside the wire-protocol core (§6).
    pub fn new(hostname: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: 5432,
            database: database.into(),
            username: default_username(),
            password: None,
            application_name: "libpx".into(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn application_name(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = application_name.into();
        self
    }
}

fn default_username() -> String {
    env::var("PGUSER")
        .or_else(|_| env::var("USER"))
        .unwrap_or_else(|_| "postgres".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_port_and_application_name() {
        let params = ConnectionParams::new("localhost", "db");
        assert_eq!(params.port, 5432);
        assert_eq!(params.application_name, "libpx");
        assert!(params.password.is_none());
    }

    #[test]
    fn builder_overrides_stick() {
        let params = ConnectionParams::new("localhost", "db")
            .port(6543)
            .username("alice")
            .password("secret")
            .application_name("myapp");
        assert_eq!(params.port, 6543);
        assert_eq!(params.username, "alice");
        assert_eq!(params.password.as_deref(), Some("secret"));
        assert_eq!(params.application_name, "myapp");
    }
}
