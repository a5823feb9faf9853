use std::{env, net::SocketAddr, time::Duration};

use anyhow::{Context, bail};
use sqlx::postgres::PgConnectOptions;

const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Builds structured connect options so credentials never pass through a URL.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.username)
            .password(&self.password)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
    pub run_migrations: bool,
    pub otlp_enabled: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let (host, port) = split_host_port(&required("USER_DATABASE_HOST")?)?;

        let database = DatabaseConfig {
            host,
            port,
            name: required("USER_DATABASE_NAME")?,
            username: required("USER_DATABASE_USERNAME")?,
            password: required("USER_DATABASE_PASSWORD")?,
            max_connections: optional("USER_DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            acquire_timeout: Duration::from_secs(optional(
                "USER_DATABASE_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?),
        };

        let bind_addr = env::var("USER_API_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("USER_API_BIND_ADDR is not a valid socket address")?;

        Ok(Self {
            database,
            bind_addr,
            run_migrations: optional("USER_API_RUN_MIGRATIONS", true)?,
            otlp_enabled: env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some(),
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Accepts `host` or `host:port`, the way the database host has always been configured.
fn split_host_port(raw: &str) -> anyhow::Result<(String, u16)> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("USER_DATABASE_HOST must not be empty");
    }

    match raw.rsplit_once(':') {
        // Bare IPv6 addresses contain colons too; only split when the tail is a port.
        Some((host, port)) if !host.is_empty() && !host.contains(':') => {
            let port = port
                .parse()
                .with_context(|| format!("invalid port in USER_DATABASE_HOST: {port:?}"))?;
            Ok((host.to_string(), port))
        }
        _ => Ok((raw.to_string(), DEFAULT_PG_PORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_without_port_uses_default() {
        let (host, port) = split_host_port("db.internal").unwrap();
        assert_eq!(host, "db.internal");
        assert_eq!(port, DEFAULT_PG_PORT);
    }

    #[test]
    fn host_with_port_is_split() {
        let (host, port) = split_host_port("localhost:6543").unwrap();
        assert_eq!(host, "localhost");
        assert_eq!(port, 6543);
    }

    #[test]
    fn bare_ipv6_is_not_split() {
        let (host, port) = split_host_port("::1").unwrap();
        assert_eq!(host, "::1");
        assert_eq!(port, DEFAULT_PG_PORT);
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(split_host_port("localhost:abc").is_err());
        assert!(split_host_port("   ").is_err());
    }

    #[test]
    fn connect_options_carry_credentials_verbatim() {
        let config = DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            name: "users".into(),
            username: "api".into(),
            password: "p@ss/w:rd?&=".into(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(1),
        };
        let options = config.connect_options();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("users"));
        assert_eq!(options.get_username(), "api");
    }
}
