use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use leaderhook_core::{AppError, AppResult, NonEmptyString};
use leaderhook_domain::{NotificationEndpoint, NotificationScheme};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Where holder notifications are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationConfig {
    /// Fixed host, no discovery.
    ServiceHost(String),
    /// Pod of this DaemonSet on the holder's node.
    DaemonSet(String),
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub endpoint: SocketAddr,
    pub lease_name: NonEmptyString,
    pub namespace: NonEmptyString,
    pub destination: DestinationConfig,
    pub notification_endpoint: NotificationEndpoint,
    pub resolve_retry_interval: Duration,
    pub notify_retry_interval: Duration,
    pub notify_timeout: Duration,
}

impl ControllerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };

        let endpoint = parse_endpoint(env.string("ENDPOINT", "0.0.0.0:8080").as_str())?;
        let lease_name = env.non_empty("KUBE_VIP_LEASE_NAME", "plndr-cp-lock")?;
        let namespace = env.non_empty("NAMESPACE", "kube-system")?;

        let service_host = env.string("SERVICE_HOST", "").trim().to_owned();
        let daemon_set_name = env
            .string("DAEMONSET_NAME", "kube-vip-cp-change-lease")
            .trim()
            .to_owned();
        let destination = if !service_host.is_empty() {
            DestinationConfig::ServiceHost(service_host)
        } else if !daemon_set_name.is_empty() {
            DestinationConfig::DaemonSet(daemon_set_name)
        } else {
            return Err(AppError::Configuration(
                "one of SERVICE_HOST or DAEMONSET_NAME must be set".to_owned(),
            ));
        };

        let notification_endpoint = NotificationEndpoint::new(
            NotificationScheme::from_https(env.bool("SEND_REQUEST_HTTPS", false)?),
            env.parse::<u16>("SEND_REQUEST_PORT", 8080)?,
            env.string("SEND_REQUEST_PATH", "/leader"),
        )
        .map_err(|error| AppError::Configuration(error.to_string()))?;

        if let DestinationConfig::ServiceHost(host) = &destination {
            validate_service_host(host, &notification_endpoint)?;
        }

        Ok(Self {
            endpoint,
            lease_name,
            namespace,
            destination,
            notification_endpoint,
            resolve_retry_interval: env.interval_ms("RESOLVE_RETRY_INTERVAL_MS", 5_000)?,
            notify_retry_interval: env.interval_ms("NOTIFY_RETRY_INTERVAL_MS", 2_000)?,
            notify_timeout: env.interval_ms("NOTIFY_TIMEOUT_MS", 10_000)?,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str, default: &str) -> String {
        (self.lookup)(name).unwrap_or_else(|| default.to_owned())
    }

    fn non_empty(&self, name: &str, default: &str) -> AppResult<NonEmptyString> {
        NonEmptyString::new(self.string(name, default))
            .map_err(|_| AppError::Configuration(format!("{name} must not be empty")))
    }

    fn parse<T>(&self, name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(name) {
            Some(value) => value.trim().parse::<T>().map_err(|error| {
                AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
            }),
            None => Ok(default),
        }
    }

    fn bool(&self, name: &str, default: bool) -> AppResult<bool> {
        let Some(value) = (self.lookup)(name) else {
            return Ok(default);
        };

        match value.trim() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            other => Err(AppError::Configuration(format!(
                "invalid {name} value '{other}': expected a boolean"
            ))),
        }
    }

    fn interval_ms(&self, name: &str, default: u64) -> AppResult<Duration> {
        let millis = self.parse::<u64>(name, default)?;
        if millis == 0 {
            return Err(AppError::Configuration(format!(
                "{name} must be greater than zero"
            )));
        }

        Ok(Duration::from_millis(millis))
    }
}

/// The host must yield a URL that still targets the configured port.
fn validate_service_host(host: &str, endpoint: &NotificationEndpoint) -> AppResult<()> {
    let raw = endpoint.url_for(host);
    let url = Url::parse(raw.as_str()).map_err(|error| {
        AppError::Configuration(format!("invalid SERVICE_HOST value '{host}': {error}"))
    })?;

    if url.port_or_known_default() != Some(endpoint.port()) {
        return Err(AppError::Configuration(format!(
            "invalid SERVICE_HOST value '{host}': expected a bare host name or IP address"
        )));
    }

    Ok(())
}

/// Accepts `host:port` and the short `:port` form.
fn parse_endpoint(value: &str) -> AppResult<SocketAddr> {
    let value = value.trim();
    let normalized = if value.starts_with(':') {
        format!("0.0.0.0{value}")
    } else {
        value.to_owned()
    };

    normalized.parse::<SocketAddr>().map_err(|error| {
        AppError::Configuration(format!("invalid ENDPOINT value '{value}': {error}"))
    })
}

#[cfg(test)]
mod tests;
