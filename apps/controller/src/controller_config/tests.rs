use std::collections::HashMap;
use std::time::Duration;

use leaderhook_core::{AppError, AppResult};
use leaderhook_domain::NotificationScheme;

use super::{ControllerConfig, DestinationConfig};

fn load(vars: &[(&str, &str)]) -> AppResult<ControllerConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    ControllerConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_discover_daemon_set_pods() {
    let config = load(&[]).unwrap_or_else(|error| panic!("defaults must load: {error}"));

    assert_eq!(config.endpoint.to_string(), "0.0.0.0:8080");
    assert_eq!(config.lease_name.as_str(), "plndr-cp-lock");
    assert_eq!(config.namespace.as_str(), "kube-system");
    assert_eq!(
        config.destination,
        DestinationConfig::DaemonSet("kube-vip-cp-change-lease".to_owned())
    );
    assert_eq!(config.notification_endpoint.scheme(), NotificationScheme::Http);
    assert_eq!(config.notification_endpoint.port(), 8080);
    assert_eq!(config.notification_endpoint.path(), "/leader");
    assert_eq!(config.resolve_retry_interval, Duration::from_secs(5));
    assert_eq!(config.notify_retry_interval, Duration::from_secs(2));
    assert_eq!(config.notify_timeout, Duration::from_secs(10));
}

#[test]
fn service_host_takes_precedence() {
    let config = load(&[
        ("SERVICE_HOST", "leader-hook.kube-system.svc"),
        ("DAEMONSET_NAME", "agent"),
        ("SEND_REQUEST_HTTPS", "true"),
        ("SEND_REQUEST_PORT", "8443"),
        ("SEND_REQUEST_PATH", "switch"),
        ("ENDPOINT", ":9090"),
    ])
    .unwrap_or_else(|error| panic!("config must load: {error}"));

    assert_eq!(
        config.destination,
        DestinationConfig::ServiceHost("leader-hook.kube-system.svc".to_owned())
    );
    assert_eq!(config.notification_endpoint.scheme(), NotificationScheme::Https);
    assert_eq!(config.notification_endpoint.port(), 8443);
    assert_eq!(config.notification_endpoint.path(), "/switch");
    assert_eq!(config.endpoint.to_string(), "0.0.0.0:9090");
}

#[test]
fn service_host_must_be_a_bare_host() {
    for host in [
        "leader-hook.kube-system.svc:8080",
        "leader-hook.kube-system.svc/leader",
        "bad host",
    ] {
        let result = load(&[("SERVICE_HOST", host)]);
        assert!(
            matches!(result, Err(AppError::Configuration(_))),
            "expected configuration error for {host}"
        );
    }
}

#[test]
fn service_host_accepts_ip_addresses() {
    for (host, expected) in [
        ("10.96.0.15", "http://10.96.0.15:8080/leader"),
        ("fd00::15", "http://[fd00::15]:8080/leader"),
    ] {
        let config = load(&[("SERVICE_HOST", host)])
            .unwrap_or_else(|error| panic!("config must load for {host}: {error}"));
        assert_eq!(config.notification_endpoint.url_for(host), expected);
    }
}

#[test]
fn missing_destination_is_rejected() {
    let result = load(&[("SERVICE_HOST", ""), ("DAEMONSET_NAME", " ")]);

    assert!(matches!(result, Err(AppError::Configuration(_))));
}

#[test]
fn invalid_values_are_rejected() {
    for vars in [
        [("SEND_REQUEST_HTTPS", "yes")],
        [("SEND_REQUEST_PORT", "http")],
        [("SEND_REQUEST_PORT", "0")],
        [("NOTIFY_RETRY_INTERVAL_MS", "0")],
        [("RESOLVE_RETRY_INTERVAL_MS", "-5")],
        [("ENDPOINT", "localhost")],
        [("KUBE_VIP_LEASE_NAME", "  ")],
    ] {
        let result = load(&vars);
        assert!(
            matches!(result, Err(AppError::Configuration(_))),
            "expected configuration error for {vars:?}"
        );
    }
}
