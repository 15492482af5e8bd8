use std::net::Ipv6Addr;

use leaderhook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// URL scheme used for holder notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationScheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl NotificationScheme {
    /// Returns the scheme for the given TLS flag.
    #[must_use]
    pub fn from_https(https: bool) -> Self {
        if https { Self::Https } else { Self::Http }
    }

    /// Returns the URL scheme value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Port and path where companion processes accept holder notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEndpoint {
    scheme: NotificationScheme,
    port: u16,
    path: String,
}

impl NotificationEndpoint {
    /// Creates a validated endpoint. A missing leading slash is added to `path`.
    pub fn new(scheme: NotificationScheme, port: u16, path: impl Into<String>) -> AppResult<Self> {
        if port == 0 {
            return Err(AppError::Validation(
                "notification port must be greater than zero".to_owned(),
            ));
        }

        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Ok(Self { scheme, port, path })
    }

    /// Returns the configured scheme.
    #[must_use]
    pub fn scheme(&self) -> NotificationScheme {
        self.scheme
    }

    /// Returns the configured port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the configured path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Builds the destination URL for one resolved address.
    #[must_use]
    pub fn url_for(&self, address: &str) -> String {
        let host = if address.parse::<Ipv6Addr>().is_ok() {
            format!("[{address}]")
        } else {
            address.to_owned()
        };

        format!(
            "{}://{host}:{}{}",
            self.scheme.as_str(),
            self.port,
            self.path
        )
    }
}

/// Resolved destination for one pending notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    address: String,
    holder_identity: String,
}

impl NotificationTarget {
    /// Creates a notification target.
    #[must_use]
    pub fn new(address: impl Into<String>, holder_identity: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            holder_identity: holder_identity.into(),
        }
    }

    /// Returns the destination host or IP address.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Returns the holder identity announced to the destination.
    #[must_use]
    pub fn holder_identity(&self) -> &str {
        self.holder_identity.as_str()
    }

    /// Returns the JSON body sent to the destination.
    #[must_use]
    pub fn payload(&self) -> HolderNotificationPayload {
        HolderNotificationPayload {
            holder_identity: self.holder_identity.clone(),
        }
    }
}

/// Wire payload announcing a new lease holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderNotificationPayload {
    /// New holder identity.
    pub holder_identity: String,
}
