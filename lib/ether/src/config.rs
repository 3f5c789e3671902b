//! Client and dispatcher configuration types.

use std::time::Duration;

use ether_core::{DomainHeaders, Headers};

/// Transport settings for [`crate::HyperClient`].
///
/// ```
/// use std::time::Duration;
///
/// use ether::ClientConfig;
///
/// let config = ClientConfig::builder().timeout(Duration::from_secs(5)).build();
/// assert_eq!(config.connect_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-exchange deadline, from sending the request to the end of the
    /// body. Elapsing surfaces as [`crate::Error::Transport`].
    pub timeout: Duration,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Idle connections kept per host by the pool.
    pub pool_idle_per_host: usize,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Builder starting from the defaults.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl From<ClientConfig> for ClientConfigBuilder {
    fn from(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl ClientConfigBuilder {
    /// Whole-exchange deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Connection deadline.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Idle connection lifetime.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration injected into [`crate::Ether`].
///
/// Cloning shares the domain headers table.
#[derive(Debug, Clone, Default)]
pub struct EtherConfig {
    /// Headers attached to every request for a given host, such as session tokens.
    pub domain_headers: DomainHeaders,
    /// Dump every assembled request at debug level.
    ///
    /// Ignored unless `debug_assertions` are enabled: dumps include headers
    /// and may leak credentials.
    pub log_requests: bool,
}

impl EtherConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EtherConfigBuilder {
        EtherConfigBuilder::default()
    }

    /// `true` when requests should be dumped in this build.
    #[must_use]
    pub const fn should_log_requests(&self) -> bool {
        self.log_requests && cfg!(debug_assertions)
    }
}

/// Builder for [`EtherConfig`].
#[derive(Debug, Clone, Default)]
pub struct EtherConfigBuilder {
    domain_headers: Option<DomainHeaders>,
    trusted: Vec<(String, Headers)>,
    log_requests: bool,
}

impl EtherConfigBuilder {
    /// Use an existing (possibly shared) domain headers table.
    #[must_use]
    pub fn domain_headers(mut self, table: DomainHeaders) -> Self {
        self.domain_headers = Some(table);
        self
    }

    /// Trust a host with the given headers.
    #[must_use]
    pub fn trust(mut self, host: impl Into<String>, headers: Headers) -> Self {
        self.trusted.push((host.into(), headers));
        self
    }

    /// Enable or disable the debug request dump.
    #[must_use]
    pub const fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EtherConfig {
        let domain_headers = self.domain_headers.unwrap_or_default();
        for (host, headers) in self.trusted {
            domain_headers.insert(host, headers);
        }
        EtherConfig {
            domain_headers,
            log_requests: self.log_requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn unset_fields_keep_their_defaults() {
        let config = ClientConfig::builder()
            .connect_timeout(Duration::from_millis(250))
            .build();

        check!(config.connect_timeout == Duration::from_millis(250));
        check!(config == ClientConfig {
            connect_timeout: Duration::from_millis(250),
            ..ClientConfig::default()
        });
    }

    #[test]
    fn builder_resumes_from_an_existing_config() {
        let base = ClientConfig::builder().pool_idle_per_host(4).build();
        let tuned = ClientConfigBuilder::from(base.clone())
            .pool_idle_timeout(Duration::ZERO)
            .build();

        check!(tuned.pool_idle_per_host == 4);
        check!(tuned.pool_idle_timeout == Duration::ZERO);
        check!(tuned.timeout == base.timeout);
    }

    #[test]
    fn ether_config_builder() {
        let shared = DomainHeaders::new();
        let config = EtherConfig::builder()
            .domain_headers(shared.clone())
            .trust("api.example.com", Headers::from([("Authorization", "Bearer t")]))
            .log_requests(true)
            .build();

        check!(shared.get("api.example.com").is_some());
        check!(config.domain_headers.get("API.example.com").is_some());
        check!(config.should_log_requests() == cfg!(debug_assertions));
    }

    #[test]
    fn request_logging_is_off_by_default() {
        let config = EtherConfig::default();
        check!(!config.log_requests);
        check!(!config.should_log_requests());
    }
}
