//! Normalized service description consumed by the transformer.
//!
//! These types are the hand-off point from the compose parser: every field
//! has already been defaulted, so an absent value is an empty string, list,
//! or map rather than an `Option`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named collection of services to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Services keyed by their assigned name.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

/// Normalized description of one application service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Container identifier declared in the compose file.
    pub container_name: String,
    /// Image reference.
    pub image: String,
    /// Environment variables in declaration order.
    pub environment: Vec<EnvVar>,
    /// Port mappings.
    pub ports: Vec<PortMapping>,
    /// Entrypoint override.
    pub command: Vec<String>,
    /// Working directory inside the container.
    pub working_dir: String,
    /// Arguments passed to the entrypoint.
    pub args: Vec<String>,
    /// Volume specifications (`[name:|host:]container[:mode]`).
    pub volumes: Vec<String>,
    /// Declared networks.
    pub networks: Vec<String>,
    /// Labels attached to generated objects.
    pub labels: BTreeMap<String, String>,
    /// Annotations attached to generated objects.
    pub annotations: BTreeMap<String, String>,
    /// CPU pinning hint.
    pub cpu_set: String,
    /// CPU shares hint.
    pub cpu_shares: i64,
    /// CPU quota hint.
    pub cpu_quota: i64,
    /// Memory limit hint in bytes.
    pub mem_limit: i64,
    /// Capabilities to add.
    pub cap_add: Vec<String>,
    /// Capabilities to drop.
    pub cap_drop: Vec<String>,
    /// Ports exposed to linked services only.
    pub expose: Vec<String>,
    /// Run the container privileged.
    pub privileged: bool,
    /// Restart policy as written in the compose file.
    pub restart: String,
    /// User override.
    pub user: String,
    /// Keep stdin open.
    pub stdin_open: bool,
    /// Allocate a TTY.
    pub tty: bool,
    /// Expose directive: `"true"` or a hostname.
    pub expose_service: String,
    /// Build context path relative to the compose file.
    pub build: String,
}

impl ServiceConfig {
    /// Parses the expose directive, if any.
    #[must_use]
    pub fn expose_directive(&self) -> Option<ExposeDirective> {
        ExposeDirective::parse(&self.expose_service)
    }

    /// Returns the parsed restart policy.
    #[must_use]
    pub fn restart_policy(&self) -> RestartPolicy {
        RestartPolicy::parse(&self.restart)
    }

    /// Whether the service declares a build context.
    #[must_use]
    pub fn has_build(&self) -> bool {
        !self.build.is_empty()
    }
}

/// A single environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Variable value.
    #[serde(default)]
    pub value: String,
}

impl EnvVar {
    /// Creates a variable from a name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A host-to-container port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Port published on the host, if any.
    #[serde(default)]
    pub host_port: Option<u16>,
    /// Port the container listens on.
    pub container_port: u16,
    /// Transport protocol.
    #[serde(default)]
    pub protocol: Protocol,
}

impl PortMapping {
    /// Port the network-exposure object publishes: the host port, or the
    /// container port when none is mapped.
    #[must_use]
    pub fn published_port(&self) -> u16 {
        self.host_port.unwrap_or(self.container_port)
    }
}

/// Transport protocol of a port mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// TCP.
    #[default]
    Tcp,
    /// UDP.
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

/// How a service should be exposed outside the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExposeDirective {
    /// Let the platform assign a hostname.
    Auto,
    /// Expose on the given hostname.
    Host(String),
}

impl ExposeDirective {
    /// Sentinel that requests an auto-assigned hostname.
    pub const AUTO_SENTINEL: &'static str = "true";

    /// Parses a raw directive; empty means "do not expose".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            Self::AUTO_SENTINEL => Some(Self::Auto),
            host => Some(Self::Host(host.to_string())),
        }
    }

    /// Returns the explicit hostname, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Auto => None,
            Self::Host(host) => Some(host),
        }
    }
}

/// Restart behaviour, which selects between long-running and one-shot objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestartPolicy {
    /// Keep the service running (`always`, `unless-stopped`, or unset).
    Always,
    /// Run once (`no`).
    Never,
    /// Restart only on failure (`on-failure`).
    OnFailure,
}

impl RestartPolicy {
    /// Parses a compose restart value. Unknown values keep the service running.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "no" => Self::Never,
            "on-failure" => Self::OnFailure,
            _ => Self::Always,
        }
    }

    /// Whether the service should become a one-shot pod.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::Never | Self::OnFailure)
    }

    /// Pod-level restart policy string.
    #[must_use]
    pub const fn as_pod_policy(self) -> &'static str {
        match self {
            Self::Always => "Always",
            Self::Never => "Never",
            Self::OnFailure => "OnFailure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expose_true_is_auto() {
        assert_eq!(ExposeDirective::parse("true"), Some(ExposeDirective::Auto));
        assert_eq!(ExposeDirective::Auto.host(), None);
    }

    #[test]
    fn expose_hostname_is_kept() {
        let directive = ExposeDirective::parse("example.com").expect("directive");
        assert_eq!(directive.host(), Some("example.com"));
    }

    #[test]
    fn expose_empty_is_none() {
        assert_eq!(ExposeDirective::parse(""), None);
    }

    #[test]
    fn restart_policy_selects_one_shot() {
        assert!(RestartPolicy::parse("no").is_one_shot());
        assert!(RestartPolicy::parse("on-failure").is_one_shot());
        assert!(!RestartPolicy::parse("always").is_one_shot());
        assert!(!RestartPolicy::parse("").is_one_shot());
        assert_eq!(RestartPolicy::parse("no").as_pod_policy(), "Never");
    }

    #[test]
    fn published_port_prefers_host_port() {
        let mapped = PortMapping {
            host_port: Some(123),
            container_port: 456,
            protocol: Protocol::Tcp,
        };
        let unmapped = PortMapping {
            host_port: None,
            ..mapped
        };
        assert_eq!(mapped.published_port(), 123);
        assert_eq!(unmapped.published_port(), 456);
    }

    #[test]
    fn service_config_deserializes_with_defaults() {
        let yaml = r"
image: nginx:1.25
ports:
  - container_port: 80
    host_port: 8080
environment:
  - name: MODE
    value: prod
expose_service: 'true'
";
        let config: ServiceConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(config.image, "nginx:1.25");
        assert_eq!(config.ports[0].protocol, Protocol::Tcp);
        assert_eq!(config.environment, vec![EnvVar::new("MODE", "prod")]);
        assert_eq!(config.expose_directive(), Some(ExposeDirective::Auto));
        assert!(!config.has_build());
        assert_eq!(config.restart_policy(), RestartPolicy::Always);
    }
}
