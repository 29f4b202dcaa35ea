//! Core `Service` builder.

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use stevedore_common::types::ServiceConfig;

/// Builds the in-cluster service for `name`, one port per mapping.
#[must_use]
pub fn service(name: &str, config: &ServiceConfig) -> Service {
    let ports = config
        .ports
        .iter()
        .map(|mapping| {
            let published = mapping.published_port();
            ServicePort {
                name: Some(published.to_string()),
                port: i32::from(published),
                target_port: Some(IntOrString::Int(i32::from(mapping.container_port))),
                protocol: Some(mapping.protocol.to_string()),
                ..ServicePort::default()
            }
        })
        .collect();

    Service {
        metadata: super::object_meta(name, config),
        spec: Some(ServiceSpec {
            selector: Some(super::selector_labels(name)),
            ports: Some(ports),
            ..ServiceSpec::default()
        }),
        status: None,
    }
}

/// First port of a service, which routes forward to.
#[must_use]
pub fn first_port(service: &Service) -> Option<i32> {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .and_then(|ports| ports.first())
        .map(|port| port.port)
}

#[cfg(test)]
mod tests {
    use stevedore_common::types::{PortMapping, Protocol};

    use super::*;

    #[test]
    fn service_maps_each_port() {
        let config = ServiceConfig {
            ports: vec![
                PortMapping {
                    host_port: Some(8080),
                    container_port: 80,
                    protocol: Protocol::Tcp,
                },
                PortMapping {
                    host_port: None,
                    container_port: 53,
                    protocol: Protocol::Udp,
                },
            ],
            ..ServiceConfig::default()
        };
        let svc = service("web", &config);
        let ports = svc.spec.as_ref().and_then(|s| s.ports.clone()).expect("ports");
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].port, 8080);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(80)));
        assert_eq!(ports[0].name.as_deref(), Some("8080"));
        assert_eq!(ports[1].port, 53);
        assert_eq!(ports[1].protocol.as_deref(), Some("UDP"));
        assert_eq!(first_port(&svc), Some(8080));
    }

    #[test]
    fn service_selects_service_pods() {
        let svc = service("web", &ServiceConfig::default());
        let selector = svc.spec.and_then(|s| s.selector).expect("selector");
        assert_eq!(
            selector.get("io.stevedore.service").map(String::as_str),
            Some("web")
        );
    }
}
