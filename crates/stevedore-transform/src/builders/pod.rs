//! Container and pod construction shared by every workload kind.

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, Pod, PodSpec, PodTemplateSpec, SecurityContext,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use stevedore_common::types::{RestartPolicy, ServiceConfig};

use super::volume::ServiceVolumes;

/// Builds the primary container of a service.
///
/// The container is always named after `name`, never after
/// `config.container_name`.
#[must_use]
pub fn container(name: &str, config: &ServiceConfig, volumes: &ServiceVolumes) -> Container {
    Container {
        name: name.to_string(),
        image: non_empty(&config.image),
        command: non_empty_vec(&config.command),
        args: non_empty_vec(&config.args),
        working_dir: non_empty(&config.working_dir),
        env: (!config.environment.is_empty()).then(|| {
            config
                .environment
                .iter()
                .map(|var| EnvVar {
                    name: var.name.clone(),
                    value: Some(var.value.clone()),
                    value_from: None,
                })
                .collect()
        }),
        ports: (!config.ports.is_empty()).then(|| {
            config
                .ports
                .iter()
                .map(|port| ContainerPort {
                    container_port: i32::from(port.container_port),
                    protocol: Some(port.protocol.to_string()),
                    ..ContainerPort::default()
                })
                .collect()
        }),
        security_context: config.privileged.then(|| SecurityContext {
            privileged: Some(true),
            ..SecurityContext::default()
        }),
        stdin: config.stdin_open.then_some(true),
        tty: config.tty.then_some(true),
        volume_mounts: non_empty_vec(&volumes.mounts),
        ..Container::default()
    }
}

/// Builds a pod template for a long-running service.
#[must_use]
pub fn pod_template(
    name: &str,
    config: &ServiceConfig,
    volumes: &ServiceVolumes,
) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(super::service_labels(name, config)),
            annotations: (!config.annotations.is_empty()).then(|| config.annotations.clone()),
            ..ObjectMeta::default()
        }),
        spec: Some(pod_spec(name, config, volumes, RestartPolicy::Always)),
    }
}

/// Builds a bare pod for a one-shot service.
#[must_use]
pub fn pod(name: &str, config: &ServiceConfig, volumes: &ServiceVolumes) -> Pod {
    Pod {
        metadata: super::object_meta(name, config),
        spec: Some(pod_spec(name, config, volumes, config.restart_policy())),
        status: None,
    }
}

fn pod_spec(
    name: &str,
    config: &ServiceConfig,
    volumes: &ServiceVolumes,
    restart: RestartPolicy,
) -> PodSpec {
    PodSpec {
        containers: vec![container(name, config, volumes)],
        volumes: non_empty_vec(&volumes.volumes),
        restart_policy: Some(restart.as_pod_policy().to_string()),
        ..PodSpec::default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn non_empty_vec<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}
