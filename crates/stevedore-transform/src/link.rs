//! Cross-reference linking.
//!
//! Runs once all objects of a service exist. Every name one object uses to
//! point at another is checked against the batch, and references whose
//! value depends on another object (a route's target port) are bound here.

use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::api::core::v1::{ObjectReference, PodSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use stevedore_common::error::{Result, StevedoreError};

use crate::builders::service::first_port;
use crate::objects::{ObjectKind, ResourceObject, RoutePort};

/// Names and ports an object batch provides to its references.
#[derive(Debug, Default)]
struct NameIndex {
    /// Image stream name to the tags it will carry.
    stream_tags: BTreeMap<String, BTreeSet<String>>,
    /// Service name to its first port.
    services: BTreeMap<String, Option<i32>>,
    claims: BTreeSet<String>,
}

impl NameIndex {
    fn collect(objects: &[ResourceObject]) -> Self {
        let mut index = Self::default();
        for object in objects {
            match object {
                ResourceObject::ImageStream(stream) => {
                    index
                        .stream_tags
                        .entry(object.name().to_string())
                        .or_default()
                        .extend(stream.spec.tags.iter().map(|t| t.name.clone()));
                }
                ResourceObject::Service(svc) => {
                    let _ = index
                        .services
                        .insert(object.name().to_string(), first_port(svc));
                }
                ResourceObject::PersistentVolumeClaim(_) => {
                    let _ = index.claims.insert(object.name().to_string());
                }
                ResourceObject::BuildConfig(_)
                | ResourceObject::DeploymentConfig(_)
                | ResourceObject::Route(_)
                | ResourceObject::Pod(_) => {}
            }
        }

        // Build outputs add tags to streams that exist.
        for object in objects {
            if let ResourceObject::BuildConfig(bc) = object {
                if let Some((stream, tag)) = split_tag(&bc.spec.output.to) {
                    if let Some(tags) = index.stream_tags.get_mut(stream) {
                        let _ = tags.insert(tag.to_string());
                    }
                }
            }
        }
        index
    }

    fn has_stream(&self, stream: &str) -> bool {
        self.stream_tags.contains_key(stream)
    }

    fn has_tag(&self, stream: &str, tag: &str) -> bool {
        self.stream_tags
            .get(stream)
            .is_some_and(|tags| tags.contains(tag))
    }
}

/// Resolves every cross-object reference within one service's objects.
///
/// # Errors
///
/// Returns [`StevedoreError::UnresolvedReference`] if an object names a
/// target that is not part of the batch.
pub fn link_references(objects: &mut [ResourceObject]) -> Result<()> {
    let index = NameIndex::collect(objects);

    for object in objects.iter_mut() {
        let kind = object.kind();
        let name = object.name().to_string();
        let unresolved = |target: String| StevedoreError::UnresolvedReference {
            kind: kind.as_str(),
            name: name.clone(),
            target,
        };

        match object {
            ResourceObject::DeploymentConfig(dc) => {
                for params in dc
                    .spec
                    .triggers
                    .iter()
                    .filter_map(|t| t.image_change_params.as_ref())
                {
                    let (stream, tag) = split_tag(&params.from)
                        .ok_or_else(|| unresolved("image stream tag".into()))?;
                    if !index.has_tag(stream, tag) {
                        return Err(unresolved(format!("ImageStreamTag {stream}:{tag}")));
                    }
                }
                if let Some(spec) = dc.spec.template.spec.as_ref() {
                    check_volumes(spec, &index).map_err(unresolved)?;
                }
            }
            ResourceObject::BuildConfig(bc) => {
                let (stream, _) = split_tag(&bc.spec.output.to)
                    .ok_or_else(|| unresolved("output image stream tag".into()))?;
                if !index.has_stream(stream) {
                    return Err(unresolved(format!("{} {stream}", ObjectKind::ImageStream)));
                }
            }
            ResourceObject::Route(route) => {
                let target = &route.spec.to.name;
                let port = index
                    .services
                    .get(target)
                    .ok_or_else(|| unresolved(format!("{} {target}", ObjectKind::Service)))?;
                if let Some(port) = port {
                    route.spec.port = Some(RoutePort {
                        target_port: IntOrString::Int(*port),
                    });
                }
            }
            ResourceObject::Pod(pod) => {
                if let Some(spec) = pod.spec.as_ref() {
                    check_volumes(spec, &index).map_err(unresolved)?;
                }
            }
            ResourceObject::ImageStream(_)
            | ResourceObject::Service(_)
            | ResourceObject::PersistentVolumeClaim(_) => {}
        }
    }
    Ok(())
}

/// Every mount must name a pod volume, and every claim-backed volume a claim.
fn check_volumes(spec: &PodSpec, index: &NameIndex) -> std::result::Result<(), String> {
    let volumes = spec.volumes.as_deref().unwrap_or_default();
    let declared: BTreeSet<&str> = volumes.iter().map(|v| v.name.as_str()).collect();

    for container in &spec.containers {
        for mount in container.volume_mounts.as_deref().unwrap_or_default() {
            if !declared.contains(mount.name.as_str()) {
                return Err(format!("volume {}", mount.name));
            }
        }
    }
    for claim in volumes
        .iter()
        .filter_map(|v| v.persistent_volume_claim.as_ref())
    {
        if !index.claims.contains(&claim.claim_name) {
            return Err(format!(
                "{} {}",
                ObjectKind::PersistentVolumeClaim,
                claim.claim_name
            ));
        }
    }
    Ok(())
}

fn split_tag(reference: &ObjectReference) -> Option<(&str, &str)> {
    reference.name.as_deref()?.rsplit_once(':')
}

#[cfg(test)]
mod tests {
    use stevedore_common::types::{PortMapping, Protocol, ServiceConfig};

    use super::*;
    use crate::builders::build::{BuildCoordinates, build_config};
    use crate::builders::deployment::{deployment_config, image_stream};
    use crate::builders::route::route;
    use crate::builders::service::service;
    use crate::builders::volume::ServiceVolumes;

    fn web() -> ServiceConfig {
        ServiceConfig {
            image: "nginx:1.25".into(),
            ports: vec![PortMapping {
                host_port: Some(8080),
                container_port: 80,
                protocol: Protocol::Tcp,
            }],
            expose_service: "true".into(),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn complete_batch_links() {
        let config = web();
        let volumes = ServiceVolumes::default();
        let mut objects: Vec<ResourceObject> = vec![
            deployment_config("web", &config, 1, &volumes).into(),
            image_stream("web", &config).into(),
            service("web", &config).into(),
            route("web", &config, 0).into(),
        ];
        link_references(&mut objects).expect("link");

        let ResourceObject::Route(route) = &objects[3] else {
            panic!("expected route");
        };
        assert_eq!(
            route.spec.port.as_ref().map(|p| p.target_port.clone()),
            Some(IntOrString::Int(8080))
        );
    }

    #[test]
    fn route_without_service_is_unresolved() {
        let config = web();
        let mut objects: Vec<ResourceObject> = vec![route("web", &config, 8080).into()];
        let err = link_references(&mut objects).expect_err("should fail");
        assert!(matches!(
            err,
            StevedoreError::UnresolvedReference { kind: "Route", .. }
        ));
    }

    #[test]
    fn deployment_without_stream_is_unresolved() {
        let config = web();
        let mut objects: Vec<ResourceObject> =
            vec![deployment_config("web", &config, 1, &ServiceVolumes::default()).into()];
        let err = link_references(&mut objects).expect_err("should fail");
        assert!(err.to_string().contains("ImageStreamTag web:1.25"), "got: {err}");
    }

    #[test]
    fn build_output_supplies_latest_tag() {
        let config = ServiceConfig {
            build: "./web".into(),
            ..ServiceConfig::default()
        };
        let coordinates = BuildCoordinates {
            repository_url: "https://example.com/repo.git".into(),
            branch: "main".into(),
            context_dir: "web".into(),
        };
        let mut objects: Vec<ResourceObject> = vec![
            build_config("web", &config, &coordinates).into(),
            deployment_config("web", &config, 1, &ServiceVolumes::default()).into(),
            image_stream("web", &config).into(),
        ];
        link_references(&mut objects).expect("link");
    }

    #[test]
    fn missing_claim_is_unresolved() {
        let config = ServiceConfig {
            image: "busybox".into(),
            volumes: vec!["/data".into()],
            ..ServiceConfig::default()
        };
        let volumes = ServiceVolumes::resolve("job", &config, false).expect("volumes");
        let mut objects: Vec<ResourceObject> = vec![
            deployment_config("job", &config, 1, &volumes).into(),
            image_stream("job", &config).into(),
        ];
        let err = link_references(&mut objects).expect_err("should fail");
        assert!(err.to_string().contains("job-claim0"), "got: {err}");

        objects.extend(volumes.claims.into_iter().map(ResourceObject::from));
        link_references(&mut objects).expect("link with claims");
    }
}
