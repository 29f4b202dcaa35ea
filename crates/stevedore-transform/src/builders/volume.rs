//! Volume parsing and claim generation.
//!
//! A compose volume string has the shape `[name:|host:]container[:mode]`.
//! Each one becomes a mount named `<service>-claim<i>` backed either by a
//! persistent volume claim or, on request, by an `emptyDir`.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    EmptyDirVolumeSource, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeClaimVolumeSource, ResourceRequirements, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use stevedore_common::constants::DEFAULT_CLAIM_SIZE;
use stevedore_common::error::{Result, StevedoreError};
use stevedore_common::types::ServiceConfig;

/// A parsed compose volume string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    /// Named volume or host path, if given.
    pub source: Option<String>,
    /// Mount path inside the container.
    pub container_path: String,
    /// Whether the mount is read-only.
    pub read_only: bool,
}

impl VolumeSpec {
    /// Parses `[source:]container[:mode]`.
    ///
    /// # Errors
    ///
    /// Returns [`StevedoreError::InvalidInput`] if the string is empty, has
    /// more than three parts, or carries an unknown access mode.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |message: &str| StevedoreError::InvalidInput {
            message: format!("volume {raw:?}: {message}"),
        };
        let parts: Vec<&str> = raw.split(':').collect();
        let (source, container, mode) = match parts.as_slice() {
            [container] => (None, *container, None),
            [container, mode] if is_mode(mode) => (None, *container, Some(*mode)),
            [source, container] => (Some(*source), *container, None),
            [source, container, mode] => (Some(*source), *container, Some(*mode)),
            _ => return Err(invalid("expected [source:]container[:mode]")),
        };
        if container.is_empty() {
            return Err(invalid("container path is empty"));
        }
        if let Some(mode) = mode.filter(|m| !is_mode(m)) {
            return Err(invalid(&format!("unknown access mode {mode}")));
        }
        Ok(Self {
            source: source.filter(|s| !s.is_empty()).map(str::to_string),
            container_path: container.to_string(),
            read_only: mode == Some("ro"),
        })
    }
}

fn is_mode(part: &str) -> bool {
    matches!(part, "ro" | "rw" | "z" | "Z")
}

/// Mounts, pod volumes, and claims derived from a service's volumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceVolumes {
    /// Container volume mounts.
    pub mounts: Vec<VolumeMount>,
    /// Pod-level volumes.
    pub volumes: Vec<Volume>,
    /// Claims to create alongside the workload.
    pub claims: Vec<PersistentVolumeClaim>,
}

impl ServiceVolumes {
    /// Resolves every volume of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StevedoreError::InvalidInput`] on a malformed volume string.
    pub fn resolve(name: &str, config: &ServiceConfig, empty_volumes: bool) -> Result<Self> {
        let mut resolved = Self::default();
        for (index, raw) in config.volumes.iter().enumerate() {
            let spec = VolumeSpec::parse(raw)?;
            let volume_name = format!("{name}-claim{index}");

            resolved.mounts.push(VolumeMount {
                name: volume_name.clone(),
                mount_path: spec.container_path.clone(),
                read_only: spec.read_only.then_some(true),
                ..VolumeMount::default()
            });

            if empty_volumes {
                resolved.volumes.push(Volume {
                    name: volume_name,
                    empty_dir: Some(EmptyDirVolumeSource::default()),
                    ..Volume::default()
                });
            } else {
                resolved.volumes.push(Volume {
                    name: volume_name.clone(),
                    persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                        claim_name: volume_name.clone(),
                        read_only: spec.read_only.then_some(true),
                    }),
                    ..Volume::default()
                });
                resolved
                    .claims
                    .push(claim(name, &volume_name, spec.read_only));
            }
        }
        Ok(resolved)
    }
}

/// Builds a claim for one volume of service `service`.
#[must_use]
pub fn claim(service: &str, claim_name: &str, read_only: bool) -> PersistentVolumeClaim {
    let access_mode = if read_only { "ReadOnlyMany" } else { "ReadWriteOnce" };
    let requests: BTreeMap<String, Quantity> = [(
        "storage".to_string(),
        Quantity(DEFAULT_CLAIM_SIZE.to_string()),
    )]
    .into();

    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(claim_name.to_string()),
            labels: Some(super::selector_labels(service)),
            ..ObjectMeta::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec![access_mode.to_string()]),
            resources: Some(ResourceRequirements {
                requests: Some(requests),
                ..ResourceRequirements::default()
            }),
            ..PersistentVolumeClaimSpec::default()
        }),
        status: None,
    }
}
