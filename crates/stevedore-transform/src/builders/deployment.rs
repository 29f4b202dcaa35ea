//! `DeploymentConfig` and `ImageStream` builders.

use k8s_openapi::api::core::v1::ObjectReference;
use stevedore_common::constants::DEFAULT_IMAGE_TAG;
use stevedore_common::types::ServiceConfig;

use super::volume::ServiceVolumes;
use crate::objects::{
    DeploymentConfig, DeploymentConfigSpec, DeploymentTriggerPolicy, DeploymentTriggerType,
    ImageChangeParams, ImageStream, ImageStreamSpec, TagReference,
};

/// Builds the `DeploymentConfig` of a long-running service.
///
/// The pod template's container is named `name`. The image-change trigger,
/// present whenever the service has an image or a build context, names the
/// configured `container_name` instead, falling back to `name` only when no
/// container name was declared.
#[must_use]
pub fn deployment_config(
    name: &str,
    config: &ServiceConfig,
    replicas: u32,
    volumes: &ServiceVolumes,
) -> DeploymentConfig {
    let mut triggers = vec![DeploymentTriggerPolicy {
        trigger_type: DeploymentTriggerType::ConfigChange,
        image_change_params: None,
    }];

    if !config.image.is_empty() || config.has_build() {
        triggers.push(DeploymentTriggerPolicy {
            trigger_type: DeploymentTriggerType::ImageChange,
            image_change_params: Some(ImageChangeParams {
                automatic: true,
                container_names: vec![trigger_container_name(name, config).to_string()],
                from: image_stream_tag(name, stream_tag(config)),
            }),
        });
    }

    DeploymentConfig::new(
        super::object_meta(name, config),
        DeploymentConfigSpec {
            replicas,
            selector: super::selector_labels(name),
            template: super::pod::pod_template(name, config, volumes),
            triggers,
        },
    )
}

/// Builds the `ImageStream` a service's deployment watches.
///
/// Services pulling a prebuilt image import it under its own tag; services
/// with a build context start empty and are filled by the build output.
#[must_use]
pub fn image_stream(name: &str, config: &ServiceConfig) -> ImageStream {
    let tags = if config.has_build() || config.image.is_empty() {
        Vec::new()
    } else {
        vec![TagReference {
            name: super::image_tag(&config.image).to_string(),
            from: ObjectReference {
                kind: Some("DockerImage".into()),
                name: Some(config.image.clone()),
                ..ObjectReference::default()
            },
        }]
    };
    ImageStream::new(super::object_meta(name, config), ImageStreamSpec { tags })
}

/// Container identifier recorded in the image-change trigger.
#[must_use]
pub fn trigger_container_name<'a>(name: &'a str, config: &'a ServiceConfig) -> &'a str {
    if config.container_name.is_empty() {
        name
    } else {
        &config.container_name
    }
}

/// Tag of the service's image stream the deployment follows.
#[must_use]
pub fn stream_tag(config: &ServiceConfig) -> &str {
    if config.has_build() {
        DEFAULT_IMAGE_TAG
    } else {
        super::image_tag(&config.image)
    }
}

/// Reference to `<stream>:<tag>`.
#[must_use]
pub fn image_stream_tag(stream: &str, tag: &str) -> ObjectReference {
    ObjectReference {
        kind: Some("ImageStreamTag".into()),
        name: Some(format!("{stream}:{tag}")),
        ..ObjectReference::default()
    }
}
