//! Resource builders.
//!
//! Each builder is a pure function of the service name, its configuration,
//! and contextual parameters. Calling one twice with the same inputs yields
//! equal objects; nothing here touches the filesystem or source control.

pub mod build;
pub mod deployment;
pub mod pod;
pub mod route;
pub mod service;
pub mod volume;

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use stevedore_common::constants::{DEFAULT_IMAGE_TAG, SERVICE_LABEL};
use stevedore_common::types::ServiceConfig;

/// Selector labels identifying the pods of a service.
#[must_use]
pub fn selector_labels(name: &str) -> BTreeMap<String, String> {
    [(SERVICE_LABEL.to_string(), name.to_string())].into()
}

/// Labels stamped on every object of a service: the configured labels with
/// the service label on top.
#[must_use]
pub fn service_labels(name: &str, config: &ServiceConfig) -> BTreeMap<String, String> {
    let mut labels = config.labels.clone();
    labels.extend(selector_labels(name));
    labels
}

/// Metadata for a top-level object of a service.
#[must_use]
pub fn object_meta(name: &str, config: &ServiceConfig) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        labels: Some(service_labels(name, config)),
        annotations: (!config.annotations.is_empty()).then(|| config.annotations.clone()),
        ..ObjectMeta::default()
    }
}

/// Returns the tag of an image reference, or `latest` when it has none.
///
/// Only the last path segment is inspected, so a registry port such as
/// `localhost:5000/app` is not mistaken for a tag.
#[must_use]
pub fn image_tag(image: &str) -> &str {
    let without_digest = image.split('@').next().unwrap_or(image);
    let last_segment = without_digest.rsplit('/').next().unwrap_or(without_digest);
    match last_segment.split_once(':') {
        Some((_, tag)) if !tag.is_empty() => tag,
        _ => DEFAULT_IMAGE_TAG,
    }
}
