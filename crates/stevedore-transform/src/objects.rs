//! Target object model.
//!
//! Core Kubernetes kinds come straight from `k8s-openapi`. The OpenShift
//! kinds below only carry the fields this converter populates; field names
//! and nesting follow the `v1` OpenShift API so the serialized output is
//! accepted as-is.

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::{
    ObjectReference, PersistentVolumeClaim, Pod, PodTemplateSpec, Service,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use stevedore_common::constants::OPENSHIFT_API_VERSION;

/// `apiVersion` and `kind` header of a platform-specific object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// API group version.
    pub api_version: &'static str,
    /// Object kind.
    pub kind: &'static str,
}

impl TypeMeta {
    const fn openshift(kind: ObjectKind) -> Self {
        Self {
            api_version: OPENSHIFT_API_VERSION,
            kind: kind.as_str(),
        }
    }
}

/// Kinds of objects the converter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    /// OpenShift `DeploymentConfig`.
    DeploymentConfig,
    /// OpenShift `ImageStream`.
    ImageStream,
    /// OpenShift `BuildConfig`.
    BuildConfig,
    /// OpenShift `Route`.
    Route,
    /// Core `Service`.
    Service,
    /// Core `Pod`.
    Pod,
    /// Core `PersistentVolumeClaim`.
    PersistentVolumeClaim,
}

impl ObjectKind {
    /// Returns the schema `kind` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeploymentConfig => "DeploymentConfig",
            Self::ImageStream => "ImageStream",
            Self::BuildConfig => "BuildConfig",
            Self::Route => "Route",
            Self::Service => "Service",
            Self::Pod => "Pod",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DeploymentConfig ─────────────────────────────────────────────────

/// OpenShift `DeploymentConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentConfig {
    /// Type header.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: DeploymentConfigSpec,
}

impl DeploymentConfig {
    /// Creates a deployment config with the standard type header.
    #[must_use]
    pub const fn new(metadata: ObjectMeta, spec: DeploymentConfigSpec) -> Self {
        Self {
            type_meta: TypeMeta::openshift(ObjectKind::DeploymentConfig),
            metadata,
            spec,
        }
    }
}

/// Desired state of a `DeploymentConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// Number of pod replicas.
    pub replicas: u32,
    /// Label selector for managed pods.
    pub selector: BTreeMap<String, String>,
    /// Pod template.
    pub template: PodTemplateSpec,
    /// Events that start a new rollout.
    pub triggers: Vec<DeploymentTriggerPolicy>,
}

/// Trigger type of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeploymentTriggerType {
    /// Roll out when the config itself changes.
    ConfigChange,
    /// Roll out when a watched image stream tag changes.
    ImageChange,
}

/// A rollout trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerPolicy {
    /// Trigger type.
    #[serde(rename = "type")]
    pub trigger_type: DeploymentTriggerType,
    /// Parameters for image-change triggers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<ImageChangeParams>,
}

/// Parameters of an image-change trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeParams {
    /// Update the pod template automatically when the tag moves.
    pub automatic: bool,
    /// Containers whose image is replaced.
    pub container_names: Vec<String>,
    /// Watched `ImageStreamTag`.
    pub from: ObjectReference,
}

// ── ImageStream ──────────────────────────────────────────────────────

/// OpenShift `ImageStream`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageStream {
    /// Type header.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: ImageStreamSpec,
}

impl ImageStream {
    /// Creates an image stream with the standard type header.
    #[must_use]
    pub const fn new(metadata: ObjectMeta, spec: ImageStreamSpec) -> Self {
        Self {
            type_meta: TypeMeta::openshift(ObjectKind::ImageStream),
            metadata,
            spec,
        }
    }
}

/// Desired state of an `ImageStream`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageStreamSpec {
    /// Tags imported from external images.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagReference>,
}

/// A tag imported into an image stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagReference {
    /// Tag name.
    pub name: String,
    /// Image the tag tracks.
    pub from: ObjectReference,
}

// ── BuildConfig ──────────────────────────────────────────────────────

/// OpenShift `BuildConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfig {
    /// Type header.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: BuildConfigSpec,
}

impl BuildConfig {
    /// Creates a build config with the standard type header.
    #[must_use]
    pub const fn new(metadata: ObjectMeta, spec: BuildConfigSpec) -> Self {
        Self {
            type_meta: TypeMeta::openshift(ObjectKind::BuildConfig),
            metadata,
            spec,
        }
    }
}

/// Desired state of a `BuildConfig`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    /// Events that start a build.
    pub triggers: Vec<BuildTriggerPolicy>,
    /// How concurrent builds are scheduled.
    pub run_policy: &'static str,
    /// Where the sources come from.
    pub source: BuildSource,
    /// How the image is built.
    pub strategy: BuildStrategy,
    /// Where the built image is pushed.
    pub output: BuildOutput,
}

/// A build trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildTriggerPolicy {
    /// Trigger type (`ConfigChange` or `ImageChange`).
    #[serde(rename = "type")]
    pub trigger_type: &'static str,
}

/// Source of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSource {
    /// Source type; always `Git`.
    #[serde(rename = "type")]
    pub source_type: &'static str,
    /// Git checkout parameters.
    pub git: GitBuildSource,
    /// Sub-directory of the repository holding the build context.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context_dir: String,
}

/// Git checkout parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitBuildSource {
    /// Repository URL.
    pub uri: String,
    /// Branch or other ref.
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Build strategy; only the Docker strategy is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    /// Strategy type.
    #[serde(rename = "type")]
    pub strategy_type: &'static str,
    /// Docker strategy options.
    pub docker_strategy: DockerBuildStrategy,
}

/// Options of the Docker build strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DockerBuildStrategy {}

/// Output of a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutput {
    /// `ImageStreamTag` receiving the image.
    pub to: ObjectReference,
}

// ── Route ────────────────────────────────────────────────────────────

/// OpenShift `Route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Type header.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: RouteSpec,
}

impl Route {
    /// Creates a route with the standard type header.
    #[must_use]
    pub const fn new(metadata: ObjectMeta, spec: RouteSpec) -> Self {
        Self {
            type_meta: TypeMeta::openshift(ObjectKind::Route),
            metadata,
            spec,
        }
    }
}

/// Desired state of a `Route`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSpec {
    /// Public hostname; the platform assigns one when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Backing service.
    pub to: RouteTargetReference,
    /// Service port traffic is sent to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<RoutePort>,
}

/// Reference from a route to its backing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTargetReference {
    /// Target kind; always `Service`.
    pub kind: &'static str,
    /// Target name.
    pub name: String,
}

/// Port a route forwards to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    /// Service port.
    pub target_port: IntOrString,
}

// ── Graph ────────────────────────────────────────────────────────────

/// Any object the converter emits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceObject {
    /// Long-running workload.
    DeploymentConfig(DeploymentConfig),
    /// Image tracking for a workload.
    ImageStream(ImageStream),
    /// Remote build from source control.
    BuildConfig(BuildConfig),
    /// External exposure of a service.
    Route(Route),
    /// In-cluster network exposure.
    Service(Service),
    /// One-shot workload.
    Pod(Pod),
    /// Storage backing a volume mount.
    PersistentVolumeClaim(PersistentVolumeClaim),
}

impl ResourceObject {
    /// Returns the object kind.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::DeploymentConfig(_) => ObjectKind::DeploymentConfig,
            Self::ImageStream(_) => ObjectKind::ImageStream,
            Self::BuildConfig(_) => ObjectKind::BuildConfig,
            Self::Route(_) => ObjectKind::Route,
            Self::Service(_) => ObjectKind::Service,
            Self::Pod(_) => ObjectKind::Pod,
            Self::PersistentVolumeClaim(_) => ObjectKind::PersistentVolumeClaim,
        }
    }

    /// Returns the object metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::DeploymentConfig(o) => &o.metadata,
            Self::ImageStream(o) => &o.metadata,
            Self::BuildConfig(o) => &o.metadata,
            Self::Route(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::Pod(o) => &o.metadata,
            Self::PersistentVolumeClaim(o) => &o.metadata,
        }
    }

    /// Returns the object name, or an empty string when unnamed.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }
}

impl From<DeploymentConfig> for ResourceObject {
    fn from(o: DeploymentConfig) -> Self {
        Self::DeploymentConfig(o)
    }
}

impl From<ImageStream> for ResourceObject {
    fn from(o: ImageStream) -> Self {
        Self::ImageStream(o)
    }
}

impl From<BuildConfig> for ResourceObject {
    fn from(o: BuildConfig) -> Self {
        Self::BuildConfig(o)
    }
}

impl From<Route> for ResourceObject {
    fn from(o: Route) -> Self {
        Self::Route(o)
    }
}

impl From<Service> for ResourceObject {
    fn from(o: Service) -> Self {
        Self::Service(o)
    }
}

impl From<Pod> for ResourceObject {
    fn from(o: Pod) -> Self {
        Self::Pod(o)
    }
}

impl From<PersistentVolumeClaim> for ResourceObject {
    fn from(o: PersistentVolumeClaim) -> Self {
        Self::PersistentVolumeClaim(o)
    }
}

/// Ordered, append-only collection of generated objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputGraph {
    objects: Vec<ResourceObject>,
}

impl OutputGraph {
    /// Creates an empty graph.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Appends objects, preserving their order.
    pub fn append(&mut self, objects: impl IntoIterator<Item = ResourceObject>) {
        self.objects.extend(objects);
    }

    /// Iterates over the objects in construction order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceObject> {
        self.objects.iter()
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the objects as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ResourceObject] {
        &self.objects
    }

    /// Finds an object by kind and name.
    #[must_use]
    pub fn find(&self, kind: ObjectKind, name: &str) -> Option<&ResourceObject> {
        self.objects
            .iter()
            .find(|o| o.kind() == kind && o.name() == name)
    }
}

impl<'a> IntoIterator for &'a OutputGraph {
    type Item = &'a ResourceObject;
    type IntoIter = std::slice::Iter<'a, ResourceObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for OutputGraph {
    type Item = ResourceObject;
    type IntoIter = std::vec::IntoIter<ResourceObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}
