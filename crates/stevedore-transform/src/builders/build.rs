//! `BuildConfig` builder.

use stevedore_common::constants::DEFAULT_IMAGE_TAG;
use stevedore_common::types::ServiceConfig;

use crate::objects::{
    BuildConfig, BuildConfigSpec, BuildOutput, BuildSource, BuildStrategy, BuildTriggerPolicy,
    DockerBuildStrategy, GitBuildSource,
};

/// Where a remote build fetches its sources from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCoordinates {
    /// Repository URL.
    pub repository_url: String,
    /// Branch to check out.
    pub branch: String,
    /// Build context relative to the repository root, `/`-separated.
    pub context_dir: String,
}

/// Builds the `BuildConfig` for a service with a build context.
///
/// The output always goes to the `<name>:latest` tag of the service's image
/// stream.
#[must_use]
pub fn build_config(
    name: &str,
    config: &ServiceConfig,
    coordinates: &BuildCoordinates,
) -> BuildConfig {
    BuildConfig::new(
        super::object_meta(name, config),
        BuildConfigSpec {
            triggers: vec![
                BuildTriggerPolicy {
                    trigger_type: "ConfigChange",
                },
                BuildTriggerPolicy {
                    trigger_type: "ImageChange",
                },
            ],
            run_policy: "Serial",
            source: BuildSource {
                source_type: "Git",
                git: GitBuildSource {
                    uri: coordinates.repository_url.clone(),
                    reference: coordinates.branch.clone(),
                },
                context_dir: coordinates.context_dir.clone(),
            },
            strategy: BuildStrategy {
                strategy_type: "Docker",
                docker_strategy: DockerBuildStrategy::default(),
            },
            output: BuildOutput {
                to: super::deployment::image_stream_tag(name, DEFAULT_IMAGE_TAG),
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinates() -> BuildCoordinates {
        BuildCoordinates {
            repository_url: "https://git.test.com/org/repo".into(),
            branch: "somebranch".into(),
            context_dir: "a/build".into(),
        }
    }

    #[test]
    fn build_config_carries_coordinates() {
        let config = ServiceConfig {
            build: "./build".into(),
            ..ServiceConfig::default()
        };
        let bc = build_config("serviceA", &config, &coordinates());
        assert_eq!(bc.spec.source.git.uri, "https://git.test.com/org/repo");
        assert_eq!(bc.spec.source.git.reference, "somebranch");
        assert_eq!(bc.spec.source.context_dir, "a/build");
        assert_eq!(bc.spec.output.to.name.as_deref(), Some("serviceA:latest"));
        assert_eq!(bc.spec.output.to.kind.as_deref(), Some("ImageStreamTag"));
    }

    #[test]
    fn build_config_serializes_platform_fields() {
        let bc = build_config("web", &ServiceConfig::default(), &coordinates());
        let value = serde_json::to_value(&bc).expect("serialize");
        assert_eq!(value["kind"], "BuildConfig");
        assert_eq!(value["spec"]["runPolicy"], "Serial");
        assert_eq!(value["spec"]["source"]["git"]["ref"], "somebranch");
        assert_eq!(value["spec"]["source"]["contextDir"], "a/build");
        assert_eq!(value["spec"]["strategy"]["type"], "Docker");
        assert_eq!(value["spec"]["triggers"][1]["type"], "ImageChange");
    }

    #[test]
    fn build_config_is_idempotent() {
        let config = ServiceConfig::default();
        assert_eq!(
            build_config("web", &config, &coordinates()),
            build_config("web", &config, &coordinates())
        );
    }
}
