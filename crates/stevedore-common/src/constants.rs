//! Naming conventions and defaults for generated objects.

/// Label key binding every generated object to its service.
pub const SERVICE_LABEL: &str = "io.stevedore.service";

/// Default replica count for long-running services.
pub const DEFAULT_REPLICAS: u32 = 1;

/// Default compose file name.
pub const DEFAULT_INPUT_FILE: &str = "docker-compose.yml";

/// Image tag used when an image reference carries none.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Suffix every normalized repository URL ends with.
pub const GIT_SUFFIX: &str = ".git";

/// Storage requested by each generated persistent volume claim.
pub const DEFAULT_CLAIM_SIZE: &str = "100Mi";

/// API version of platform-specific objects.
pub const OPENSHIFT_API_VERSION: &str = "v1";

