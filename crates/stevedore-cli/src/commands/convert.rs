//! `stevedore convert` — Convert a normalized project to OpenShift objects.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use stevedore_common::config::{ConvertOptions, OutputFormat};
use stevedore_common::constants::{DEFAULT_INPUT_FILE, DEFAULT_REPLICAS};
use stevedore_common::types::Project;
use stevedore_transform::scm::GitCli;
use stevedore_transform::unsupported::unsupported_fields;

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Normalized project file (YAML or JSON).
    #[arg(default_value = "stevedore.yml")]
    pub project: PathBuf,

    /// Compose file the project was derived from; build contexts are
    /// resolved against its directory.
    #[arg(long, default_value = DEFAULT_INPUT_FILE)]
    pub compose_file: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit a JSON `List` instead of YAML documents.
    #[arg(long)]
    pub json: bool,

    /// Replica count for long-running services (at least 1).
    #[arg(
        long,
        default_value_t = DEFAULT_REPLICAS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub replicas: u32,

    /// Repository to build from instead of the current git remote.
    #[arg(long, env = "STEVEDORE_BUILD_REPO")]
    pub build_repo: Option<String>,

    /// Branch to build from instead of the current git branch.
    #[arg(long, env = "STEVEDORE_BUILD_BRANCH")]
    pub build_branch: Option<String>,

    /// Use emptyDir volumes instead of persistent volume claims.
    #[arg(long = "emptyvols")]
    pub empty_volumes: bool,
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            input_file: self.compose_file.clone(),
            replicas: self.replicas,
            output_format: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Yaml
            },
            build_repo: self.build_repo.clone(),
            build_branch: self.build_branch.clone(),
            empty_volumes: self.empty_volumes,
        }
    }
}

/// Executes the `convert` command.
///
/// Services that fail to convert are logged and skipped.
///
/// # Errors
///
/// Returns an error if the project cannot be read or parsed, if every
/// service failed, or if the output cannot be written.
pub fn execute(args: ConvertArgs) -> anyhow::Result<()> {
    tracing::info!(path = %args.project.display(), "converting project");

    if !args.project.exists() {
        anyhow::bail!("file not found: {}", args.project.display());
    }
    let content = std::fs::read_to_string(&args.project)?;
    let project: Project = serde_yaml::from_str(&content)?;
    let options = args.options();

    warn_unsupported(&project);

    let git = GitCli::locate();
    if !git.is_available() {
        tracing::debug!("git not found on PATH");
    }
    let conversion = stevedore_transform::transform(&project, &options, git);

    for failure in &conversion.failures {
        tracing::warn!(error = %failure, "skipping service");
    }
    if !project.services.is_empty() && conversion.failures.len() == project.services.len() {
        anyhow::bail!("no service could be converted");
    }

    let rendered = crate::output::render(&conversion.objects, options.output_format)?;

    if let Some(ref out_path) = args.output {
        std::fs::write(out_path, &rendered)?;
        tracing::info!(
            path = %out_path.display(),
            objects = conversion.objects.len(),
            "wrote objects"
        );
    } else {
        std::io::stdout().lock().write_all(rendered.as_bytes())?;
    }

    Ok(())
}

/// Warns once per key that the target platform cannot represent.
fn warn_unsupported(project: &Project) {
    let keys: BTreeSet<&str> = project
        .services
        .values()
        .flat_map(unsupported_fields)
        .collect();
    for key in keys {
        tracing::warn!(key, "OpenShift has no equivalent for this key; ignoring");
    }
}
