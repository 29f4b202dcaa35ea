//! Object graph assembly.
//!
//! Services are converted one at a time, each in the same sequence:
//! build objects (only when a build context is declared), core objects,
//! reference linking, then appending to the shared graph. A failing service
//! contributes nothing to the graph and does not stop the others.

use std::path::Path;

use stevedore_common::config::ConvertOptions;
use stevedore_common::error::{Result, StevedoreError};
use stevedore_common::types::{Project, ServiceConfig};

use crate::builders::build::{BuildCoordinates, build_config};
use crate::builders::deployment::{deployment_config, image_stream};
use crate::builders::pod::pod;
use crate::builders::route::route;
use crate::builders::service::{first_port, service};
use crate::builders::volume::ServiceVolumes;
use crate::link::link_references;
use crate::objects::{OutputGraph, ResourceObject};
use crate::path::{compose_file_directory, relative_build_context};
use crate::scm::SourceControl;

/// Converts services into an ordered object graph.
#[derive(Debug)]
pub struct Assembler<'a, S: SourceControl> {
    options: &'a ConvertOptions,
    scm: S,
    graph: OutputGraph,
}

impl<'a, S: SourceControl> Assembler<'a, S> {
    /// Creates an assembler with an empty graph.
    pub const fn new(options: &'a ConvertOptions, scm: S) -> Self {
        Self {
            options,
            scm,
            graph: OutputGraph::new(),
        }
    }

    /// Converts one service and appends its objects to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`StevedoreError::Service`] wrapping the originating failure.
    /// The graph is left untouched in that case.
    pub fn add_service(&mut self, name: &str, config: &ServiceConfig) -> Result<()> {
        let objects = self
            .convert_service(name, config)
            .map_err(|e| e.for_service(name))?;
        tracing::info!(service = name, objects = objects.len(), "converted service");
        self.graph.append(objects);
        Ok(())
    }

    /// Returns the objects appended so far.
    pub const fn graph(&self) -> &OutputGraph {
        &self.graph
    }

    /// Consumes the assembler, returning the graph.
    pub fn finish(self) -> OutputGraph {
        self.graph
    }

    fn convert_service(&self, name: &str, config: &ServiceConfig) -> Result<Vec<ResourceObject>> {
        validate_ports(config)?;
        let volumes = ServiceVolumes::resolve(name, config, self.options.empty_volumes)?;

        if config.restart_policy().is_one_shot() {
            if config.has_build() {
                tracing::debug!(service = name, "ignoring build context of one-shot service");
            }
            let mut objects = vec![ResourceObject::from(pod(name, config, &volumes))];
            objects.extend(volumes.claims.into_iter().map(ResourceObject::from));
            link_references(&mut objects)?;
            return Ok(objects);
        }

        let mut objects: Vec<ResourceObject> = Vec::new();

        if config.has_build() {
            let coordinates = self.build_coordinates(config)?;
            tracing::info!(
                service = name,
                repo = %coordinates.repository_url,
                branch = %coordinates.branch,
                context = %coordinates.context_dir,
                "creating build config"
            );
            objects.push(build_config(name, config, &coordinates).into());
        }

        objects.push(deployment_config(name, config, self.options.replicas, &volumes).into());
        objects.push(image_stream(name, config).into());

        if !config.ports.is_empty() {
            let svc = service(name, config);
            let target_port = first_port(&svc);
            objects.push(svc.into());
            if let (Some(port), Some(_)) = (target_port, config.expose_directive()) {
                objects.push(route(name, config, port).into());
            }
        } else if config.expose_directive().is_some() {
            tracing::debug!(service = name, "no ports declared, skipping route");
        }

        objects.extend(volumes.claims.into_iter().map(ResourceObject::from));

        link_references(&mut objects)?;
        Ok(objects)
    }

    fn build_coordinates(&self, config: &ServiceConfig) -> Result<BuildCoordinates> {
        let compose_dir = compose_file_directory(&self.options.input_file)?;
        let context_dir = relative_build_context(&config.build, &compose_dir, &self.scm)?;
        let branch = self.resolve_branch(&compose_dir)?;
        let repository_url = match &self.options.build_repo {
            Some(repo) => repo.clone(),
            None => self.scm.current_remote_url(&compose_dir)?,
        };
        Ok(BuildCoordinates {
            repository_url,
            branch,
            context_dir,
        })
    }

    fn resolve_branch(&self, compose_dir: &Path) -> Result<String> {
        match &self.options.build_branch {
            Some(branch) => Ok(branch.clone()),
            None => self.scm.current_branch(compose_dir),
        }
    }
}

fn validate_ports(config: &ServiceConfig) -> Result<()> {
    for mapping in &config.ports {
        if mapping.container_port == 0 {
            return Err(StevedoreError::InvalidInput {
                message: "container port 0 is not a valid port".into(),
            });
        }
        if mapping.host_port == Some(0) {
            return Err(StevedoreError::InvalidInput {
                message: format!(
                    "host port 0 is not a valid port (container port {})",
                    mapping.container_port
                ),
            });
        }
    }
    Ok(())
}

/// Result of converting a whole project.
#[derive(Debug, Default)]
pub struct Conversion {
    /// Objects of every service that converted successfully.
    pub objects: OutputGraph,
    /// One error per service that failed, in service order.
    pub failures: Vec<StevedoreError>,
}

/// Converts every service of `project`, collecting per-service failures.
pub fn transform<S: SourceControl>(
    project: &Project,
    options: &ConvertOptions,
    scm: S,
) -> Conversion {
    let mut assembler = Assembler::new(options, scm);
    let mut failures = Vec::new();
    for (name, config) in &project.services {
        if let Err(e) = assembler.add_service(name, config) {
            failures.push(e);
        }
    }
    Conversion {
        objects: assembler.finish(),
        failures,
    }
}
