use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::configuration::config::{DriverConfig, LifecycleSettings};
use crate::configuration::types::ContainerConfig;
use crate::container_management::types::{ContainerHandle, ContainerState};
use crate::engine_client::client_trait::{EngineClient, RegistryCredentials};
use crate::engine_client::docker_engine::DockerEngine;
use crate::engine_client::progress::{collect_bytes, drain_build, drain_pull, drain_push};
use crate::error_handling::types::{DriverError, EngineError};
use crate::health_metrics::calculator::{cpu_percent, memory_percent};
use crate::health_metrics::types::HealthReport;
use crate::resource_translation::translator::{translate, translate_resize};

/// Which kind of call produced an engine error; decides what a status code means.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operation {
    Create,
    Container,
    Image,
    Listing,
}

fn classify(err: EngineError, operation: Operation, target: &str) -> DriverError {
    match err {
        EngineError::Unreachable(message) => DriverError::EngineUnavailable(message),
        EngineError::Stream(message) => DriverError::StreamError(message),
        EngineError::Decode(message) => DriverError::MalformedResponse(message),
        EngineError::Status { code, message } => match (operation, code) {
            // Unknown image, duplicate name and malformed fields all mean the
            // parameters have to change before a retry can work.
            (Operation::Create, _) => DriverError::InvalidConfig(message),
            (Operation::Container, 404) => DriverError::ContainerNotFound(target.to_string()),
            (Operation::Image, 404) => DriverError::ImageNotFound(target.to_string()),
            (_, status) => DriverError::Rejected { status, message },
        },
    }
}

/// Drives container and image lifecycles on one engine.
///
/// Cheap to clone; clones share the same engine connection. The driver holds
/// no per-container state, so concurrent calls on the same handle are ordered
/// by the engine alone.
#[derive(Clone)]
pub struct LifecycleDriver {
    engine: Arc<dyn EngineClient>,
    lifecycle: LifecycleSettings,
}

impl LifecycleDriver {
    /// Creates a driver over an existing engine client with engine-default grace periods.
    pub fn new(engine: Arc<dyn EngineClient>) -> Self {
        Self::with_settings(engine, LifecycleSettings::default())
    }

    pub fn with_settings(engine: Arc<dyn EngineClient>, lifecycle: LifecycleSettings) -> Self {
        Self { engine, lifecycle }
    }

    /// Connects to the Docker engine described by `config`.
    pub async fn connect(config: &DriverConfig) -> Result<Self, DriverError> {
        let engine = DockerEngine::connect(&config.engine).await?;
        Ok(Self::with_settings(Arc::new(engine), config.lifecycle.clone()))
    }

    /// Checks that the engine answers.
    pub async fn ping(&self) -> Result<(), DriverError> {
        self.engine
            .ping()
            .await
            .map_err(|e| classify(e, Operation::Listing, "engine"))
    }

    /// Builds an image from a tar build context and tags it `tag`.
    ///
    /// Returns once the engine has finished the build; a build step that fails
    /// is reported as [`DriverError::StreamError`].
    pub async fn build_image(&self, context: Vec<u8>, tag: &str) -> Result<(), DriverError> {
        info!("Building image {} ({} bytes of context)", tag, context.len());
        drain_build(self.engine.build_image(context, tag))
            .await
            .map_err(|e| {
                error!("Build of image {} failed: {}", tag, e);
                classify(e, Operation::Image, tag)
            })?;
        info!("Built image {}", tag);
        Ok(())
    }

    /// Pulls `reference` and waits for the transfer to complete.
    ///
    /// Returns the content digest when the engine reports one.
    pub async fn pull_image(&self, reference: &str) -> Result<Option<String>, DriverError> {
        info!("Pulling image {}", reference);
        let digest = drain_pull(self.engine.pull_image(reference))
            .await
            .map_err(|e| {
                error!("Pull of image {} failed: {}", reference, e);
                classify(e, Operation::Image, reference)
            })?;
        info!("Pulled image {} (digest: {:?})", reference, digest);
        Ok(digest)
    }

    /// Pushes `reference` and returns the digest the registry assigned.
    pub async fn push_image(
        &self,
        reference: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<String, DriverError> {
        info!("Pushing image {}", reference);
        let digest = drain_push(self.engine.push_image(reference, credentials))
            .await
            .map_err(|e| {
                error!("Push of image {} failed: {}", reference, e);
                classify(e, Operation::Image, reference)
            })?;

        match digest {
            Some(digest) => {
                info!("Pushed image {} as {}", reference, digest);
                Ok(digest)
            }
            None => {
                error!("Push of image {} ended without a digest", reference);
                Err(DriverError::IncompleteResponse(format!(
                    "push of {} ended without a digest",
                    reference
                )))
            }
        }
    }

    /// Exports `reference` as a tar archive.
    pub async fn save_image(&self, reference: &str) -> Result<Vec<u8>, DriverError> {
        debug!("Saving image {}", reference);
        let archive = collect_bytes(self.engine.save_image(reference))
            .await
            .map_err(|e| classify(e, Operation::Image, reference))?;
        info!("Saved image {} ({} bytes)", reference, archive.len());
        Ok(archive)
    }

    /// Ids of local images, without the `sha256:` prefix. Order is engine-defined.
    pub async fn list_images(&self) -> Result<Vec<String>, DriverError> {
        let images = self
            .engine
            .list_images()
            .await
            .map_err(|e| classify(e, Operation::Listing, "images"))?;
        debug!("Listed {} images", images.len());
        Ok(images)
    }

    /// Handles of running containers. Order is engine-defined.
    pub async fn list_running_containers(&self) -> Result<Vec<ContainerHandle>, DriverError> {
        let ids = self
            .engine
            .list_containers()
            .await
            .map_err(|e| classify(e, Operation::Listing, "containers"))?;
        debug!("Listed {} running containers", ids.len());
        Ok(ids.into_iter().map(ContainerHandle::from).collect())
    }

    /// Creates a container from `config` without starting it.
    pub async fn create(&self, config: &ContainerConfig) -> Result<ContainerHandle, DriverError> {
        let params = translate(config);
        let label = if config.name.is_empty() {
            config.image.as_str()
        } else {
            config.name.as_str()
        };

        info!("Creating container {} from image {}", label, config.image);
        let id = self
            .engine
            .create_container(params)
            .await
            .map_err(|e| {
                error!("Failed to create container {}: {}", label, e);
                classify(e, Operation::Create, label)
            })?;

        info!("Created container {} ({})", label, id);
        Ok(ContainerHandle::from(id))
    }

    /// Starts a created or stopped container. The engine answers 304 for a
    /// container that is already running, which is success here.
    pub async fn start(&self, handle: &ContainerHandle) -> Result<(), DriverError> {
        info!("Starting container {}", handle);
        self.engine
            .start_container(handle.id())
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))
    }

    /// Creates and starts a container.
    ///
    /// If the start fails the container stays in the created state and the
    /// start error is returned; removing it is up to the caller.
    pub async fn run(&self, config: &ContainerConfig) -> Result<ContainerHandle, DriverError> {
        let handle = self.create(config).await?;
        if let Err(e) = self.start(&handle).await {
            warn!(
                "Container {} was created but failed to start: {}",
                handle, e
            );
            return Err(e);
        }
        Ok(handle)
    }

    /// Stops a running container. The engine treats stopping an already
    /// stopped container as success (304), so this is a no-op for one.
    pub async fn stop(&self, handle: &ContainerHandle) -> Result<(), DriverError> {
        info!("Stopping container {}", handle);
        self.engine
            .stop_container(handle.id(), self.lifecycle.stop_timeout_secs)
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))
    }

    /// Restarts a running or stopped container with a new process.
    pub async fn restart(&self, handle: &ContainerHandle) -> Result<(), DriverError> {
        info!("Restarting container {}", handle);
        self.engine
            .restart_container(handle.id(), self.lifecycle.restart_timeout_secs)
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))
    }

    /// Changes the memory limit (bytes) and CPU share (cores) of a live container.
    pub async fn resize(
        &self,
        handle: &ContainerHandle,
        memory_limit: i64,
        cpu_share: f64,
    ) -> Result<(), DriverError> {
        let params = translate_resize(memory_limit, cpu_share);
        info!(
            "Resizing container {} to memory={} nano_cpus={}",
            handle, params.memory, params.nano_cpus
        );
        self.engine
            .update_container(handle.id(), params)
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))
    }

    /// Removes a stopped or created container. A running container is not
    /// stopped first; the engine's refusal is returned instead.
    pub async fn remove(&self, handle: &ContainerHandle) -> Result<(), DriverError> {
        info!("Removing container {}", handle);
        self.engine
            .remove_container(handle.id())
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))
    }

    pub async fn state(&self, handle: &ContainerHandle) -> Result<ContainerState, DriverError> {
        let state = self
            .engine
            .inspect_container(handle.id())
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))?;
        debug!("Container {} is {:?}", handle, state);
        Ok(state)
    }

    /// Samples CPU and memory utilization of a running container.
    pub async fn check_health(
        &self,
        handle: &ContainerHandle,
    ) -> Result<HealthReport, DriverError> {
        if !self.state(handle).await?.is_running() {
            return Err(DriverError::NotRunning(handle.id().to_string()));
        }

        let snapshot = self
            .engine
            .stats(handle.id())
            .await
            .map_err(|e| classify(e, Operation::Container, handle.id()))?;

        let report = HealthReport {
            cpu_percent: cpu_percent(&snapshot.previous, &snapshot.current),
            memory_percent: memory_percent(&snapshot.memory),
            sampled_at: Utc::now(),
        };
        debug!(
            "Container {} health: cpu={:.2}% mem={:.2}%",
            handle, report.cpu_percent, report.memory_percent
        );
        Ok(report)
    }
}
