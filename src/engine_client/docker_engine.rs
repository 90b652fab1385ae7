use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bollard::auth::DockerCredentials;
use bollard::container::{
    CPUStats, Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    MemoryStats, MemoryStatsStats, RemoveContainerOptions, RestartContainerOptions,
    StartContainerOptions, StatsOptions, StopContainerOptions, UpdateContainerOptions,
};
use bollard::image::{BuildImageOptions, CreateImageOptions, ListImagesOptions, PushImageOptions};
use bollard::models::{ContainerStateStatusEnum, HostConfig};
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::{StreamExt, TryStreamExt};
use log::{debug, info};

use super::client_trait::{
    AuxDetail, ByteStream, EngineClient, ProgressMessage, ProgressStream, RegistryCredentials,
};
use crate::configuration::config::{EngineEndpoint, EngineSettings};
use crate::container_management::types::ContainerState;
use crate::error_handling::types::{DriverError, EngineError};
use crate::health_metrics::types::{CpuCounters, MemoryCounters, StatsSnapshot};
use crate::resource_translation::types::{EngineCreateParams, EngineUpdateParams};

/// [`EngineClient`] backed by the Docker Engine API.
///
/// Holds one connection handle for its whole life; the API version is
/// negotiated once in [`DockerEngine::connect`].
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connects to the engine described by `settings` and negotiates the API version.
    pub async fn connect(settings: &EngineSettings) -> Result<Self, DriverError> {
        let endpoint = settings
            .endpoint()
            .map_err(|e| DriverError::InvalidConfig(e.to_string()))?;
        let timeout = settings.request_timeout_secs;

        debug!("Connecting to container engine at {:?}", endpoint);
        let docker = match &endpoint {
            EngineEndpoint::LocalDefaults => Docker::connect_with_local_defaults()
                .map(|docker| docker.with_timeout(Duration::from_secs(timeout))),
            EngineEndpoint::Socket(path) => {
                Docker::connect_with_socket(path, timeout, API_DEFAULT_VERSION)
            }
            EngineEndpoint::Http(addr) => {
                Docker::connect_with_http(addr, timeout, API_DEFAULT_VERSION)
            }
        }
        .map_err(|e| DriverError::EngineUnavailable(e.to_string()))?;

        let docker = docker
            .negotiate_version()
            .await
            .map_err(|e| DriverError::EngineUnavailable(e.to_string()))?;

        info!("Connected to container engine at {:?}", endpoint);
        Ok(Self { docker })
    }

    /// Wraps an already configured client.
    pub fn from_docker(docker: Docker) -> Self {
        Self { docker }
    }
}

/// Splits `repository[:tag]` into repository and tag. Digest references keep
/// no tag. A colon before the last `/` belongs to a registry port.
pub(crate) fn split_reference(reference: &str) -> (String, Option<String>) {
    if let Some((repository, _digest)) = reference.split_once('@') {
        return (repository.to_string(), None);
    }
    let name_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    match reference[name_start..].rfind(':') {
        Some(offset) => {
            let split = name_start + offset;
            (
                reference[..split].to_string(),
                Some(reference[split + 1..].to_string()),
            )
        }
        None => (reference.to_string(), None),
    }
}

/// Drops the `sha256:` prefix the engine puts on image ids.
pub(crate) fn short_image_id(id: &str) -> String {
    id.strip_prefix("sha256:").unwrap_or(id).to_string()
}

fn cpu_counters(stats: &CPUStats) -> CpuCounters {
    CpuCounters {
        total_usage: stats.cpu_usage.total_usage,
        system_usage: stats.system_cpu_usage.unwrap_or(0),
        online_cpus: stats.online_cpus.unwrap_or(0),
        per_cpu_usage: stats.cpu_usage.percpu_usage.clone().unwrap_or_default(),
    }
}

fn memory_counters(stats: &MemoryStats) -> MemoryCounters {
    // cgroup v2 reports no `cache`; inactive file pages are its page-cache figure.
    let cache = match &stats.stats {
        Some(MemoryStatsStats::V1(v1)) => v1.cache,
        Some(MemoryStatsStats::V2(v2)) => v2.inactive_file,
        None => 0,
    };
    MemoryCounters {
        usage: stats.usage.unwrap_or(0),
        cache,
        limit: stats.limit.unwrap_or(0),
    }
}

fn container_state(status: Option<ContainerStateStatusEnum>) -> ContainerState {
    match status {
        Some(ContainerStateStatusEnum::CREATED) => ContainerState::Created,
        Some(ContainerStateStatusEnum::RUNNING) => ContainerState::Running,
        Some(ContainerStateStatusEnum::PAUSED) => ContainerState::Paused,
        Some(ContainerStateStatusEnum::RESTARTING) => ContainerState::Restarting,
        Some(ContainerStateStatusEnum::REMOVING) => ContainerState::Removing,
        Some(ContainerStateStatusEnum::EXITED) => ContainerState::Exited,
        Some(ContainerStateStatusEnum::DEAD) => ContainerState::Dead,
        Some(ContainerStateStatusEnum::EMPTY) | None => ContainerState::Unknown,
    }
}

fn container_config(params: EngineCreateParams) -> Config<String> {
    let exposed_ports = params
        .exposed_ports
        .into_iter()
        .map(|port| (port, HashMap::new()))
        .collect::<HashMap<_, _>>();

    let port_bindings = params
        .port_bindings
        .into_iter()
        .map(|(port, bindings)| {
            let bindings = bindings
                .into_iter()
                .map(|binding| bollard::models::PortBinding {
                    host_ip: binding.host_ip,
                    host_port: binding.host_port,
                })
                .collect::<Vec<_>>();
            (port, Some(bindings))
        })
        .collect::<HashMap<_, _>>();

    let host_config = HostConfig {
        memory: Some(params.memory),
        nano_cpus: Some(params.nano_cpus),
        network_mode: params.network_mode,
        port_bindings: if port_bindings.is_empty() {
            None
        } else {
            Some(port_bindings)
        },
        ..Default::default()
    };

    Config {
        image: Some(params.image),
        cmd: params.cmd,
        env: params.env,
        tty: Some(params.tty),
        exposed_ports: if exposed_ports.is_empty() {
            None
        } else {
            Some(exposed_ports)
        },
        host_config: Some(host_config),
        ..Default::default()
    }
}

#[async_trait]
impl EngineClient for DockerEngine {
    async fn ping(&self) -> Result<(), EngineError> {
        self.docker.ping().await?;
        Ok(())
    }

    fn build_image<'a>(&'a self, context: Vec<u8>, tag: &'a str) -> ProgressStream<'a> {
        let options = BuildImageOptions {
            t: tag.to_string(),
            rm: true,
            ..Default::default()
        };
        self.docker
            .build_image(options, None, Some(context.into()))
            .map(|item| {
                item.map(|info| ProgressMessage {
                    stream: info.stream,
                    status: info.status,
                    error: info.error,
                    aux: info.aux.map(|aux| AuxDetail {
                        digest: None,
                        id: aux.id,
                    }),
                })
                .map_err(EngineError::from)
            })
            .boxed()
    }

    fn pull_image<'a>(&'a self, reference: &'a str) -> ProgressStream<'a> {
        let options = CreateImageOptions {
            from_image: reference.to_string(),
            ..Default::default()
        };
        self.docker
            .create_image(Some(options), None, None)
            .map(|item| {
                item.map(|info| ProgressMessage {
                    status: info.status,
                    error: info.error,
                    ..Default::default()
                })
                .map_err(EngineError::from)
            })
            .boxed()
    }

    fn push_image<'a>(
        &'a self,
        reference: &'a str,
        credentials: Option<RegistryCredentials>,
    ) -> ProgressStream<'a> {
        let (repository, tag) = split_reference(reference);
        let options = tag.map(|tag| PushImageOptions { tag });
        let credentials = credentials.map(|c| DockerCredentials {
            username: c.username,
            password: c.password,
            serveraddress: c.server_address,
            identitytoken: c.identity_token,
            ..Default::default()
        });
        self.docker
            .push_image(&repository, options, credentials)
            .map(|item| {
                item.map(|info| ProgressMessage {
                    status: info.status,
                    error: info.error,
                    ..Default::default()
                })
                .map_err(EngineError::from)
            })
            .boxed()
    }

    fn save_image<'a>(&'a self, reference: &'a str) -> ByteStream<'a> {
        self.docker
            .export_image(reference)
            .map(|item| item.map(|chunk| chunk.to_vec()).map_err(EngineError::from))
            .boxed()
    }

    async fn list_images(&self) -> Result<Vec<String>, EngineError> {
        let images = self
            .docker
            .list_images(Some(ListImagesOptions::<String>::default()))
            .await?;
        Ok(images
            .iter()
            .map(|image| short_image_id(&image.id))
            .collect())
    }

    async fn list_containers(&self) -> Result<Vec<String>, EngineError> {
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions::<String>::default()))
            .await?;
        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    async fn create_container(&self, params: EngineCreateParams) -> Result<String, EngineError> {
        let options = params.name.clone().map(|name| CreateContainerOptions {
            name,
            platform: None,
        });
        let response = self
            .docker
            .create_container(options, container_config(params))
            .await?;
        for warning in &response.warnings {
            debug!("Engine warning for container {}: {}", response.id, warning);
        }
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &str,
        timeout_secs: Option<i64>,
    ) -> Result<(), EngineError> {
        let options = timeout_secs.map(|t| StopContainerOptions { t });
        self.docker.stop_container(id, options).await?;
        Ok(())
    }

    async fn restart_container(
        &self,
        id: &str,
        timeout_secs: Option<i64>,
    ) -> Result<(), EngineError> {
        let options = timeout_secs.map(|t| RestartContainerOptions { t: t as isize });
        self.docker.restart_container(id, options).await?;
        Ok(())
    }

    async fn update_container(
        &self,
        id: &str,
        params: EngineUpdateParams,
    ) -> Result<(), EngineError> {
        let options = UpdateContainerOptions::<String> {
            memory: Some(params.memory),
            nano_cpus: Some(params.nano_cpus),
            ..Default::default()
        };
        self.docker.update_container(id, options).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .remove_container(id, None::<RemoveContainerOptions>)
            .await?;
        Ok(())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerState, EngineError> {
        let response = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        Ok(container_state(response.state.and_then(|s| s.status)))
    }

    async fn stats(&self, id: &str) -> Result<StatsSnapshot, EngineError> {
        let options = StatsOptions {
            stream: false,
            one_shot: false,
        };
        let mut stream = Box::pin(self.docker.stats(id, Some(options)));
        let stats = stream
            .try_next()
            .await?
            .ok_or_else(|| EngineError::Decode(format!("no stats returned for {}", id)))?;

        Ok(StatsSnapshot {
            previous: cpu_counters(&stats.precpu_stats),
            current: cpu_counters(&stats.cpu_stats),
            memory: memory_counters(&stats.memory_stats),
        })
    }
}
