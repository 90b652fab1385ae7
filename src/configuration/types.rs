use serde::{Deserialize, Serialize};

/// Published port: container side and host side, both in engine port-spec
/// form (`"80"`, `"80/tcp"`, `"53/udp"` for the container side).
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct PortPair {
    pub container_port: String,
    pub host_port: String,
}

impl PortPair {
    pub fn new(container_port: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            container_port: container_port.into(),
            host_port: host_port.into(),
        }
    }

    /// A pair without a container port publishes nothing.
    pub fn is_empty(&self) -> bool {
        self.container_port.is_empty()
    }
}

/// Caller-supplied description of a container to create.
///
/// Values are forwarded to the engine as given; nothing here is validated or
/// clamped, the engine is the one that accepts or rejects them.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Desired container name. Empty lets the engine pick one.
    pub name: String,
    /// `repository[:tag]` or `repository@sha256:<digest>`.
    pub image: String,
    pub port_pair: Option<PortPair>,
    /// Empty means the image's default entrypoint/command.
    pub command: Vec<String>,
    /// Bytes, `0` is unlimited.
    pub memory_limit: i64,
    /// Fraction of one core (`0.5` is half a core, `2.0` two cores).
    pub cpu_share: f64,
    /// Network mode or network name. Empty means engine default.
    pub network_mode: String,
    /// `KEY=VALUE` entries.
    pub env: Vec<String>,
}
