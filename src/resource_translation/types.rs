//! Engine-facing parameter types produced by the translator.

/// Host side of a published port.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortBinding {
    pub host_ip: Option<String>,
    /// `None` lets the engine choose an ephemeral host port.
    pub host_port: Option<String>,
}

/// Everything the engine needs to create a container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineCreateParams {
    /// `None` lets the engine assign a name.
    pub name: Option<String>,
    pub image: String,
    pub cmd: Option<Vec<String>>,
    pub env: Option<Vec<String>>,
    /// Container-side port specs to expose.
    pub exposed_ports: Vec<String>,
    /// Container-side port spec to host bindings.
    pub port_bindings: Vec<(String, Vec<PortBinding>)>,
    pub memory: i64,
    pub nano_cpus: i64,
    /// `None` is the engine's default network, not "no networking".
    pub network_mode: Option<String>,
    pub tty: bool,
}

/// Resource limits applied to a live container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineUpdateParams {
    pub memory: i64,
    pub nano_cpus: i64,
}
