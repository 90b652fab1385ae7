use log::debug;

use super::types::{EngineCreateParams, EngineUpdateParams, PortBinding};
use crate::configuration::types::ContainerConfig;

/// One core expressed in the engine's nanoCPU unit. Exactly representable as `f64`.
const NANO_CPUS_PER_CORE: f64 = 1_000_000_000.0;

/// Converts a fractional core count into a nanoCPU quota.
///
/// Out-of-range shares are not clamped. NaN maps to `0` and infinities saturate,
/// since neither has an integer quota.
pub fn nano_cpus_from_share(cpu_share: f64) -> i64 {
    (cpu_share * NANO_CPUS_PER_CORE).round() as i64
}

/// Inverse of [`nano_cpus_from_share`], up to rounding.
pub fn share_from_nano_cpus(nano_cpus: i64) -> f64 {
    nano_cpus as f64 / NANO_CPUS_PER_CORE
}

/// Builds create parameters from a caller configuration.
///
/// A port pair is only published when it names a container port; the host
/// side may be empty, in which case the engine picks the host port.
pub fn translate(config: &ContainerConfig) -> EngineCreateParams {
    let (exposed_ports, port_bindings) = match &config.port_pair {
        Some(pair) if !pair.is_empty() => {
            let binding = PortBinding {
                host_ip: None,
                host_port: non_empty(&pair.host_port),
            };
            (
                vec![pair.container_port.clone()],
                vec![(pair.container_port.clone(), vec![binding])],
            )
        }
        _ => (Vec::new(), Vec::new()),
    };

    let params = EngineCreateParams {
        name: non_empty(&config.name),
        image: config.image.clone(),
        cmd: if config.command.is_empty() {
            None
        } else {
            Some(config.command.clone())
        },
        env: if config.env.is_empty() {
            None
        } else {
            Some(config.env.clone())
        },
        exposed_ports,
        port_bindings,
        memory: config.memory_limit,
        nano_cpus: nano_cpus_from_share(config.cpu_share),
        network_mode: non_empty(&config.network_mode),
        tty: true,
    };

    debug!(
        "Translated config for image {}: memory={} nano_cpus={} ports={:?} network={:?}",
        params.image, params.memory, params.nano_cpus, params.exposed_ports, params.network_mode
    );
    params
}

/// Builds live-update parameters. Ports, network and env are fixed at creation.
pub fn translate_resize(memory_limit: i64, cpu_share: f64) -> EngineUpdateParams {
    EngineUpdateParams {
        memory: memory_limit,
        nano_cpus: nano_cpus_from_share(cpu_share),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
