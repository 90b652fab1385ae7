pub mod config;
pub mod types;

pub use config::{DriverConfig, EngineSettings, LifecycleSettings};
pub use types::{ContainerConfig, PortPair};
