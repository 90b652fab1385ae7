//! Container management subsystem.
//!
//! [`LifecycleDriver`] exposes one operation per container lifecycle
//! transition plus the image operations an orchestrator needs on a host:
//!
//! ```text
//! Absent --create--> Created --start--> Running --stop--> Exited --remove--> Absent
//!                                        |   ^
//!                                        +---+ restart / resize
//! ```
//!
//! The driver keeps no state of its own. Every call is a round trip to the
//! engine through an injected [`EngineClient`](crate::engine_client::EngineClient),
//! and every failure is reported as a [`DriverError`](crate::error_handling::types::DriverError)
//! that tells a transient engine outage apart from a permanent rejection.
//!
//! Example (non-running):
//! ```ignore
//! use docker_driver::configuration::{ContainerConfig, DriverConfig};
//! use docker_driver::container_management::LifecycleDriver;
//!
//! let driver = LifecycleDriver::connect(&DriverConfig::default()).await?;
//! let handle = driver.run(&ContainerConfig {
//!     image: "busybox".into(),
//!     command: vec!["sleep".into(), "300".into()],
//!     cpu_share: 0.5,
//!     ..Default::default()
//! }).await?;
//! let health = driver.check_health(&handle).await?;
//! println!("cpu {:.1}% mem {:.1}%", health.cpu_percent, health.memory_percent);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod lifecycle_driver;
pub mod types;

pub use lifecycle_driver::LifecycleDriver;
pub use types::{ContainerHandle, ContainerState};
