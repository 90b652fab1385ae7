//! Resource translation.
//!
//! Turns a caller's [`ContainerConfig`](crate::configuration::ContainerConfig) into the
//! parameters the engine expects on create and live update. Everything here is pure:
//! no I/O, no validation, no error path.

pub mod translator;
pub mod types;

pub use translator::{nano_cpus_from_share, share_from_nano_cpus, translate, translate_resize};
pub use types::{EngineCreateParams, EngineUpdateParams, PortBinding};
