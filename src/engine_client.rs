//! Container engine access.
//!
//! [`EngineClient`] is the capability set the lifecycle driver needs from the
//! engine. [`DockerEngine`] implements it over a single long-lived `bollard`
//! connection; tests substitute an in-memory engine.

pub mod client_trait;
pub mod docker_engine;
pub mod progress;

pub use client_trait::{
    AuxDetail, ByteStream, EngineClient, ProgressMessage, ProgressStream, RegistryCredentials,
};
pub use docker_engine::DockerEngine;
