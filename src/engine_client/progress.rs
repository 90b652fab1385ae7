//! Readers for the engine's streamed build/pull/push/save responses.
//!
//! Every reader consumes the stream to the end (or to its terminal line) so
//! that success is only reported once the engine has finished.

use futures::TryStreamExt;
use log::debug;

use super::client_trait::{ByteStream, ProgressStream};
use crate::error_handling::types::EngineError;

/// Reads a build stream to EOF. An `error` line fails the build.
pub async fn drain_build(mut stream: ProgressStream<'_>) -> Result<(), EngineError> {
    while let Some(msg) = stream.try_next().await? {
        if let Some(error) = msg.error_message() {
            return Err(EngineError::Stream(error.to_string()));
        }
        if let Some(line) = msg.stream.as_deref().or(msg.status.as_deref()) {
            debug!("[build] {}", line.trim_end());
        }
    }
    Ok(())
}

/// Reads a pull stream to EOF and returns the last digest the engine reported.
pub async fn drain_pull(mut stream: ProgressStream<'_>) -> Result<Option<String>, EngineError> {
    let mut digest = None;
    while let Some(msg) = stream.try_next().await? {
        if let Some(error) = msg.error_message() {
            return Err(EngineError::Stream(error.to_string()));
        }
        if let Some(found) = msg.digest() {
            digest = Some(found);
        }
        if let Some(status) = msg.status.as_deref() {
            debug!("[pull] {}", status);
        }
    }
    Ok(digest)
}

/// Reads a push stream until the first digest or error line.
///
/// `Ok(None)` means the stream ended without either.
pub async fn drain_push(mut stream: ProgressStream<'_>) -> Result<Option<String>, EngineError> {
    while let Some(msg) = stream.try_next().await? {
        if let Some(digest) = msg.digest() {
            return Ok(Some(digest));
        }
        if let Some(error) = msg.error_message() {
            return Err(EngineError::Stream(error.to_string()));
        }
        if let Some(status) = msg.status.as_deref() {
            debug!("[push] {}", status);
        }
    }
    Ok(None)
}

/// Collects a byte stream into one buffer.
pub async fn collect_bytes(mut stream: ByteStream<'_>) -> Result<Vec<u8>, EngineError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.try_next().await? {
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}
