use async_trait::async_trait;
use futures::stream::BoxStream;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::container_management::types::ContainerState;
use crate::error_handling::types::EngineError;
use crate::health_metrics::types::StatsSnapshot;
use crate::resource_translation::types::{EngineCreateParams, EngineUpdateParams};

pub type ProgressStream<'a> = BoxStream<'a, Result<ProgressMessage, EngineError>>;
pub type ByteStream<'a> = BoxStream<'a, Result<Vec<u8>, EngineError>>;

/// One line of the engine's newline-delimited JSON progress output.
///
/// Build, pull and push all report through this shape. Unknown fields
/// (`progressDetail`, `errorDetail`, `id`) are ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProgressMessage {
    pub stream: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub aux: Option<AuxDetail>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AuxDetail {
    #[serde(rename = "Digest", alias = "digest")]
    pub digest: Option<String>,
    #[serde(rename = "ID", alias = "id")]
    pub id: Option<String>,
}

fn digest_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\bdigest: (sha256:[0-9a-f]{64})\b").ok())
        .as_ref()
}

impl ProgressMessage {
    /// Decodes one raw response line.
    pub fn from_line(line: &str) -> Result<Self, EngineError> {
        serde_json::from_str(line).map_err(|e| EngineError::Decode(format!("{}: {}", e, line)))
    }

    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Non-empty `error` field, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Content digest carried by this line, from `aux.Digest` or from a
    /// `digest: sha256:...` status line.
    pub fn digest(&self) -> Option<String> {
        if let Some(digest) = self
            .aux
            .as_ref()
            .and_then(|aux| aux.digest.as_deref())
            .filter(|d| !d.is_empty())
        {
            return Some(digest.to_string());
        }

        self.status
            .as_deref()
            .and_then(|status| digest_pattern()?.captures(status))
            .map(|captures| captures[1].to_string())
    }
}

/// Credentials forwarded verbatim with a push.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistryCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub server_address: Option<String>,
    pub identity_token: Option<String>,
}

/// Operations the driver needs from a container engine.
///
/// Implementations report failures as raw [`EngineError`]s; deciding whether a
/// 404 means a missing container or a missing image is the caller's business.
#[async_trait]
pub trait EngineClient: Send + Sync {
    async fn ping(&self) -> Result<(), EngineError>;

    /// `context` is a tar archive containing the Dockerfile and build inputs.
    fn build_image<'a>(&'a self, context: Vec<u8>, tag: &'a str) -> ProgressStream<'a>;

    fn pull_image<'a>(&'a self, reference: &'a str) -> ProgressStream<'a>;

    fn push_image<'a>(
        &'a self,
        reference: &'a str,
        credentials: Option<RegistryCredentials>,
    ) -> ProgressStream<'a>;

    /// Image as a tar archive, in chunks.
    fn save_image<'a>(&'a self, reference: &'a str) -> ByteStream<'a>;

    async fn list_images(&self) -> Result<Vec<String>, EngineError>;

    /// Ids of running containers.
    async fn list_containers(&self) -> Result<Vec<String>, EngineError>;

    async fn create_container(&self, params: EngineCreateParams) -> Result<String, EngineError>;

    async fn start_container(&self, id: &str) -> Result<(), EngineError>;

    async fn stop_container(&self, id: &str, timeout_secs: Option<i64>)
        -> Result<(), EngineError>;

    async fn restart_container(
        &self,
        id: &str,
        timeout_secs: Option<i64>,
    ) -> Result<(), EngineError>;

    async fn update_container(
        &self,
        id: &str,
        params: EngineUpdateParams,
    ) -> Result<(), EngineError>;

    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerState, EngineError>;

    /// One paired current/previous sample.
    async fn stats(&self, id: &str) -> Result<StatsSnapshot, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn decodes_stream_line() {
        let msg = ProgressMessage::from_line(r#"{"stream":"Step 1/2 : FROM busybox\n"}"#).unwrap();
        assert_eq!(msg.stream.as_deref(), Some("Step 1/2 : FROM busybox\n"));
        assert!(msg.error_message().is_none());
        assert!(msg.digest().is_none());
    }

    #[test]
    fn decodes_error_line() {
        let msg = ProgressMessage::from_line(
            r#"{"errorDetail":{},"error":"denied: requested access to the resource is denied"}"#,
        )
        .unwrap();
        assert_eq!(
            msg.error_message(),
            Some("denied: requested access to the resource is denied")
        );
    }

    #[test]
    fn empty_error_field_is_not_an_error() {
        let msg = ProgressMessage::from_line(r#"{"error":""}"#).unwrap();
        assert!(msg.error_message().is_none());
    }

    #[test]
    fn digest_from_aux_line() {
        let line = format!(
            r#"{{"progressDetail":{{}},"aux":{{"Tag":"latest","Digest":"{}","Size":528}}}}"#,
            DIGEST
        );
        let msg = ProgressMessage::from_line(&line).unwrap();
        assert_eq!(msg.digest().as_deref(), Some(DIGEST));
    }

    #[test]
    fn digest_from_push_status_line() {
        let msg = ProgressMessage::status(format!("latest: digest: {} size: 528", DIGEST));
        assert_eq!(msg.digest().as_deref(), Some(DIGEST));
    }

    #[test]
    fn digest_from_pull_status_line() {
        let msg = ProgressMessage::status(format!("Digest: {}", DIGEST));
        assert_eq!(msg.digest().as_deref(), Some(DIGEST));
    }

    #[test]
    fn build_aux_id_is_not_a_digest() {
        let msg =
            ProgressMessage::from_line(&format!(r#"{{"aux":{{"ID":"{}"}}}}"#, DIGEST)).unwrap();
        assert!(msg.digest().is_none());
        assert_eq!(msg.aux.and_then(|a| a.id).as_deref(), Some(DIGEST));
    }

    #[test]
    fn malformed_line_is_a_decode_error() {
        let result = ProgressMessage::from_line("{not json");
        assert!(matches!(result, Err(EngineError::Decode(_))));
    }
}
