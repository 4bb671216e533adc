//! Declarative stub files.
//!
//! Defines YAML stub definitions, their validation, and installation into a
//! [`StubRegistry`].

use crate::error::StubError;
use crate::options::{self, Options};
use crate::registry::{StubHandle, StubRegistry};
use crate::request::Method;
use crate::response::{Delay, Response};
use crate::stub::Stub;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::info;

/// Main configuration: an ordered list of stubs plus debug settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StubConfig {
    /// Stubs in priority order
    #[serde(default)]
    pub stubs: Vec<StubDefinition>,

    /// Debug settings
    #[serde(default)]
    pub settings: Settings,
}

impl StubConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for (i, stub) in self.stubs.iter().enumerate() {
            stub.validate()
                .map_err(|e| anyhow::anyhow!("Stub {}: {}", i, e))?;
            if !seen.insert(stub.id.as_str()) {
                anyhow::bail!("Stub {}: duplicate id '{}'", i, stub.id);
            }
        }
        Ok(())
    }

    /// Register every enabled stub, in file order.
    pub fn install(&self, registry: &StubRegistry) -> anyhow::Result<Vec<StubHandle>> {
        let stubs = self
            .stubs
            .iter()
            .filter(|def| def.enabled)
            .map(|def| {
                def.to_stub()
                    .map_err(|e| anyhow::anyhow!("Stub '{}': {}", def.id, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let handles: Vec<_> = stubs.into_iter().map(|stub| registry.register(stub)).collect();
        info!(
            installed = handles.len(),
            skipped = self.stubs.len() - handles.len(),
            "Stub file installed"
        );
        Ok(handles)
    }
}

/// Debug settings mirrored into [`Options`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Trace every resolution
    #[serde(default)]
    pub print_debug_log: bool,

    /// Dump expected vs. actual for every comparison
    #[serde(default)]
    pub debug_conditions: bool,
}

impl Settings {
    /// Make these settings the process-wide options.
    pub fn apply(&self) {
        options::set_options(Options {
            print_debug_log: self.print_debug_log,
            debug_conditions: self.debug_conditions,
        });
    }
}

/// A single stub definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubDefinition {
    /// Unique identifier for this stub
    pub id: String,

    /// Optional name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Request constraints (empty = match everything)
    #[serde(default)]
    pub request: RequestSpec,

    /// Response to return
    #[serde(default)]
    pub response: Option<ResponseDefinition>,

    /// Failure to return instead of a response
    #[serde(default)]
    pub error: Option<ErrorDefinition>,

    /// Whether this stub is installed
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl StubDefinition {
    /// Validate the stub definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_empty() {
            anyhow::bail!("Stub id cannot be empty");
        }
        if self.response.is_some() && self.error.is_some() {
            anyhow::bail!("Stub cannot define both response and error");
        }
        self.request.validate()?;
        if let Some(response) = &self.response {
            response.validate()?;
        }
        Ok(())
    }

    /// Build the stub this definition describes.
    pub fn to_stub(&self) -> anyhow::Result<Stub> {
        let stub = self.request.to_stub()?;
        let stub = match (&self.response, &self.error) {
            (Some(response), _) => stub.respond_with(response.to_response()?),
            (None, Some(error)) => stub.respond_error(error.to_error()),
            (None, None) => stub,
        };
        Ok(stub)
    }
}

/// Request constraints. Every field present is ANDed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RequestSpec {
    /// URL decomposed into scheme/host/path/query constraints
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub method: Option<Method>,

    #[serde(default)]
    pub scheme: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    /// Path extension without the dot
    #[serde(default)]
    pub extension: Option<String>,

    /// Query parameters; `null` = present with any value
    #[serde(default)]
    pub query: BTreeMap<String, Option<String>>,

    /// Header fields; `null` = present with any value
    #[serde(default)]
    pub headers: BTreeMap<String, Option<String>>,

    #[serde(default)]
    pub body: Option<BodySpec>,
}

impl RequestSpec {
    /// Validate the request constraints.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(body) = &self.body {
            body.validate()?;
        }
        Ok(())
    }

    fn to_stub(&self) -> anyhow::Result<Stub> {
        let mut stub = match &self.url {
            Some(url) => Stub::for_url(url, self.method.clone()),
            None => match &self.method {
                Some(method) => Stub::new().method(method.clone()),
                None => Stub::new(),
            },
        };
        if let Some(scheme) = &self.scheme {
            stub = stub.scheme(scheme.as_str());
        }
        if let Some(host) = &self.host {
            stub = stub.host(host.as_str());
        }
        if let Some(path) = &self.path {
            stub = stub.path(path.as_str());
        }
        if let Some(ext) = &self.extension {
            stub = stub.path_extension(ext.as_str());
        }
        if !self.query.is_empty() {
            stub = stub.query_params(self.query.clone());
        }
        for (name, value) in &self.headers {
            stub = match value {
                Some(value) => stub.header_value(name.as_str(), value.as_str()),
                None => stub.header(name.as_str()),
            };
        }
        if let Some(body) = &self.body {
            stub = body.apply(stub)?;
        }
        Ok(stub)
    }
}

/// Request body constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodySpec {
    /// Exact text body
    Text { content: String },
    /// Exact binary body, base64 encoded
    Base64 { content: String },
    /// JSON-equal body
    Json { content: serde_json::Value },
    /// Form body containing these fields (`null` = any value)
    Form { fields: BTreeMap<String, Option<String>> },
}

impl BodySpec {
    /// Validate the body constraint.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let BodySpec::Base64 { content } = self {
            decode_base64(content)?;
        }
        Ok(())
    }

    fn apply(&self, stub: Stub) -> anyhow::Result<Stub> {
        Ok(match self {
            BodySpec::Text { content } => stub.body(content.as_bytes()),
            BodySpec::Base64 { content } => stub.body(decode_base64(content)?),
            BodySpec::Json { content } => stub.json_body(content.clone()),
            BodySpec::Form { fields } => stub.form_body(fields.clone()),
        })
    }
}

/// Response definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseDefinition {
    /// HTTP status code
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Response body
    #[serde(default)]
    pub body: Option<ResponseBody>,

    /// Latency simulation
    #[serde(default)]
    pub delay: Option<DelayConfig>,
}

fn default_status() -> u16 {
    200
}

impl ResponseDefinition {
    /// Validate the response definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.status < 100 || self.status > 599 {
            anyhow::bail!("Invalid status code: {}", self.status);
        }
        if let Some(delay) = &self.delay {
            delay.validate()?;
        }
        match &self.body {
            Some(ResponseBody::Base64 { content }) => {
                decode_base64(content)?;
            }
            Some(ResponseBody::File { path }) if !std::path::Path::new(path).is_file() => {
                anyhow::bail!("Response body file not found: {}", path);
            }
            _ => {}
        }
        Ok(())
    }

    /// Build the response, reading file bodies now.
    pub fn to_response(&self) -> anyhow::Result<Response> {
        let mut response = Response::new(self.status);
        for (name, value) in &self.headers {
            response = response.with_header(name.as_str(), value.as_str());
        }
        if let Some(body) = &self.body {
            if response.header("content-type").is_none() {
                response = response.with_header("Content-Type", body.content_type());
            }
            response = response.with_body(body.to_bytes()?);
        }
        if let Some(delay) = &self.delay {
            response = response.with_delay(delay.to_delay());
        }
        Ok(response)
    }
}

/// Response body configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    /// Plain text body
    Text { content: String },
    /// JSON body
    Json { content: serde_json::Value },
    /// Base64 encoded binary
    Base64 { content: String },
    /// Load from file
    File { path: String },
}

impl ResponseBody {
    /// Get the body content as bytes.
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        match self {
            ResponseBody::Text { content } => Ok(content.as_bytes().to_vec()),
            ResponseBody::Json { content } => Ok(serde_json::to_vec(content)?),
            ResponseBody::Base64 { content } => decode_base64(content),
            ResponseBody::File { path } => std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path, e)),
        }
    }

    /// Get content type for this body.
    pub fn content_type(&self) -> &'static str {
        match self {
            ResponseBody::Text { .. } => "text/plain",
            ResponseBody::Json { .. } => "application/json",
            ResponseBody::Base64 { .. } => "application/octet-stream",
            ResponseBody::File { .. } => "application/octet-stream",
        }
    }
}

/// Delay/latency simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelayConfig {
    /// Fixed delay in milliseconds
    #[serde(default)]
    pub fixed_ms: u64,

    /// Minimum delay for random range (ms)
    #[serde(default)]
    pub min_ms: u64,

    /// Maximum delay for random range (ms)
    #[serde(default)]
    pub max_ms: u64,
}

impl DelayConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fixed_ms == 0 && self.max_ms != 0 && self.min_ms > self.max_ms {
            anyhow::bail!("Delay min_ms ({}) exceeds max_ms ({})", self.min_ms, self.max_ms);
        }
        Ok(())
    }

    pub fn to_delay(&self) -> Delay {
        match (self.fixed_ms, self.max_ms) {
            (0, 0) => Delay::Fixed(Duration::from_millis(self.min_ms)),
            (0, max) => Delay::Range {
                min: Duration::from_millis(self.min_ms),
                max: Duration::from_millis(max),
            },
            (fixed, _) => Delay::Fixed(Duration::from_millis(fixed)),
        }
    }
}

/// Simulated failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorDefinition {
    /// Network error with detail
    TransportFailure {
        #[serde(default)]
        detail: Option<String>,
    },
    /// Matched-but-unimplemented
    Unimplemented,
}

impl ErrorDefinition {
    pub fn to_error(&self) -> StubError {
        match self {
            ErrorDefinition::TransportFailure { detail } => StubError::transport(
                detail
                    .clone()
                    .unwrap_or_else(|| "simulated failure".to_string()),
            ),
            ErrorDefinition::Unimplemented => StubError::Unimplemented,
        }
    }
}

fn decode_base64(content: &str) -> anyhow::Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(content)
        .map_err(|e| anyhow::anyhow!("Invalid base64: {}", e))
}
