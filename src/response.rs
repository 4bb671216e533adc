//! Synthesized responses and the factories that produce them.

use crate::error::StubError;
use crate::request::Request;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Outcome handed back to the interception layer.
pub type StubResult = Result<Response, StubError>;

/// Produces the outcome for a matched request.
pub type ResponseFactory = Arc<dyn Fn(&Request) -> StubResult + Send + Sync>;

/// Factory that always returns the same outcome.
pub fn respond_with(result: StubResult) -> ResponseFactory {
    Arc::new(move |_: &Request| result.clone())
}

/// Factory that always fails with `error`.
pub fn error_response(error: StubError) -> ResponseFactory {
    respond_with(Err(error))
}

/// Artificial latency applied when the response is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Fixed(Duration),
    /// Uniformly random between `min` and `max` inclusive.
    Range { min: Duration, max: Duration },
}

impl Delay {
    /// Calculate the actual delay to apply.
    pub fn calculate(&self) -> Duration {
        match *self {
            Delay::Fixed(d) => d,
            Delay::Range { min, max } if max > min => {
                use rand::Rng;
                let mut rng = rand::thread_rng();
                let ms = rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
                Duration::from_millis(ms)
            }
            Delay::Range { min, .. } => min,
        }
    }
}

/// A successful HTTP response.
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub delay: Option<Delay>,
}

impl Response {
    /// Response with `status` and no headers or body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            delay: None,
        }
    }

    /// `200 OK`.
    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Plain-text body; sets `Content-Type` unless already present.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_default_content_type("text/plain")
            .with_body(text.into())
    }

    /// JSON body; sets `Content-Type` unless already present.
    pub fn with_json(self, json: &serde_json::Value) -> Self {
        self.with_default_content_type("application/json")
            .with_body(json.to_string())
    }

    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = Some(delay);
        self
    }

    /// First value of a header field, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn with_default_content_type(self, content_type: &str) -> Self {
        if self.header("content-type").is_some() {
            self
        } else {
            self.with_header("Content-Type", content_type)
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .field("delay", &self.delay)
            .finish()
    }
}
