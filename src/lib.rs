//! Stub Networking
//!
//! An in-process HTTP request stubbing engine. Tests register stubs; the
//! networking layer hands every outgoing request to an interceptor, which
//! answers it from the first matching stub instead of the network.
//!
//! # Features
//!
//! - **Request Matching**: Match by scheme, host, path, extension, method,
//!   query items, headers and body (raw, JSON or form)
//! - **Composable Conditions**: AND, OR and NOT over any conditions, with
//!   traces showing which leaf failed
//! - **Ordered Registry**: First registered stub wins
//! - **Latency Simulation**: Fixed or random delays, cancelled by `stop()`
//! - **Failure Injection**: Answer with transport errors instead of responses
//! - **Stub Files**: Declare stubs in YAML
//!
//! # Example Configuration
//!
//! ```yaml
//! stubs:
//!   - id: hello-world
//!     request:
//!       url: https://api.example.com/hello
//!       method: GET
//!     response:
//!       status: 200
//!       body:
//!         type: json
//!         content:
//!           message: "Hello, World!"
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod matcher;
pub mod options;
pub mod registry;
pub mod request;
pub mod response;
pub mod stub;

pub use condition::{Condition, ConditionTrace};
pub use config::StubConfig;
pub use error::StubError;
pub use interceptor::{Interceptor, StubInterceptor};
pub use matcher::Matcher;
pub use options::{set_options, Options};
pub use registry::{default_registry, StubHandle, StubRegistry};
pub use request::{Method, QueryItem, Request};
pub use response::{Delay, Response, ResponseFactory, StubResult};
pub use stub::{stub, stub_url, Stub};
