//! The stub registry: ordered stubs and request resolution.
//!
//! Registration order is priority order. Resolution walks the stubs in
//! that order under a read lock and stops at the first stub whose condition
//! holds; registration, removal and reset take the write lock, so a
//! resolution never observes a half-updated list.

use crate::error::StubError;
use crate::options;
use crate::request::Request;
use crate::response::StubResult;
use crate::stub::Stub;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

static DEFAULT_REGISTRY: Lazy<Arc<StubRegistry>> = Lazy::new(|| Arc::new(StubRegistry::new()));

/// The process-wide registry used by [`Stub::register`] and
/// [`StubInterceptor::default`](crate::StubInterceptor).
pub fn default_registry() -> Arc<StubRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// Identifies a registered stub for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StubHandle(u64);

impl fmt::Display for StubHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stub#{}", self.0)
    }
}

struct RegisteredStub {
    handle: StubHandle,
    stub: Arc<Stub>,
}

/// A stub selected by resolution.
#[derive(Debug, Clone)]
pub struct MatchedStub {
    pub handle: StubHandle,
    /// Position in registration order at the time of matching.
    pub index: usize,
    pub stub: Arc<Stub>,
}

/// Request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    pub requests_total: u64,
    pub requests_matched: u64,
    pub requests_unmatched: u64,
}

/// Ordered, thread-safe collection of stubs.
pub struct StubRegistry {
    stubs: RwLock<Vec<RegisteredStub>>,
    next_handle: AtomicU64,
    /// Total requests resolved.
    requests_total: AtomicU64,
    /// Requests that matched a stub.
    requests_matched: AtomicU64,
    /// Requests no stub matched.
    requests_unmatched: AtomicU64,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self {
            stubs: RwLock::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            requests_total: AtomicU64::new(0),
            requests_matched: AtomicU64::new(0),
            requests_unmatched: AtomicU64::new(0),
        }
    }

    /// Append a stub; it is tried after every stub registered before it.
    pub fn register(&self, stub: Stub) -> StubHandle {
        let handle = StubHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let mut stubs = self.stubs.write();
        stubs.push(RegisteredStub {
            handle,
            stub: Arc::new(stub),
        });
        debug!(%handle, stubs = stubs.len(), "Stub registered");
        handle
    }

    /// Remove a stub. Returns whether it was registered.
    pub fn remove(&self, handle: StubHandle) -> bool {
        let mut stubs = self.stubs.write();
        let before = stubs.len();
        stubs.retain(|entry| entry.handle != handle);
        let removed = stubs.len() != before;
        debug!(%handle, removed, stubs = stubs.len(), "Stub removed");
        removed
    }

    /// Remove every stub and zero the counters.
    pub fn reset(&self) {
        let mut stubs = self.stubs.write();
        stubs.clear();
        self.requests_total.store(0, Ordering::Relaxed);
        self.requests_matched.store(0, Ordering::Relaxed);
        self.requests_unmatched.store(0, Ordering::Relaxed);
        debug!("Stub registry reset");
    }

    pub fn len(&self) -> usize {
        self.stubs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.read().is_empty()
    }

    /// Handles in priority order.
    pub fn handles(&self) -> Vec<StubHandle> {
        self.stubs.read().iter().map(|entry| entry.handle).collect()
    }

    /// The engine claims every request; unmatched ones fail in [`resolve`](Self::resolve).
    pub fn can_handle(&self, _request: &Request) -> bool {
        true
    }

    /// First stub, in registration order, whose condition holds.
    pub fn find(&self, request: &Request) -> Option<MatchedStub> {
        let verbose = options::options().print_debug_log;
        let stubs = self.stubs.read();

        for (index, entry) in stubs.iter().enumerate() {
            let matched = if verbose {
                let trace = entry.stub.condition().trace(request);
                options::debug_log(
                    Some(Location::caller()),
                    format!(
                        "{} (position {}) against {}:\n{}",
                        entry.handle, index, request, trace
                    ),
                );
                trace.matched()
            } else {
                entry.stub.matches(request)
            };

            if matched {
                return Some(MatchedStub {
                    handle: entry.handle,
                    index,
                    stub: Arc::clone(&entry.stub),
                });
            }
        }

        None
    }

    /// Resolve a request to its stub's outcome.
    ///
    /// Fails with [`StubError::UnhandledRequest`] when no stub matches.
    pub fn resolve(&self, request: &Request) -> StubResult {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        match self.find(request) {
            Some(matched) => {
                self.requests_matched.fetch_add(1, Ordering::Relaxed);
                options::debug_log(
                    Some(Location::caller()),
                    format!("{} matched {}", request, matched.handle),
                );
                matched.stub.respond(request)
            }
            None => {
                self.requests_unmatched.fetch_add(1, Ordering::Relaxed);
                warn!(
                    method = %request.method(),
                    url = %request.url(),
                    "No matching stub found"
                );
                Err(StubError::UnhandledRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                })
            }
        }
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_matched: self.requests_matched.load(Ordering::Relaxed),
            requests_unmatched: self.requests_unmatched.load(Ordering::Relaxed),
        }
    }
}

impl Default for StubRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StubRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubRegistry")
            .field("stubs", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
