//! Interfaces to the store under test.
//!
//! The engine never talks to the store directly. Runners obtain a client from
//! a [`Connector`] during `init` and submit through [`QueryClient`] or
//! [`Importer`]. [`EchoClient`] implements both by writing each submission
//! to a sink, for dry runs.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Executes serialized queries against an index.
pub trait QueryClient: Send + Sync {
    /// Run `query` against `index` and return the store's response.
    fn execute_query(&self, index: &str, query: &str) -> anyhow::Result<serde_json::Value>;
}

/// A bulk import of CSV files produced by the dataset generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub host: String,
    pub index: String,
    pub frame: String,
    pub paths: Vec<PathBuf>,
    pub buffer_size: usize,
}

/// Performs bulk imports.
pub trait Importer: Send + Sync {
    fn import(&self, request: &ImportRequest) -> anyhow::Result<()>;
}

/// Connects to the store given a non-empty host list.
pub trait Connector<C: ?Sized>: Send + Sync {
    fn connect(&self, hosts: &[String]) -> anyhow::Result<Arc<C>>;
}

impl<C: ?Sized, F> Connector<C> for F
where
    F: Fn(&[String]) -> anyhow::Result<Arc<C>> + Send + Sync,
{
    fn connect(&self, hosts: &[String]) -> anyhow::Result<Arc<C>> {
        self(hosts)
    }
}

/// Connector that hands out the same client regardless of hosts.
pub struct StaticConnector<C: ?Sized>(pub Arc<C>);

impl<C: ?Sized + Send + Sync> Connector<C> for StaticConnector<C> {
    fn connect(&self, _hosts: &[String]) -> anyhow::Result<Arc<C>> {
        Ok(self.0.clone())
    }
}

/// Dry-run client that writes every submission as a line to a sink.
///
/// Queries are echoed as `index<TAB>query`; imports as the request's paths.
/// Responses are `null`.
pub struct EchoClient {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl EchoClient {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// An echo client that discards everything.
    pub fn discard() -> Self {
        Self::new(std::io::sink())
    }
}

impl QueryClient for EchoClient {
    fn execute_query(&self, index: &str, query: &str) -> anyhow::Result<serde_json::Value> {
        writeln!(self.sink.lock(), "{}\t{}", index, query)?;
        Ok(serde_json::Value::Null)
    }
}

impl Importer for EchoClient {
    fn import(&self, request: &ImportRequest) -> anyhow::Result<()> {
        let mut sink = self.sink.lock();
        for path in &request.paths {
            writeln!(
                sink,
                "import {}/{} {}",
                request.index,
                request.frame,
                path.display()
            )?;
        }
        Ok(())
    }
}
