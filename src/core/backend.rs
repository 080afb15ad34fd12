//! Backend implementations that keep nothing on disk.

use std::sync::Arc;

use parking_lot::Mutex;

use super::Backend;
use crate::index::Indexed;
use crate::attr::{AttributeRecord, Container};
use crate::util::{Error, Result};

/// Backend that accepts every request and stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn flush(&mut self, _record: &AttributeRecord) -> Result<()> {
        Ok(())
    }

    fn remove_from_store(&mut self, _container: Container, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// Requests seen by a [`MemoryBackend`].
#[derive(Clone, Debug, Default)]
pub struct BackendLog {
    /// (container, name, element count) of each flushed record.
    pub flushed: Vec<(Container, String, usize)>,
    /// (container, name) of each removal.
    pub removed: Vec<(Container, String)>,
    fail_next: Option<String>,
}

/// Backend that records every request in a shared log.
///
/// Clones share the log, so a handle kept outside the dataset observes
/// what the dataset asked for.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    log: Arc<Mutex<BackendLog>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the log.
    pub fn log(&self) -> BackendLog {
        self.log.lock().clone()
    }

    /// Make the next request fail with `msg`.
    pub fn fail_next(&self, msg: impl Into<String>) {
        self.log.lock().fail_next = Some(msg.into());
    }

    fn check(log: &mut BackendLog) -> Result<()> {
        match log.fail_next.take() {
            Some(msg) => Err(Error::backend(msg)),
            None => Ok(()),
        }
    }
}

impl Backend for MemoryBackend {
    fn flush(&mut self, record: &AttributeRecord) -> Result<()> {
        let mut log = self.log.lock();
        Self::check(&mut log)?;
        log.flushed.push((record.container(), record.name().to_string(), record.len()));
        Ok(())
    }

    fn remove_from_store(&mut self, container: Container, name: &str) -> Result<()> {
        let mut log = self.log.lock();
        Self::check(&mut log)?;
        log.removed.push((container, name.to_string()));
        Ok(())
    }
}
