//! Thread-safe bridge handle
//!
//! [`SharedBridge`] lets registration and ingestion happen on different
//! threads. The lock is taken per operation, and per line while running, so a
//! new callback registered mid-run takes effect from the next line on.
//!
//! Callbacks run with the lock held and must not call back into the same
//! `SharedBridge`.

use crate::bridge::{Bridge, BridgeStats};
use crate::config::BridgeConfig;
use crate::host::{HostFunction, HostValue};
use crate::ingest::{Dispatch, Ingestor, RunSummary};
use crate::types::{ParsedInput, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, synchronized handle to a [`Bridge`]
#[derive(Clone)]
pub struct SharedBridge {
    inner: Arc<Mutex<Bridge>>,
}

impl SharedBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self::from_bridge(Bridge::new(config))
    }

    pub fn from_bridge(bridge: Bridge) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bridge)),
        }
    }

    pub fn register(&self, function: HostFunction) {
        self.inner.lock().register(function);
    }

    pub fn register_value(&self, value: HostValue) -> Result<()> {
        self.inner.lock().register_value(value)
    }

    pub fn is_registered(&self) -> bool {
        self.inner.lock().is_registered()
    }

    pub fn invoke(&self, input: &ParsedInput) -> Result<HostValue> {
        self.inner.lock().invoke(input)
    }

    pub fn stats(&self) -> BridgeStats {
        self.inner.lock().stats()
    }

    /// Run the ingestion loop, locking the bridge once per line
    pub fn run<I>(&self, source: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let mut ingestor = Ingestor::new();
        for line in source {
            let dispatch = match line {
                Ok(line) => ingestor.step(&mut self.inner.lock(), &line),
                Err(e) if e.is_recoverable() => ingestor.discard(e),
                Err(e) => return Err(e),
            };
            if let Dispatch::Terminated = dispatch {
                break;
            }
        }

        Ok(ingestor.finish())
    }

    /// Recover the bridge if this is the last handle
    pub fn try_into_inner(self) -> std::result::Result<Bridge, SharedBridge> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| SharedBridge { inner })
    }
}
