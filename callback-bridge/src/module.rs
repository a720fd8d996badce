//! Module entry points
//!
//! [`BridgeModule`] is what a host sees: a table of named exports called with
//! host values. It owns the bridge for its whole lifetime, from
//! [`BridgeModule::init`] to [`BridgeModule::shutdown`].

use crate::bridge::{Bridge, BridgeStats};
use crate::config::BridgeConfig;
use crate::host::HostValue;
use crate::ingest::RunSummary;
use crate::source::LineSource;
use crate::types::{BridgeError, Result};

/// Names of the exported entry points
pub const EXPORTS: [&str; 3] = ["sayHello", "registerCallback", "startInput"];

/// Greeting returned by `sayHello`
pub const GREETING: &str = "Hello from the callback bridge";

type InputStream = Box<dyn Iterator<Item = Result<String>>>;

/// A loaded bridge module
pub struct BridgeModule {
    bridge: Bridge,
    input: Option<InputStream>,
    last_summary: Option<RunSummary>,
}

impl BridgeModule {
    /// Initialize the module with an empty callback slot
    ///
    /// Input is read from stdin unless another source is set with
    /// [`BridgeModule::with_input`].
    pub fn init(config: BridgeConfig) -> Self {
        let module = Self {
            bridge: Bridge::new(config),
            input: None,
            last_summary: None,
        };
        log::info!("Module initialized, exports: {}", EXPORTS.join(", "));
        module
    }

    /// Builder method: read `startInput` lines from the given source
    pub fn with_input<I>(mut self, input: I) -> Self
    where
        I: IntoIterator<Item = Result<String>>,
        I::IntoIter: 'static,
    {
        self.input = Some(Box::new(input.into_iter()));
        self
    }

    pub fn exports(&self) -> &'static [&'static str] {
        &EXPORTS
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut Bridge {
        &mut self.bridge
    }

    /// Summary of the most recent `startInput` run
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Call an export by name
    ///
    /// # Example
    /// ```
    /// use callback_bridge::{BridgeConfig, BridgeModule, HostValue};
    ///
    /// let mut module = BridgeModule::init(BridgeConfig::new());
    /// let greeting = module.call("sayHello", &[]).unwrap();
    /// assert!(greeting.as_str().is_some());
    ///
    /// assert!(module.call("registerCallback", &[HostValue::Int32(1)]).is_err());
    /// ```
    pub fn call(&mut self, name: &str, args: &[HostValue]) -> Result<HostValue> {
        log::debug!("Export called: {} ({} args)", name, args.len());

        match name {
            "sayHello" => Ok(HostValue::from(GREETING)),
            "registerCallback" => {
                let callback = args.first().cloned().unwrap_or_default();
                self.bridge.register_value(callback)?;
                log::info!("Callback registered");
                Ok(HostValue::Undefined)
            }
            "startInput" => {
                let input = self.input.get_or_insert_with(|| -> InputStream {
                    Box::new(LineSource::stdin().with_prompt("> "))
                });
                let summary = self.bridge.run(input)?;
                log::info!(
                    "Input stopped: {} lines, {} invocations",
                    summary.lines_received,
                    summary.invocations
                );
                self.last_summary = Some(summary);
                Ok(HostValue::Undefined)
            }
            other => Err(BridgeError::UnknownExport(other.to_string())),
        }
    }

    /// Unload the module, releasing the registered callback
    pub fn shutdown(self) -> BridgeStats {
        log::info!("Module shutting down");
        self.bridge.shutdown()
    }
}
