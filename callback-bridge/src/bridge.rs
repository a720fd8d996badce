//! Main bridge API
//!
//! The [`Bridge`] owns the single callback slot. Registration replaces whatever
//! is stored there; invocation marshals a parsed input and calls the stored
//! callback in the context it was registered with.

use crate::config::BridgeConfig;
use crate::host::{EnvToken, HostFunction, HostValue, InvocationContext};
use crate::marshal::marshal_input;
use crate::types::{BridgeError, ParsedInput, Result, Timestamp};
use chrono::Utc;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

/// A registered callback together with the context it must run in
#[derive(Debug, Clone)]
pub struct CallbackHandle {
    function: HostFunction,
    context: InvocationContext,
    registered_at: Timestamp,
}

impl CallbackHandle {
    fn new(function: HostFunction, env: EnvToken) -> Self {
        Self {
            function,
            context: InvocationContext::global(env),
            registered_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }

    pub fn registered_at(&self) -> Timestamp {
        self.registered_at
    }
}

/// Counters kept by a bridge over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    /// Successful register calls
    pub registrations: usize,
    /// Callbacks that returned normally
    pub invocations: usize,
    /// Callbacks that raised or panicked
    pub failures: usize,
    /// Invocations skipped because nothing was registered
    pub skipped: usize,
}

/// The callback bridge - owns the callback slot and dispatches into it
pub struct Bridge {
    config: BridgeConfig,
    env: EnvToken,
    slot: Option<CallbackHandle>,
    stats: BridgeStats,
}

impl Bridge {
    /// Create a bridge with an empty callback slot
    pub fn new(config: BridgeConfig) -> Self {
        let env = EnvToken::fresh();
        log::info!(
            "Bridge initialized (env {}, arity {}, quit command {:?})",
            env.id(),
            config.arity,
            config.quit_command
        );

        Self {
            config,
            env,
            slot: None,
            stats: BridgeStats::default(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Environment token callbacks registered here are bound to
    pub fn env(&self) -> EnvToken {
        self.env
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn is_registered(&self) -> bool {
        self.slot.is_some()
    }

    /// The currently registered callback, if any
    pub fn handle(&self) -> Option<&CallbackHandle> {
        self.slot.as_ref()
    }

    /// Register a callback, replacing any previous one
    ///
    /// The caller must supply a function that accepts one argument: an array
    /// of exactly `arity` integers.
    ///
    /// # Example
    /// ```
    /// use callback_bridge::{Bridge, BridgeConfig, HostFunction, HostValue};
    ///
    /// let mut bridge = Bridge::new(BridgeConfig::new());
    /// bridge.register(HostFunction::new("onNumbers", |_, _| Ok(HostValue::Undefined)));
    /// assert!(bridge.is_registered());
    /// ```
    pub fn register(&mut self, function: HostFunction) {
        if let Some(previous) = self.release() {
            log::debug!(
                "Replacing callback '{}' with '{}'",
                previous.name(),
                function.name()
            );
        } else {
            log::debug!("Registering callback '{}'", function.name());
        }

        self.slot = Some(CallbackHandle::new(function, self.env));
        self.stats.registrations += 1;
    }

    /// Register a dynamically-typed host value
    ///
    /// Fails with [`BridgeError::InvalidCallback`] if the value is not callable;
    /// the previously registered callback is kept in that case.
    pub fn register_value(&mut self, value: HostValue) -> Result<()> {
        match value {
            HostValue::Function(function) => {
                self.register(function);
                Ok(())
            }
            other => Err(BridgeError::InvalidCallback(other.type_name().to_string())),
        }
    }

    /// Drop the registered callback, returning its handle
    pub fn unregister(&mut self) -> Option<CallbackHandle> {
        let released = self.release();
        if let Some(handle) = &released {
            log::debug!("Unregistered callback '{}'", handle.name());
        }
        released
    }

    /// Invoke the registered callback with a parsed input
    ///
    /// The input is marshalled into a host array and passed as the only
    /// argument. Exceptions and panics raised by the callback are caught here
    /// and returned as [`BridgeError::CallbackExecutionError`].
    pub fn invoke(&mut self, input: &ParsedInput) -> Result<HostValue> {
        let (function, context) = match &self.slot {
            Some(handle) => (handle.function.clone(), handle.context),
            None => {
                self.stats.skipped += 1;
                return Err(BridgeError::NoCallbackRegistered);
            }
        };

        if !input.has_arity(self.config.arity) {
            return Err(BridgeError::ArityMismatch {
                expected: self.config.arity,
                actual: input.len(),
            });
        }

        let args = [marshal_input(input, self.config.integer_repr)?];

        log::debug!("Invoking callback '{}' with {}", function.name(), input);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| function.call(&context, &args)));

        match outcome {
            Ok(Ok(value)) => {
                self.stats.invocations += 1;
                Ok(value)
            }
            Ok(Err(exception)) => {
                self.stats.failures += 1;
                Err(BridgeError::CallbackExecutionError {
                    callback: function.name().to_string(),
                    message: exception.to_string(),
                })
            }
            Err(payload) => {
                self.stats.failures += 1;
                Err(BridgeError::CallbackExecutionError {
                    callback: function.name().to_string(),
                    message: panic_message(payload.as_ref()),
                })
            }
        }
    }

    /// Tear the bridge down, releasing the registered callback
    pub fn shutdown(mut self) -> BridgeStats {
        if let Some(handle) = self.release() {
            log::debug!("Released callback '{}' on shutdown", handle.name());
        }
        log::info!("Bridge shut down (env {})", self.env.id());
        self.stats
    }

    fn release(&mut self) -> Option<CallbackHandle> {
        self.slot.take()
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(handle) = self.release() {
            log::debug!("Released callback '{}' on drop", handle.name());
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
