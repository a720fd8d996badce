//! Callback Bridge Library
//!
//! Connects a callback supplied by an external caller to locally generated
//! input events. The caller registers a function; the bridge reads raw text
//! lines, parses them into integers and calls the function with those
//! integers once a complete input has arrived.
//!
//! # Architecture
//!
//! - [`Bridge`] owns the single callback slot and performs invocations
//! - [`Bridge::run`] drives the ingestion state machine over any event source
//! - [`SharedBridge`] wraps a bridge for registration from other threads
//! - [`BridgeModule`] exposes the bridge as a table of named exports
//!
//! Failures inside a callback never escape the bridge: they are caught at the
//! boundary, logged and counted, and the ingestion loop keeps going.
//!
//! The crate also carries the small integer and statistics helpers used by
//! the demo program ([`utils`], [`stats`]).
//!
//! # Example Usage
//!
//! ```no_run
//! use callback_bridge::{Bridge, BridgeConfig, HostFunction, HostValue, LineSource};
//!
//! let mut bridge = Bridge::new(BridgeConfig::new().with_arity(4));
//!
//! bridge.register(HostFunction::new("onNumbers", |_ctx, args| {
//!     println!("received {}", args[0]);
//!     Ok(HostValue::Undefined)
//! }));
//!
//! // Blocks on stdin until "quit" or end of input
//! let summary = bridge.run(LineSource::stdin()).unwrap();
//! println!("{} invocations", summary.invocations);
//! ```

// Public modules
pub mod bridge;
pub mod config;
pub mod host;
pub mod ingest;
pub mod marshal;
pub mod module;
pub mod parser;
pub mod shared;
pub mod source;
pub mod stats;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use bridge::{Bridge, BridgeStats, CallbackHandle};
pub use config::{BridgeConfig, IntegerRepr, ParsePolicy};
pub use host::{
    EnvToken, HostException, HostFunction, HostValue, InvocationContext, Receiver,
};
pub use ingest::{Dispatch, IngestState, Ingestor, RunSummary, TerminationReason};
pub use module::BridgeModule;
pub use shared::SharedBridge;
pub use source::{ChannelSource, LineSource};
pub use types::{BridgeError, ParsedInput, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
