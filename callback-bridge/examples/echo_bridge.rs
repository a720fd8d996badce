//! Minimal interactive bridge
//!
//! Registers a callback that echoes the numbers it receives and listens on
//! stdin until "quit".
//!
//! Usage:
//!   echo_bridge [ARITY]
//!
//! Example:
//!   RUST_LOG=debug echo_bridge 3

use callback_bridge::{Bridge, BridgeConfig, HostFunction, HostValue, LineSource};
use std::env;

fn main() {
    env_logger::init();

    let arity = env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(4);

    let mut bridge = Bridge::new(BridgeConfig::new().with_arity(arity));
    bridge.register(HostFunction::new("echo", |_, args| {
        println!("callback received {}", args[0]);
        Ok(HostValue::Undefined)
    }));

    println!("Enter {} integers per line, 'quit' to exit", arity);
    match bridge.run(LineSource::stdin().with_prompt("> ")) {
        Ok(summary) => {
            println!(
                "\n{} lines, {} invocations, {} rejected",
                summary.lines_received,
                summary.invocations,
                summary.rejected()
            );
        }
        Err(e) => eprintln!("Input error: {}", e),
    }

    bridge.shutdown();
}
