//! Input ingestion loop
//!
//! Drives the bridge from a stream of raw input lines:
//!
//! ```text
//! WaitingForInput -> Parsing -> Dispatching -> WaitingForInput
//!                      |
//!                      +-> (arity mismatch / bad input) -> WaitingForInput
//! WaitingForInput -> (quit command) -> Terminated
//! ```
//!
//! No single line can stop the loop except the termination command. Bad input
//! and failing callbacks are logged, counted and skipped.

use crate::bridge::Bridge;
use crate::host::HostValue;
use crate::parser::parse_with_policy;
use crate::types::{BridgeError, Result, Timestamp};
use chrono::Utc;
use serde::Serialize;

/// Ingestion loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestState {
    WaitingForInput,
    Parsing,
    Dispatching,
    Terminated,
}

/// What happened to one input line
#[derive(Debug)]
pub enum Dispatch {
    /// The termination command was received
    Terminated,
    /// The callback ran and returned this value
    Invoked(HostValue),
    /// The line was discarded or the invocation failed
    Rejected(BridgeError),
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    QuitCommand,
    EndOfInput,
}

/// Summary of one run of the ingestion loop
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub lines_received: usize,
    pub invocations: usize,
    pub arity_mismatches: usize,
    pub invalid_inputs: usize,
    pub range_errors: usize,
    pub callback_failures: usize,
    pub skipped: usize,
    pub termination: TerminationReason,
}

impl RunSummary {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            lines_received: 0,
            invocations: 0,
            arity_mismatches: 0,
            invalid_inputs: 0,
            range_errors: 0,
            callback_failures: 0,
            skipped: 0,
            termination: TerminationReason::EndOfInput,
        }
    }

    /// Total number of lines that did not lead to a successful invocation
    pub fn rejected(&self) -> usize {
        self.arity_mismatches
            + self.invalid_inputs
            + self.range_errors
            + self.callback_failures
            + self.skipped
    }
}

/// Step-by-step driver for the ingestion state machine
///
/// The ingestor borrows the bridge only for the duration of a step, so a
/// shared bridge can be unlocked between lines.
pub struct Ingestor {
    state: IngestState,
    summary: RunSummary,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    pub fn new() -> Self {
        Self {
            state: IngestState::WaitingForInput,
            summary: RunSummary::new(),
        }
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Feed one raw input line through the state machine
    ///
    /// Once terminated, every further call returns [`Dispatch::Terminated`]
    /// without looking at the line.
    pub fn step(&mut self, bridge: &mut Bridge, raw: &str) -> Dispatch {
        if self.state == IngestState::Terminated {
            return Dispatch::Terminated;
        }

        let line = raw.trim();
        self.summary.lines_received += 1;

        if bridge.config().is_quit(line) {
            log::info!("Termination command received");
            self.summary.termination = TerminationReason::QuitCommand;
            self.transition(IngestState::Terminated);
            return Dispatch::Terminated;
        }

        self.transition(IngestState::Parsing);
        let config = bridge.config();
        let arity = config.arity;
        let input = match parse_with_policy(line, config.parse_policy) {
            Ok(input) => input,
            Err(e) => return self.reject(e),
        };

        if !input.has_arity(arity) {
            return self.reject(BridgeError::ArityMismatch {
                expected: arity,
                actual: input.len(),
            });
        }

        self.transition(IngestState::Dispatching);
        match bridge.invoke(&input) {
            Ok(value) => {
                self.summary.invocations += 1;
                self.transition(IngestState::WaitingForInput);
                Dispatch::Invoked(value)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Count a line the source could not deliver as text
    pub fn discard(&mut self, err: BridgeError) -> Dispatch {
        if self.state == IngestState::Terminated {
            return Dispatch::Terminated;
        }
        self.summary.lines_received += 1;
        self.reject(err)
    }

    /// Close the run and return its summary
    pub fn finish(mut self) -> RunSummary {
        if self.state != IngestState::Terminated {
            log::info!("Input exhausted, stopping ingestion");
            self.summary.termination = TerminationReason::EndOfInput;
            self.transition(IngestState::Terminated);
        }
        self.summary.finished_at = Utc::now();
        self.summary
    }

    fn reject(&mut self, err: BridgeError) -> Dispatch {
        match &err {
            BridgeError::ArityMismatch { .. } => {
                self.summary.arity_mismatches += 1;
                log::warn!("Discarding input: {}", err);
            }
            BridgeError::InvalidInput(_) => {
                self.summary.invalid_inputs += 1;
                log::warn!("Discarding input: {}", err);
            }
            BridgeError::IntegerRangeError { .. } => {
                self.summary.range_errors += 1;
                log::warn!("Discarding input: {}", err);
            }
            BridgeError::NoCallbackRegistered => {
                self.summary.skipped += 1;
                log::warn!("Input parsed but no callback is registered, skipping");
            }
            BridgeError::CallbackExecutionError { .. } => {
                self.summary.callback_failures += 1;
                log::error!("{}", err);
            }
            other => log::error!("Unexpected dispatch error: {}", other),
        }

        self.transition(IngestState::WaitingForInput);
        Dispatch::Rejected(err)
    }

    fn transition(&mut self, next: IngestState) {
        log::trace!("Ingest state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Bridge {
    /// Run the ingestion loop over an event source until it terminates
    ///
    /// The loop ends on the termination command or when the source is
    /// exhausted. Recoverable errors yielded by the source are counted like
    /// any other rejected line; an I/O failure aborts the loop.
    ///
    /// # Example
    /// ```
    /// use callback_bridge::{Bridge, BridgeConfig, HostFunction, HostValue, TerminationReason};
    ///
    /// let mut bridge = Bridge::new(BridgeConfig::new());
    /// bridge.register(HostFunction::new("onNumbers", |_, _| Ok(HostValue::Undefined)));
    ///
    /// let lines = vec!["1 2 3 4", "quit", "5 6 7 8"];
    /// let summary = bridge.run(lines.into_iter().map(|l| Ok(l.to_string()))).unwrap();
    ///
    /// assert_eq!(summary.invocations, 1);
    /// assert_eq!(summary.termination, TerminationReason::QuitCommand);
    /// ```
    pub fn run<I>(&mut self, source: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        log::info!("Listening for input (quit command: {:?})", self.config().quit_command);

        let mut ingestor = Ingestor::new();
        for line in source {
            let dispatch = match line {
                Ok(line) => ingestor.step(self, &line),
                Err(e) if e.is_recoverable() => ingestor.discard(e),
                Err(e) => return Err(e),
            };
            if let Dispatch::Terminated = dispatch {
                break;
            }
        }

        Ok(ingestor.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeConfig, ParsePolicy};
    use crate::host::{HostException, HostFunction};

    fn lines(items: &[&str]) -> Vec<Result<String>> {
        items.iter().map(|s| Ok(s.to_string())).collect()
    }

    fn counting_bridge() -> Bridge {
        let mut bridge = Bridge::new(BridgeConfig::new());
        bridge.register(HostFunction::new("count", |_, args| {
            let len = args[0].as_array().map(|a| a.len()).unwrap_or(0);
            Ok(HostValue::Int32(len as i32))
        }));
        bridge
    }

    #[test]
    fn test_step_state_machine() {
        let mut bridge = counting_bridge();
        let mut ingestor = Ingestor::new();
        assert_eq!(ingestor.state(), IngestState::WaitingForInput);

        assert!(matches!(
            ingestor.step(&mut bridge, "1 2 3 4"),
            Dispatch::Invoked(HostValue::Int32(4))
        ));
        assert_eq!(ingestor.state(), IngestState::WaitingForInput);

        assert!(matches!(
            ingestor.step(&mut bridge, "1 2 3"),
            Dispatch::Rejected(BridgeError::ArityMismatch { expected: 4, actual: 3 })
        ));
        assert_eq!(ingestor.state(), IngestState::WaitingForInput);

        assert!(matches!(ingestor.step(&mut bridge, "quit"), Dispatch::Terminated));
        assert_eq!(ingestor.state(), IngestState::Terminated);

        // Nothing is processed after termination
        assert!(matches!(ingestor.step(&mut bridge, "5 6 7 8"), Dispatch::Terminated));
        assert_eq!(ingestor.summary().invocations, 1);
        assert_eq!(ingestor.summary().lines_received, 3);
    }

    #[test]
    fn test_quit_is_trimmed() {
        let mut bridge = counting_bridge();
        let mut ingestor = Ingestor::new();
        assert!(matches!(ingestor.step(&mut bridge, "  quit\r\n"), Dispatch::Terminated));
    }

    #[test]
    fn test_run_stops_at_quit() {
        let mut bridge = counting_bridge();
        let summary = bridge
            .run(lines(&["1 2 3 4", "quit", "5 6 7 8"]))
            .unwrap();

        assert_eq!(summary.invocations, 1);
        assert_eq!(summary.lines_received, 2);
        assert_eq!(summary.termination, TerminationReason::QuitCommand);
        assert!(summary.finished_at >= summary.started_at);
    }

    #[test]
    fn test_run_end_of_input() {
        let mut bridge = counting_bridge();
        let summary = bridge.run(lines(&["1 2 3 4", "5 6 7 8"])).unwrap();
        assert_eq!(summary.invocations, 2);
        assert_eq!(summary.termination, TerminationReason::EndOfInput);
    }

    #[test]
    fn test_run_counts_rejections() {
        let mut bridge = Bridge::new(BridgeConfig::new());
        let pending = lines(&["1 2 3 4", "", "1 two 3 4", "1 2 3 9999999999", "quit"]);

        // Nothing registered yet: complete lines are parsed but skipped
        let summary = bridge.run(pending).unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.arity_mismatches, 2);
        assert_eq!(summary.range_errors, 0);
        assert_eq!(summary.rejected(), 4);
        assert_eq!(bridge.stats().skipped, 2);

        bridge.register(HostFunction::new("cb", |_, _| Ok(HostValue::Null)));
        let summary = bridge.run(lines(&["1 2 3 9999999999"])).unwrap();
        assert_eq!(summary.range_errors, 1);
    }

    #[test]
    fn test_run_survives_failing_callback() {
        let mut bridge = Bridge::new(BridgeConfig::new());
        bridge.register(HostFunction::new("flaky", |_, args| {
            let first = args[0].as_array().unwrap()[0].as_i64().unwrap();
            if first == 0 {
                Err(HostException::new("division by zero"))
            } else {
                Ok(HostValue::Null)
            }
        }));

        let summary = bridge.run(lines(&["0 1 2 3", "1 2 3 4", "quit"])).unwrap();
        assert_eq!(summary.callback_failures, 1);
        assert_eq!(summary.invocations, 1);
        assert_eq!(summary.termination, TerminationReason::QuitCommand);
    }

    #[test]
    fn test_run_strict_policy() {
        let mut bridge = Bridge::new(BridgeConfig::new().with_parse_policy(ParsePolicy::Strict));
        bridge.register(HostFunction::new("cb", |_, _| Ok(HostValue::Null)));

        let summary = bridge.run(lines(&["1 2 3 4 x", "1 2 3 4"])).unwrap();
        assert_eq!(summary.invalid_inputs, 1);
        assert_eq!(summary.invocations, 1);
    }

    #[test]
    fn test_run_propagates_source_error() {
        let mut bridge = counting_bridge();
        let source = vec![
            Ok("1 2 3 4".to_string()),
            Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "input closed",
            ))),
        ];

        let err = bridge.run(source).unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
        assert_eq!(bridge.stats().invocations, 1);
    }

    #[test]
    fn test_run_skips_undecodable_line() {
        let mut bridge = counting_bridge();
        let source = vec![
            Ok("1 2 3 4".to_string()),
            Err(BridgeError::InvalidInput("line is not valid UTF-8".to_string())),
            Ok("5 6 7 8".to_string()),
            Ok("quit".to_string()),
        ];

        let summary = bridge.run(source).unwrap();
        assert_eq!(summary.invocations, 2);
        assert_eq!(summary.invalid_inputs, 1);
        assert_eq!(summary.lines_received, 4);
        assert_eq!(summary.termination, TerminationReason::QuitCommand);
    }

    #[test]
    fn test_custom_quit_command() {
        let mut bridge = Bridge::new(BridgeConfig::new().with_quit_command("exit"));
        let summary = bridge.run(lines(&["quit", "exit", "1 2 3 4"])).unwrap();
        assert_eq!(summary.arity_mismatches, 1);
        assert_eq!(summary.termination, TerminationReason::QuitCommand);
    }
}
