//! # Telemetry Session
//!
//! Accumulates typed records during one compilation run and produces an
//! anonymized, finalized report exactly once. Recording is append-only and
//! cheap; all anonymization and serialization work happens at finalize.

use crate::anonymize::{Anonymizer, Namespace};
use crate::expr::Expr;
use crate::writer::{Report, ReportDestination, ReportWriter};
use log::{debug, info};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Destination switch: unset/empty/`"0"` disables telemetry, `"1"` reports
/// to stderr, any other value is a report file path.
pub const TELEMETRY_REPORT_ENV: &str = "TELEMETRY_REPORT";

/// Set to `"1"` to keep real identifiers in the report (debugging only).
pub const TELEMETRY_NO_ANONYMIZE_ENV: &str = "TELEMETRY_NO_ANONYMIZE";

/// Capability interface for telemetry sinks: record the four event kinds,
/// then finalize exactly once.
///
/// The default implementation is [`TelemetrySession`]; alternate sinks
/// (e.g. streaming to a remote collector) implement the same surface.
pub trait TelemetrySink {
    /// Record that a simplifier rule matched. Repeated calls accumulate.
    fn record_matched_simplifier_rule(&mut self, rule_name: &str);

    /// Record an expression that is non-monotonic in a loop variable.
    fn record_non_monotonic_loop_var(&mut self, loop_var: &str, expr: Expr);

    /// Record a proof attempt that failed without finding a counterexample.
    fn record_failed_to_prove(&mut self, failed: Expr, original: Expr);

    /// Anonymize, serialize, and flush everything recorded. One-way: the
    /// sink must not be recorded into afterwards.
    fn finalize(&mut self) -> Result<(), String>;
}

/// Configuration for a telemetry session.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Where the finalized report goes.
    pub destination: ReportDestination,

    /// Replace symbol names with synthetic aliases at finalize. Disabling
    /// this puts real identifiers in the report; diagnostic use only.
    pub anonymize: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            destination: ReportDestination::Stderr,
            anonymize: true,
        }
    }
}

impl TelemetryConfig {
    /// Build a config from the environment, or `None` when telemetry is
    /// switched off. See [`TELEMETRY_REPORT_ENV`] for the switch values.
    pub fn from_env() -> Option<TelemetryConfig> {
        let switch = env::var(TELEMETRY_REPORT_ENV).unwrap_or_default();
        if switch.is_empty() || switch == "0" {
            debug!("telemetry disabled ({} unset)", TELEMETRY_REPORT_ENV);
            return None;
        }

        let destination = if switch == "1" {
            ReportDestination::Stderr
        } else {
            ReportDestination::File(PathBuf::from(switch))
        };

        let anonymize = env::var(TELEMETRY_NO_ANONYMIZE_ENV)
            .map(|value| value != "1")
            .unwrap_or(true);

        Some(TelemetryConfig {
            destination,
            anonymize,
        })
    }
}

/// Counts of records retained by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Distinct rules with at least one match.
    pub matched_simplifier_rules: usize,
    /// Non-monotonic loop observations, duplicates included.
    pub non_monotonic_loop_vars: usize,
    /// Failed-proof observations, duplicates included.
    pub failed_to_prove: usize,
}

/// Default [`TelemetrySink`]: buffers records in memory for one compilation
/// run, then anonymizes and writes the report in [`finalize`].
///
/// Single-threaded by design. If multiple threads record into one session,
/// the caller must wrap it in a lock around every call.
///
/// [`finalize`]: TelemetrySink::finalize
#[derive(Debug)]
pub struct TelemetrySession {
    config: TelemetryConfig,
    matched_simplifier_rules: HashMap<String, u64>,
    non_monotonic_loop_vars: Vec<(String, Expr)>,
    failed_to_prove: Vec<(Expr, Expr)>,
    finalized: bool,
}

impl TelemetrySession {
    /// Create an empty session with the given config.
    pub fn new(config: TelemetryConfig) -> Self {
        TelemetrySession {
            config,
            matched_simplifier_rules: HashMap::new(),
            non_monotonic_loop_vars: Vec::new(),
            failed_to_prove: Vec::new(),
            finalized: false,
        }
    }

    /// Create a session from the environment switches, or `None` when
    /// telemetry is off.
    pub fn from_env() -> Option<TelemetrySession> {
        TelemetryConfig::from_env().map(TelemetrySession::new)
    }

    /// Counts of retained records.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            matched_simplifier_rules: self.matched_simplifier_rules.len(),
            non_monotonic_loop_vars: self.non_monotonic_loop_vars.len(),
            failed_to_prove: self.failed_to_prove.len(),
        }
    }

    /// Rewrite all retained records through one shared anonymizer, so a
    /// name appearing in several records gets the same alias everywhere in
    /// the report.
    fn anonymize_records(&mut self) {
        let mut anonymizer = Anonymizer::new();

        for (loop_var, expr) in &mut self.non_monotonic_loop_vars {
            *loop_var = anonymizer.alias(loop_var, Namespace::Generic);
            *expr = anonymizer.rewrite(expr);
        }

        for (failed, original) in &mut self.failed_to_prove {
            *failed = anonymizer.rewrite(failed);
            *original = anonymizer.rewrite(original);
        }
    }
}

impl TelemetrySink for TelemetrySession {
    fn record_matched_simplifier_rule(&mut self, rule_name: &str) {
        assert!(
            !self.finalized,
            "record_matched_simplifier_rule called after finalize"
        );
        *self
            .matched_simplifier_rules
            .entry(rule_name.to_string())
            .or_insert(0) += 1;
    }

    fn record_non_monotonic_loop_var(&mut self, loop_var: &str, expr: Expr) {
        assert!(
            !self.finalized,
            "record_non_monotonic_loop_var called after finalize"
        );
        self.non_monotonic_loop_vars
            .push((loop_var.to_string(), expr));
    }

    fn record_failed_to_prove(&mut self, failed: Expr, original: Expr) {
        assert!(
            !self.finalized,
            "record_failed_to_prove called after finalize"
        );
        self.failed_to_prove.push((failed, original));
    }

    fn finalize(&mut self) -> Result<(), String> {
        assert!(!self.finalized, "finalize called twice on a telemetry session");
        self.finalized = true;

        if self.config.anonymize {
            self.anonymize_records();
        }

        match &self.config.destination {
            ReportDestination::File(path) => {
                info!("writing telemetry report to {}", path.display())
            }
            ReportDestination::Stderr => info!("writing telemetry report to stderr"),
        }

        let report = Report::build(
            &self.matched_simplifier_rules,
            &self.non_monotonic_loop_vars,
            &self.failed_to_prove,
        );
        ReportWriter::new(self.config.destination.clone()).write(&report)
    }
}
