//! # Telemetry Context
//!
//! Explicit handle to the (optional) active telemetry sink. Compiler passes
//! take a `&mut TelemetryContext` instead of reaching for process-global
//! state; when no sink is installed every call is a silent no-op, so
//! telemetry never perturbs normal compilation.
//!
//! The context does no locking. Callers that drive one context from
//! several threads must wrap every recording and finalize call, and every
//! install/clear, in their own mutual exclusion.

use crate::expr::Expr;
use crate::session::{TelemetrySession, TelemetrySink};

/// Owner of at most one active telemetry sink.
///
/// Installing a new sink drops the previous one. Borrow the context for
/// immediate calls only; nothing else should hold a long-lived reference
/// to the sink.
pub struct TelemetryContext {
    sink: Option<Box<dyn TelemetrySink>>,
}

impl TelemetryContext {
    /// Handle with no sink installed; every operation is a no-op.
    pub fn disabled() -> Self {
        TelemetryContext { sink: None }
    }

    /// Handle driven by the environment switches; no-op when telemetry is
    /// switched off.
    pub fn from_env() -> Self {
        TelemetryContext {
            sink: TelemetrySession::from_env()
                .map(|session| Box::new(session) as Box<dyn TelemetrySink>),
        }
    }

    /// Install `sink` as the active sink, dropping any previous one.
    pub fn install(&mut self, sink: Box<dyn TelemetrySink>) {
        self.sink = Some(sink);
    }

    /// Remove the active sink without finalizing it.
    pub fn clear(&mut self) {
        self.sink = None;
    }

    /// Whether a sink is currently installed.
    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    /// Forward a rule match to the active sink, if any.
    pub fn record_matched_simplifier_rule(&mut self, rule_name: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.record_matched_simplifier_rule(rule_name);
        }
    }

    /// Forward a non-monotonic loop observation to the active sink, if any.
    pub fn record_non_monotonic_loop_var(&mut self, loop_var: &str, expr: Expr) {
        if let Some(sink) = self.sink.as_mut() {
            sink.record_non_monotonic_loop_var(loop_var, expr);
        }
    }

    /// Forward a failed proof attempt to the active sink, if any.
    pub fn record_failed_to_prove(&mut self, failed: Expr, original: Expr) {
        if let Some(sink) = self.sink.as_mut() {
            sink.record_failed_to_prove(failed, original);
        }
    }

    /// Finalize and drop the active sink. The context reverts to no-op, so
    /// recording calls made afterwards are defined no-ops. Without an
    /// active sink this returns `Ok(())` and has no effect.
    pub fn finalize(&mut self) -> Result<(), String> {
        match self.sink.take() {
            Some(mut sink) => sink.finalize(),
            None => Ok(()),
        }
    }
}

impl Default for TelemetryContext {
    fn default() -> Self {
        TelemetryContext::disabled()
    }
}
