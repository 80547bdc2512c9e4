//! # Compile-Time Telemetry Sink
//!
//! Accumulates counters and symbolic evidence produced during a compilation
//! run and emits a stable, deterministic report with all user-identifying
//! symbol names scrubbed:
//! - Matched simplifier rules (occurrence counters)
//! - Non-monotonic loop observations
//! - Failed proof attempts
//!
//! The anonymization engine replaces every free-standing symbolic reference
//! (variables, extern calls, image references) with a synthetic alias,
//! consistently across the whole session, while leaving operators,
//! structure, and constants intact.
//!
//! Telemetry must never perturb compilation: recording through a
//! [`TelemetryContext`] with no active session is a defined no-op, and the
//! whole pipeline is switched on via the `TELEMETRY_REPORT` environment
//! variable.

pub mod anonymize;
pub mod context;
pub mod expr;
pub mod session;
pub mod writer;

pub use anonymize::{Anonymizer, Namespace};
pub use context::TelemetryContext;
pub use expr::{BinaryOp, CallKind, Expr, ExprKind, Type};
pub use session::{
    SessionStats, TelemetryConfig, TelemetrySession, TelemetrySink, TELEMETRY_NO_ANONYMIZE_ENV,
    TELEMETRY_REPORT_ENV,
};
pub use writer::{Report, ReportDestination, ReportWriter};
