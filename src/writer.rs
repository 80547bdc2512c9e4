//! # Report Writer
//!
//! Deterministic serialization of a finalized telemetry session into a
//! stable, human-diffable report. Section order is fixed, counters are
//! sorted descending by count with rule-name tie-breaks, and observation
//! pairs are de-duplicated and sorted, so identical sessions always render
//! byte-identical reports.

use crate::expr::Expr;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Where a finalized report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    /// Write the report to standard error.
    Stderr,
    /// Write the report to the given file (created or truncated).
    File(PathBuf),
}

/// Sorted, de-duplicated snapshot of one session's records, ready to
/// render. Field order matches the rendered section order.
///
/// Serializable so alternate sinks can ship the snapshot as JSON instead of
/// rendering the textual report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Rule name and match count, descending by count, ties by name.
    pub matched_simplifier_rules: Vec<(String, u64)>,
    /// Loop variable and stringified expression, de-duplicated, ascending.
    pub non_monotonic_loop_vars: Vec<(String, String)>,
    /// Failed and original expression, both stringified, de-duplicated,
    /// ascending.
    pub failed_to_prove: Vec<(String, String)>,
}

impl Report {
    /// Snapshot raw session records into deterministic render order.
    pub fn build(
        rules: &HashMap<String, u64>,
        loop_vars: &[(String, Expr)],
        proofs: &[(Expr, Expr)],
    ) -> Report {
        let mut matched: Vec<(String, u64)> =
            rules.iter().map(|(name, count)| (name.clone(), *count)).collect();
        // Counts alone are not a total order; the name tie-break keeps
        // equal-count rules stable.
        matched.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let loops: BTreeSet<(String, String)> = loop_vars
            .iter()
            .map(|(name, expr)| (name.clone(), expr.to_string()))
            .collect();

        let failed: BTreeSet<(String, String)> = proofs
            .iter()
            .map(|(failed, original)| (failed.to_string(), original.to_string()))
            .collect();

        Report {
            matched_simplifier_rules: matched,
            non_monotonic_loop_vars: loops.into_iter().collect(),
            failed_to_prove: failed.into_iter().collect(),
        }
    }
}

/// Writes a `Report` to its destination.
pub struct ReportWriter {
    destination: ReportDestination,
}

impl ReportWriter {
    /// Create a writer for the given destination.
    pub fn new(destination: ReportDestination) -> Self {
        ReportWriter { destination }
    }

    /// Render the report and flush it. I/O failures are surfaced to the
    /// caller, never retried.
    pub fn write(&self, report: &Report) -> Result<(), String> {
        match &self.destination {
            ReportDestination::File(path) => {
                let file = File::create(path).map_err(|e| {
                    format!("Failed to create report file {}: {}", path.display(), e)
                })?;
                let mut out = BufWriter::new(file);
                render(report, &mut out)
                    .map_err(|e| format!("Failed to write report: {}", e))?;
                out.flush()
                    .map_err(|e| format!("Failed to flush report: {}", e))
            }
            ReportDestination::Stderr => {
                let stderr = io::stderr();
                let mut out = stderr.lock();
                render(report, &mut out)
                    .map_err(|e| format!("Failed to write report to stderr: {}", e))?;
                out.flush()
                    .map_err(|e| format!("Failed to flush stderr: {}", e))
            }
        }
    }
}

/// Render the line-oriented, brace-delimited report.
///
/// Near-JSON: every entry keeps a trailing separator, including the last.
/// Keys are JSON-escaped; expression values are rendered verbatim.
fn render<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
    writeln!(out, "{{")?;
    writeln!(out, " \"name\": \"TelemetrySession\",")?;

    writeln!(out, " \"matched_simplifier_rules\": {{")?;
    for (rule, count) in &report.matched_simplifier_rules {
        writeln!(out, "  {} : {},", json_key(rule), count)?;
    }
    writeln!(out, " }},")?;

    writeln!(out, " \"non_monotonic_loop_vars\": {{")?;
    for (loop_var, expr) in &report.non_monotonic_loop_vars {
        writeln!(out, "  {} : {},", json_key(loop_var), expr)?;
    }
    writeln!(out, " }},")?;

    writeln!(out, " \"failed_to_prove\": {{")?;
    for (failed, original) in &report.failed_to_prove {
        writeln!(out, "  {} : {},", json_key(failed), original)?;
    }
    writeln!(out, " }},")?;

    writeln!(out, "}}")
}

/// Quote and escape a key as a JSON string.
fn json_key(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Type;

    fn rules_of(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect()
    }

    #[test]
    fn test_rule_sort_descending_with_name_tiebreak() {
        let report = Report::build(&rules_of(&[("a", 3), ("b", 5), ("c", 5)]), &[], &[]);
        let order: Vec<&str> = report
            .matched_simplifier_rules
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(order, ["b", "c", "a"]);
    }

    #[test]
    fn test_pairs_deduplicated_and_sorted() {
        let expr = Expr::var(Type::Int32, "anon0");
        let loops = vec![
            ("anon1".to_string(), expr.clone()),
            ("anon1".to_string(), expr.clone()),
            ("anon0".to_string(), expr.clone()),
        ];
        let report = Report::build(&HashMap::new(), &loops, &[]);
        assert_eq!(
            report.non_monotonic_loop_vars,
            vec![
                ("anon0".to_string(), "anon0".to_string()),
                ("anon1".to_string(), "anon0".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_layout() {
        let report = Report::build(
            &rules_of(&[("sub_cancel", 2)]),
            &[("anon0".to_string(), Expr::var(Type::Int32, "anon1"))],
            &[],
        );
        let mut out = Vec::new();
        render(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "{\n \"name\": \"TelemetrySession\",\n \"matched_simplifier_rules\": {\n  \"sub_cancel\" : 2,\n },\n \"non_monotonic_loop_vars\": {\n  \"anon0\" : anon1,\n },\n \"failed_to_prove\": {\n },\n}\n"
        );
    }

    #[test]
    fn test_json_key_escaping() {
        assert_eq!(json_key("plain"), "\"plain\"");
        assert_eq!(json_key("has \"quote\""), "\"has \\\"quote\\\"\"");
    }

    #[test]
    fn test_write_surfaces_io_failure() {
        let writer = ReportWriter::new(ReportDestination::File(PathBuf::from(
            "/nonexistent-dir/report.txt",
        )));
        let report = Report::build(&HashMap::new(), &[], &[]);
        let err = writer.write(&report).unwrap_err();
        assert!(
            err.starts_with("Failed to create report file"),
            "unexpected error: {}",
            err
        );
    }
}
