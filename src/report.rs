// =============================================================================
// Report Rendering — console summary, grouping, HTML table, file output
// =============================================================================
//
// Consumes the scorer's public surface only. Nothing here feeds back into
// scoring.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::format::to_fixed;
use crate::signals::SignalScorer;
use crate::types::{RiskBand, Signal};

/// Score as a percentage with two decimals, e.g. `0.4567` -> `"45.67%"`.
pub fn format_score(score: f64) -> String {
    format!("{}%", to_fixed(score * 100.0, 2))
}

/// Partition signals by band, most severe band first. Insertion order is
/// kept within each band and empty bands are omitted.
pub fn group_by_classification(signals: &[Signal]) -> BTreeMap<RiskBand, Vec<Signal>> {
    let mut groups: BTreeMap<RiskBand, Vec<Signal>> = BTreeMap::new();
    for signal in signals {
        groups
            .entry(signal.classification)
            .or_default()
            .push(signal.clone());
    }
    groups
}

/// Single-table HTML rendering of `signals`.
pub fn generate_html_report(signals: &[Signal]) -> String {
    let mut html =
        String::from("<table><tr><th>ID</th><th>Score</th><th>Classification</th></tr>");
    for s in signals {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{} {}</td></tr>",
            escape_html(&s.id),
            format_score(s.composite_score),
            s.classification.badge(),
            s.classification.label(),
        ));
    }
    html.push_str("</table>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The text printed at the end of a run: report, then grouped signals.
pub fn console_summary(scorer: &SignalScorer) -> Result<String> {
    let report = serde_json::to_string_pretty(&scorer.report())
        .context("failed to serialise signal report")?;
    let grouped = serde_json::to_string_pretty(&group_by_classification(scorer.signals()))
        .context("failed to serialise grouped signals")?;

    Ok(format!(
        "=== Signal Summary ===\n{report}\n=== Grouped Signals ===\n{grouped}"
    ))
}

/// Write `content` to `path` atomically (sibling `.tmp` file, then rename).
pub fn write_output(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    std::fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename {} to {}", tmp_path.display(), path.display()))?;

    info!(path = %path.display(), bytes = content.len(), "report written");
    Ok(())
}
