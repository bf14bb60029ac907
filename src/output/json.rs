//! JSON output formatting
//!
//! A report is written as one compact JSON object followed by a newline:
//!
//! ```text
//! {"nodes_ok":2,"nodes_total":3,"lines":["error: a"]}
//! {"nodes_ok":3,"nodes_total":3,"count":17}
//! ```
//!
//! Local-only runs omit `nodes_ok` and `nodes_total`.

use super::Report;
use crate::distributed::Aggregate;
use serde::Serialize;
use std::io::{self, Write};

/// Serialized shape of a report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_ok: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<'a> From<&'a Report> for JsonReport<'a> {
    fn from(report: &'a Report) -> Self {
        let (lines, count) = match &report.aggregate {
            Aggregate::Lines(lines) => (Some(lines.as_slice()), None),
            Aggregate::Count(count) => (None, Some(*count)),
        };
        Self {
            nodes_ok: report.nodes.map(|n| n.ok),
            nodes_total: report.nodes.map(|n| n.total),
            lines,
            count,
        }
    }
}

/// Write `report` as a single JSON line
pub fn write_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    serde_json::to_writer(&mut *out, &JsonReport::from(report))?;
    writeln!(out)
}
