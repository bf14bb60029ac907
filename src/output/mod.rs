//! Result output
//!
//! Query results are printed either as plain text (one line per match, or the
//! total count) or as a single JSON object.

pub mod json;
pub mod text;

use crate::distributed::{Aggregate, QueryResult};
use std::io::{self, Write};

/// A finished query, ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Node counts, present for distributed queries only
    pub nodes: Option<NodeCounts>,
    pub aggregate: Aggregate,
}

/// Successful and participating node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCounts {
    pub ok: usize,
    pub total: usize,
}

impl Report {
    /// Report for a run that never left this process
    pub fn local(aggregate: Aggregate) -> Self {
        Self { nodes: None, aggregate }
    }
}

impl From<QueryResult> for Report {
    fn from(result: QueryResult) -> Self {
        Self {
            nodes: Some(NodeCounts {
                ok: result.nodes_ok,
                total: result.nodes_total,
            }),
            aggregate: result.aggregate,
        }
    }
}

/// Print `report` to stdout in the selected format
pub fn print_report(report: &Report, json: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        json::write_report(&mut out, report)?;
    } else {
        text::write_report(&mut out, report)?;
    }
    out.flush()
}
