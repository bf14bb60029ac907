//! Plain text output

use super::Report;
use crate::distributed::Aggregate;
use std::io::{self, Write};

/// Write one line per match, or the bare count for count-only queries
///
/// Node counts are not part of the text format.
pub fn write_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    match &report.aggregate {
        Aggregate::Count(count) => writeln!(out, "{}", count),
        Aggregate::Lines(lines) => {
            for line in lines {
                writeln!(out, "{}", line)?;
            }
            Ok(())
        }
    }
}
