//! Line input
//!
//! Reads the line-oriented dataset from a file or stdin. Line terminators
//! (`\n` and a preceding `\r`) are stripped, invalid UTF-8 is replaced rather
//! than rejected, and a single line may not exceed `MAX_LINE_BYTES`.

use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Longest accepted line, terminator excluded
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Read all lines from `file`, or from stdin when it is `None` or `-`
pub fn read_lines(file: Option<&Path>) -> Result<Vec<String>> {
    match file {
        Some(path) if path.as_os_str() != "-" => read_lines_from_file(path),
        _ => {
            let stdin = io::stdin();
            read_lines_from_reader(stdin.lock()).context("Failed to read stdin")
        }
    }
}

/// Read all lines from the file at `path`
pub fn read_lines_from_file(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_lines_from_reader(BufReader::new(file)).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read all lines from `reader`
pub fn read_lines_from_reader<R: BufRead>(mut reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(1024);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if buf.len() > MAX_LINE_BYTES {
            anyhow::bail!("line {} is too long ({} bytes, max {})", lines.len() + 1, buf.len(), MAX_LINE_BYTES);
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(lines)
}
