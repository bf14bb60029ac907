//! CLI argument parsing using clap
//!
//! Two subcommands, `serve` and `run`; anything that is not a known
//! subcommand is parsed as `run`. Long flags may be written Go-style with a
//! single dash (`-pattern error`, `-show-node`), they are rewritten to
//! `--pattern`/`--show-node` before clap sees them.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Long flags that consume the following argument as their value
const VALUE_FLAGS: &[&str] = &[
    "addr", "node", "workers", "data-file", "config", "pattern", "file", "peers", "timeout", "quorum",
];

/// Short flags that consume the following argument as their value
const SHORT_VALUE_FLAGS: &[&str] = &["m"];

/// Usage text printed for `help` and for an empty command line
pub const USAGE: &str = "\
distgrep: distributed quorum grep

LOCAL:
  cat data.txt | distgrep -E -i -pattern \"error\"
  distgrep -F -pattern \"needle\" -file data.txt
  distgrep -c -pattern \"WARN\" -file logs.txt

SERVER:
  distgrep serve -addr :8080 -node nodeA
  distgrep serve -addr :8081 -node nodeB -data-file /var/log/app.log

DISTRIBUTED:
  cat big.log | distgrep -pattern \"timeout\" -peers http://localhost:8080,http://localhost:8081 -show-node
  distgrep -c -pattern \"ERROR\" -file big.log -peers nodeA:8080,nodeB:8081 -timeout 15s

FLAGS:
  run (default), serve, help
  -pattern STR (required), -file PATH (or stdin)
  -peers URL1,URL2,...        peer nodes
  -quorum N                   default majority (N/2+1)
  -i, -F, -E, -v, -m NUM, -c
  -workers N, -timeout 10s, -json, -show-node, -config FILE
";

/// Node server arguments
#[derive(Parser, Debug, Default)]
#[command(name = "distgrep serve")]
#[command(version, about = "Serve match requests from a coordinator", long_about = None)]
pub struct ServeArgs {
    /// HTTP listen address (default ":8080")
    #[arg(long)]
    pub addr: Option<String>,

    /// Node identifier (default: the listen address)
    #[arg(long)]
    pub node: Option<String>,

    /// Workers per request when the request does not specify them (default 4)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Local file to grep when a request carries no lines
    #[arg(long = "data-file")]
    pub data_file: Option<PathBuf>,

    /// TOML configuration file ([serve] table)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Query arguments
#[derive(Parser, Debug, Default)]
#[command(name = "distgrep run")]
#[command(version, about = "Run a match query locally or across peers", long_about = None)]
pub struct RunArgs {
    /// Pattern to match (or first positional argument)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Positional arguments; the first one is the pattern when -pattern is absent
    #[arg(value_name = "PATTERN")]
    pub positional: Vec<String>,

    /// Read input from file (default: stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Comma-separated peer base URLs (e.g. http://host1:8080,host2:8081)
    #[arg(long)]
    pub peers: Option<String>,

    /// Workers per node (default: number of CPUs)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Overall timeout (e.g. 10s, 1500ms, 1m30s)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Quorum size (default: majority)
    #[arg(long)]
    pub quorum: Option<usize>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Prefix lines with the node id
    #[arg(long = "show-node")]
    pub show_node: bool,

    /// Fixed string match
    #[arg(short = 'F')]
    pub fixed: bool,

    /// Regex match (default); -E=false disables an explicit regex request
    #[arg(short = 'E', action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub regex: Option<bool>,

    /// Ignore case
    #[arg(short = 'i')]
    pub ignore_case: bool,

    /// Invert match
    #[arg(short = 'v')]
    pub invert: bool,

    /// Stop a worker after NUM matches (per worker)
    #[arg(short = 'm', value_name = "NUM")]
    pub max_count: Option<u64>,

    /// Print only the count
    #[arg(short = 'c')]
    pub count_only: bool,

    /// TOML configuration file ([run] table)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parsed command line
#[derive(Debug)]
pub enum Command {
    Serve(ServeArgs),
    Run(RunArgs),
    /// Print usage and exit with the given code
    Usage(i32),
}

/// Parse the process arguments (binary name excluded)
pub fn parse_command<I>(args: I) -> Result<Command, clap::Error>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let Some(first) = args.first() else {
        return Ok(Command::Usage(2));
    };

    match first.as_str() {
        "serve" => {
            let argv = std::iter::once("distgrep serve".to_string()).chain(normalize_flags(&args[1..]));
            Ok(Command::Serve(ServeArgs::try_parse_from(argv)?))
        }
        "run" => {
            let argv = std::iter::once("distgrep run".to_string()).chain(normalize_flags(&args[1..]));
            Ok(Command::Run(RunArgs::try_parse_from(argv)?))
        }
        "help" | "-h" | "--help" | "-help" => Ok(Command::Usage(0)),
        _ => {
            let argv = std::iter::once("distgrep run".to_string()).chain(normalize_flags(&args));
            Ok(Command::Run(RunArgs::try_parse_from(argv)?))
        }
    }
}

/// Rewrite single-dash long flags to the double-dash form
///
/// Values of value-taking flags are left untouched, so `-pattern -x` keeps
/// `-x` as the pattern. Everything after `--` is passed through.
pub fn normalize_flags(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut expect_value = false;
    let mut passthrough = false;

    for arg in args {
        if passthrough || expect_value {
            expect_value = false;
            out.push(arg.clone());
            continue;
        }
        if arg == "--" {
            passthrough = true;
            out.push(arg.clone());
            continue;
        }

        let (dashes, body) = if let Some(rest) = arg.strip_prefix("--") {
            ("--", rest)
        } else if let Some(rest) = arg.strip_prefix('-') {
            ("-", rest)
        } else {
            out.push(arg.clone());
            continue;
        };

        let name = body.split('=').next().unwrap_or(body);
        let has_inline_value = body.contains('=');

        if dashes == "-" && name.chars().count() > 1 && !name.starts_with(|c: char| c.is_ascii_digit()) {
            out.push(format!("-{}", arg));
            expect_value = !has_inline_value && VALUE_FLAGS.contains(&name);
        } else {
            out.push(arg.clone());
            expect_value = !has_inline_value
                && if dashes == "--" {
                    VALUE_FLAGS.contains(&name)
                } else {
                    SHORT_VALUE_FLAGS.contains(&name)
                };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_go_style_flags() {
        let out = normalize_flags(&args(&["-pattern", "error", "-show-node", "-i", "-m", "3", "-timeout=5s"]));
        assert_eq!(out, args(&["--pattern", "error", "--show-node", "-i", "-m", "3", "--timeout=5s"]));
    }

    #[test]
    fn test_normalize_keeps_dash_values() {
        let out = normalize_flags(&args(&["-pattern", "-weird", "-m", "-1"]));
        assert_eq!(out, args(&["--pattern", "-weird", "-m", "-1"]));

        let out = normalize_flags(&args(&["--file", "-", "--", "-literal"]));
        assert_eq!(out, args(&["--file", "-", "--", "-literal"]));
    }

    #[test]
    fn test_empty_is_usage_error() {
        assert!(matches!(parse_command(Vec::new()).unwrap(), Command::Usage(2)));
        assert!(matches!(parse_command(args(&["help"])).unwrap(), Command::Usage(0)));
    }

    #[test]
    fn test_serve_flags() {
        let cmd = parse_command(args(&["serve", "-addr", ":8081", "-node", "nodeB", "-workers", "8", "-data-file", "/tmp/d"]))
            .unwrap();
        let Command::Serve(serve) = cmd else { panic!("expected serve") };
        assert_eq!(serve.addr.as_deref(), Some(":8081"));
        assert_eq!(serve.node.as_deref(), Some("nodeB"));
        assert_eq!(serve.workers, Some(8));
        assert_eq!(serve.data_file, Some(PathBuf::from("/tmp/d")));
    }

    #[test]
    fn test_run_is_default() {
        let cmd = parse_command(args(&["-c", "-i", "-pattern", "WARN", "-peers", "a:1,b:2", "-quorum", "2"])).unwrap();
        let Command::Run(run) = cmd else { panic!("expected run") };
        assert!(run.count_only);
        assert!(run.ignore_case);
        assert_eq!(run.pattern.as_deref(), Some("WARN"));
        assert_eq!(run.peers.as_deref(), Some("a:1,b:2"));
        assert_eq!(run.quorum, Some(2));
        assert_eq!(run.regex, None);
    }

    #[test]
    fn test_run_positional_pattern_and_regex_switch() {
        let cmd = parse_command(args(&["run", "-F", "-E", "needle", "-m", "5"])).unwrap();
        let Command::Run(run) = cmd else { panic!("expected run") };
        assert!(run.fixed);
        assert_eq!(run.regex, Some(true));
        assert_eq!(run.positional, args(&["needle"]));
        assert_eq!(run.max_count, Some(5));

        let cmd = parse_command(args(&["-E=false", "x"])).unwrap();
        let Command::Run(run) = cmd else { panic!("expected run") };
        assert_eq!(run.regex, Some(false));
    }

    #[test]
    fn test_unknown_flag_is_error() {
        assert!(parse_command(args(&["-bogus", "x"])).is_err());
    }
}
