//! Build-log tokenizer: ANSI-reset stripping and per-step splitting.
//!
//! Captured build logs interleave every pipeline step into one blob,
//! with each step introduced by a `RUNNING PLUGIN: <name>` marker line.
//! This module normalizes the blob and cuts it back into steps.

/// Literal marker the host writes before each step's output.
pub const STEP_MARKER: &str = "RUNNING PLUGIN: ";

/// Color sequences observed in captured logs. The leading-slash entry is
/// a malformed reset some steps emit; it must be removed before the
/// plain reset so the stray slash goes with it.
const ANSI_SEQUENCES: [&str; 4] = [
    "/\u{1b}[0m",
    "\u{1b}[0;32m",
    "\u{1b}[0;31m",
    "\u{1b}[0m",
];

/// One build step cut out of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// Step name, taken from the text following the marker up to the
    /// first newline.
    pub name: String,
    /// Everything after the name line, up to the next marker.
    pub output: String,
}

/// Remove every occurrence of the known ANSI color sequences.
pub fn strip_ansi(log: &str) -> String {
    let mut out = log.to_string();
    for sequence in ANSI_SEQUENCES {
        if out.contains(sequence) {
            out = out.replace(sequence, "");
        }
    }
    out
}

/// Split an already-normalized log into steps.
///
/// Text before the first marker is host preamble, not a step, and is
/// dropped. A segment without a newline is a name with empty output.
pub fn split_steps(log: &str) -> Vec<BuildStep> {
    log.split(STEP_MARKER)
        .skip(1)
        .map(|segment| {
            let (name, output) = match segment.split_once('\n') {
                Some((first_line, rest)) => (first_line, rest),
                None => (segment, ""),
            };
            BuildStep {
                name: name.to_string(),
                output: output.trim_matches('\n').to_string(),
            }
        })
        .collect()
}

/// Normalize then split, in that order: markers mangled by a color
/// sequence would otherwise be missed.
pub fn parse_steps(log: &str) -> Vec<BuildStep> {
    split_steps(&strip_ansi(log))
}
