use std::io::{self, Write};

use serde::Serialize;

use crate::pipeline::RunSummary;
use crate::tree::NormalizedTree;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
        Self::print_line(&json)
    }

    /// One normalized tree per line.
    pub fn print_tree(tree: &NormalizedTree) -> io::Result<()> {
        Self::print_compact(tree)
    }

    fn print_compact<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string(value).map_err(io::Error::other)?;
        Self::print_line(&json)
    }

    fn print_line(json: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
