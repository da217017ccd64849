//! Console output.
//!
//! Commands echo the request before sending it and then print the reply, both
//! as pretty JSON on stdout. Logs go to stderr, so stdout stays parseable.

use std::io::{self, Write};

use centerctl_common::protocol::{CenterError, Reply, Result};

/// Prefix of scenario step titles.
const BANNER: &str = "********************";

pub struct Printer<W = io::Stdout> {
    out: W,
    quiet: bool,
}

impl Printer<io::Stdout> {
    pub fn stdout(quiet: bool) -> Self {
        Printer::new(io::stdout(), quiet)
    }
}

impl<W: Write> Printer<W> {
    /// With `quiet` set, request echoes are suppressed; replies and errors
    /// are always printed.
    pub fn new(out: W, quiet: bool) -> Self {
        Printer { out, quiet }
    }

    pub fn banner(&mut self, title: &str) -> Result<()> {
        writeln!(self.out, "{}{}", BANNER, title).map_err(CenterError::Output)
    }

    /// Echoes a request under `label` (method or struct name).
    pub fn request(&mut self, label: &str, request: &serde_json::Value) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let rendered = serde_json::to_string_pretty(request)?;
        writeln!(self.out, ">>> {}\n{}", label, rendered).map_err(CenterError::Output)
    }

    pub fn reply(&mut self, reply: &Reply) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&reply.to_json())?;
        let written = if self.quiet {
            writeln!(self.out, "{}", rendered)
        } else {
            writeln!(self.out, "<<< {}\n{}", reply.method, rendered)
        };
        written
            .and_then(|()| self.out.flush())
            .map_err(CenterError::Output)
    }

    /// Prints an error that the caller chose to tolerate.
    pub fn error(&mut self, err: &CenterError) -> Result<()> {
        writeln!(self.out, "{}", describe(err)).map_err(CenterError::Output)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One-line rendering of an error, prefixed with its kind.
pub fn describe(err: &CenterError) -> String {
    format!("{}: {}", err.kind().as_str(), err)
}
