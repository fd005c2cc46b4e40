//! Append-only plain-text run log.
//!
//! Every invocation appends one section headed by the local start time.
//! Each line written to the log is echoed to stdout so an operator running
//! the tool interactively sees exactly what the file records.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "extendRetentionLog.txt";

const SECTION_RULE: &str = "----------------";

/// Run log writer. Generic over the sink so tests can log to memory.
pub struct RunLog<W: Write = File> {
    sink: W,
    echo_stdout: bool,
}

impl RunLog<File> {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file, true))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(sink: W, echo_stdout: bool) -> Self {
        Self { sink, echo_stdout }
    }

    /// Write the section header for an invocation started at `started`.
    pub fn begin_section(&mut self, started: DateTime<Local>) -> io::Result<()> {
        write!(
            self.sink,
            "\n\n{SECTION_RULE}\n{}\n{SECTION_RULE}\n",
            started.format("%Y-%m-%d %H:%M")
        )?;
        self.sink.flush()
    }

    /// Append one line (to the file and, when enabled, stdout).
    pub fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        let text = text.as_ref();
        if self.echo_stdout {
            println!("{text}");
        }
        writeln!(self.sink, "{text}")?;
        self.sink.flush()
    }

    /// Append the list of selected job names (file only).
    pub fn selected_jobs<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
        writeln!(self.sink, "Selected Job List:")?;
        for name in names {
            writeln!(self.sink, "\t{name}")?;
        }
        writeln!(self.sink)?;
        self.sink.flush()
    }

    /// Consume the log and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}
