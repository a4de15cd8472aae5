//! Event-journal serialization.
//!
//! The log is written as JSONL: a versioned header line followed by one
//! event per line. A journal replayed against the same initial state
//! reconstructs the final state exactly.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::Event;

/// Bump when the journal line format changes incompatibly.
pub const JOURNAL_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct JournalHeader {
    version: u32,
    events: u64,
}

/// Errors reading or writing a journal.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal io: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("journal is empty")]
    MissingHeader,

    #[error("unsupported journal version {0}")]
    UnsupportedVersion(u32),

    #[error("journal truncated: header promises {expected} events, found {found}")]
    Truncated { expected: u64, found: u64 },
}

/// Writes the full event log as a JSONL journal.
pub fn write_journal<W: Write>(out: &mut W, log: &[Event]) -> Result<(), JournalError> {
    let header = JournalHeader {
        version: JOURNAL_VERSION,
        events: log.len() as u64,
    };
    serde_json::to_writer(&mut *out, &header)?;
    writeln!(out)?;
    for event in log {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Reads a JSONL journal back into an event log, verifying the header.
pub fn read_journal<R: BufRead>(input: R) -> Result<Vec<Event>, JournalError> {
    let mut lines = input.lines();
    let header_line = lines.next().ok_or(JournalError::MissingHeader)??;
    let header: JournalHeader = serde_json::from_str(&header_line)?;
    if header.version != JOURNAL_VERSION {
        return Err(JournalError::UnsupportedVersion(header.version));
    }

    let mut log = Vec::with_capacity(header.events as usize);
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        log.push(serde_json::from_str(&line)?);
    }
    if log.len() as u64 != header.events {
        return Err(JournalError::Truncated {
            expected: header.events,
            found: log.len() as u64,
        });
    }
    Ok(log)
}
