//! Trace file parsing.
//!
//! A trace holds one command per line. `#` starts a comment and blank lines
//! are skipped. Numbers are decimal or `0x`-prefixed hex, with optional `_`
//! separators.
//!
//! ```text
//! init
//! w 0x1000 4 0xCAFEBABE
//! r 0x1000 4
//! p 0x1000 4      # probe both levels
//! flush
//! ```

use thiserror::Error;

/// One trace command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `r ADDR LEN`
    Read { addr: u64, len: usize },
    /// `w ADDR LEN VALUE`
    Write { addr: u64, len: usize, value: u32 },
    /// `p ADDR LEN`
    Probe { addr: u64, len: usize },
    /// `flush`
    Flush,
    /// `init`
    Init,
}

/// A malformed trace line. Line numbers start at 1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("line {line}: unknown command `{word}`")]
    UnknownCommand { line: usize, word: String },

    #[error("line {line}: `{command}` takes {expected} operand(s), got {got}")]
    Operands {
        line: usize,
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: `{text}` is not a number")]
    Number { line: usize, text: String },

    #[error("line {line}: access width must be 1, 2 or 4, got {len}")]
    Width { line: usize, len: u64 },

    #[error("line {line}: value {value:#x} does not fit in 32 bits")]
    Value { line: usize, value: u64 },
}

/// Parses a decimal or `0x` hex number.
pub fn parse_number(text: &str) -> Option<u64> {
    let digits = text.replace('_', "");
    match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}

/// Parses a whole trace into `(line number, command)` pairs.
///
/// # Errors
///
/// Returns the first malformed line.
pub fn parse(text: &str) -> Result<Vec<(usize, Command)>, TraceError> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(command) = parse_line(idx + 1, raw)? {
            commands.push((idx + 1, command));
        }
    }
    Ok(commands)
}

/// Parses one line; `Ok(None)` for blank and comment-only lines.
///
/// # Errors
///
/// Returns a [`TraceError`] naming `line` if the command is unknown, has the
/// wrong number of operands, or an operand is out of range.
pub fn parse_line(line: usize, raw: &str) -> Result<Option<Command>, TraceError> {
    let body = raw.split('#').next().unwrap_or_default();
    let mut words = body.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let operands: Vec<&str> = words.collect();

    let arity = |command: &'static str, expected: usize| {
        if operands.len() == expected {
            Ok(())
        } else {
            Err(TraceError::Operands {
                line,
                command,
                expected,
                got: operands.len(),
            })
        }
    };
    let number = |text: &str| {
        parse_number(text).ok_or_else(|| TraceError::Number {
            line,
            text: text.to_owned(),
        })
    };
    let width = |text: &str| -> Result<usize, TraceError> {
        let len = number(text)?;
        match len {
            1 | 2 | 4 => Ok(len as usize),
            _ => Err(TraceError::Width { line, len }),
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "r" => {
            arity("r", 2)?;
            Command::Read {
                addr: number(operands[0])?,
                len: width(operands[1])?,
            }
        }
        "w" => {
            arity("w", 3)?;
            let value = number(operands[2])?;
            Command::Write {
                addr: number(operands[0])?,
                len: width(operands[1])?,
                value: u32::try_from(value).map_err(|_| TraceError::Value { line, value })?,
            }
        }
        "p" => {
            arity("p", 2)?;
            Command::Probe {
                addr: number(operands[0])?,
                len: width(operands[1])?,
            }
        }
        "flush" => {
            arity("flush", 0)?;
            Command::Flush
        }
        "init" => {
            arity("init", 0)?;
            Command::Init
        }
        _ => {
            return Err(TraceError::UnknownCommand {
                line,
                word: word.to_owned(),
            });
        }
    };
    Ok(Some(command))
}
