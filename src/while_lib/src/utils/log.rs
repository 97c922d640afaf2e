//! Structs and functions for generating log messages and printing analysis results.

use crate::prelude::*;
use crate::AnalysisResult;

/// A generic log message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct LogMessage {
    /// The log message.
    pub text: String,
    /// The severity/type of the log message.
    pub level: LogLevel,
    /// The component where the message originated.
    pub source: Option<String>,
}

impl LogMessage {
    /// Create a new `Info`-level log message.
    pub fn new_info(text: impl Into<String>) -> LogMessage {
        LogMessage {
            text: text.into(),
            level: LogLevel::Info,
            source: None,
        }
    }

    /// Create a new `Debug`-level log message.
    pub fn new_debug(text: impl Into<String>) -> LogMessage {
        LogMessage {
            text: text.into(),
            level: LogLevel::Debug,
            source: None,
        }
    }

    /// Create a new `Error`-level log message.
    pub fn new_error(text: impl Into<String>) -> LogMessage {
        LogMessage {
            text: text.into(),
            level: LogLevel::Error,
            source: None,
        }
    }

    /// Set the name of the source component for the log message.
    pub fn source(mut self, source: impl Into<String>) -> LogMessage {
        self.source = Some(source.into());
        self
    }
}

/// The severity/type of a log message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub enum LogLevel {
    /// Messages intended for debugging.
    Debug,
    /// Errors encountered during analysis.
    Error,
    /// Non-error messages intended for the user.
    Info,
}

impl std::fmt::Display for LogMessage {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            LogLevel::Debug => write!(formatter, "DEBUG: ")?,
            LogLevel::Error => write!(formatter, "ERROR: ")?,
            LogLevel::Info => write!(formatter, "INFO: ")?,
        };
        if let Some(source) = &self.source {
            write!(formatter, "{source}: ")?;
        }
        write!(formatter, "{}", self.text)
    }
}

/// Print all provided log messages and analysis results.
///
/// Log messages are always printed to `stdout`. The analysis results are
/// either printed to `stdout` or to the file path provided in `out_path`.
/// If `emit_json` is set, the results are converted to JSON for the output.
pub fn print_all_messages(
    logs: Vec<LogMessage>,
    results: Vec<AnalysisResult>,
    out_path: Option<&str>,
    emit_json: bool,
) {
    for log in logs {
        println!("{log}");
    }
    let mut output: String = if emit_json {
        serde_json::to_string_pretty(&results).unwrap()
    } else {
        results
            .iter()
            .map(|result| format!("{result}"))
            .collect::<Vec<String>>()
            .join("\n")
    };
    output.push('\n');
    if let Some(file_path) = out_path {
        std::fs::write(file_path, output).unwrap_or_else(|error| {
            panic!("Writing to output path {file_path} failed: {error}")
        });
    } else {
        print!("{output}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_messages_render_with_level_and_source() {
        let message = LogMessage::new_info("done").source("Interval");
        assert_eq!(message.to_string(), "INFO: Interval: done");
        let message = LogMessage::new_error("oh no");
        assert_eq!(message.to_string(), "ERROR: oh no");
    }
}
