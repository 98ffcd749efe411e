// Console reporting
// Tagged result lines shared by the verify and create commands

use colored::Colorize;

/// Kind of result line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Passed,
    Failed,
    Completed,
    CompletedPerfect,
    Error,
    Critical,
    Processed,
}

impl LogType {
    /// Per-file lines, hidden when only final results are wanted
    pub fn is_per_file(&self) -> bool {
        matches!(self, LogType::Passed | LogType::Failed | LogType::Processed)
    }
}

/// Formats a result line, without color
pub fn format_line(log: LogType, message: &str) -> String {
    match log {
        LogType::Passed => format!("[Passed] {}", message),
        LogType::Failed => format!("[Failed] {}", message),
        LogType::Completed => format!("[Completed] {}", message),
        LogType::CompletedPerfect => format!("[Success] All {} files successfully validated", message),
        LogType::Error => format!("[Error] {}", message),
        LogType::Critical => format!("[Critical Error] {}", message),
        LogType::Processed => format!("[Processed] {}", message),
    }
}

/// Prints result lines to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    final_results_only: bool,
    quiet: bool,
}

impl Console {
    pub fn new(final_results_only: bool) -> Self {
        Self {
            final_results_only,
            quiet: false,
        }
    }

    /// A console that prints nothing (library use, tests)
    pub fn silent() -> Self {
        Self {
            final_results_only: true,
            quiet: true,
        }
    }

    pub fn final_results_only(&self) -> bool {
        self.final_results_only
    }

    pub fn is_silent(&self) -> bool {
        self.quiet
    }

    /// Whether a line of kind `log` is printed; lines of the closing
    /// summary (`final_result`) survive results-only mode
    pub fn prints(&self, log: LogType, final_result: bool) -> bool {
        !self.quiet && (final_result || !(self.final_results_only && log.is_per_file()))
    }

    pub fn log(&self, log: LogType, message: &str) {
        self.emit(log, message, false);
    }

    /// Print a line of the closing summary
    pub fn log_final(&self, log: LogType, message: &str) {
        self.emit(log, message, true);
    }

    fn emit(&self, log: LogType, message: &str, final_result: bool) {
        if !self.prints(log, final_result) {
            return;
        }
        let line = format_line(log, message);
        let line = match log {
            LogType::Passed | LogType::CompletedPerfect => line.green(),
            LogType::Failed | LogType::Error => line.red(),
            LogType::Critical => line.red().bold(),
            LogType::Completed => line.bold(),
            LogType::Processed => line.normal(),
        };
        println!("{}", line);
    }
}
