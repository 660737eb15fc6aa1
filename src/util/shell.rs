//! Shell output: status lines and progress bars.
//!
//! Status lines go to stderr as `{status:>12} {message}`; the status word is
//! colored when stderr is a terminal (or when forced).

use std::fmt::Display;
use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no progress
    Quiet,
    #[default]
    Normal,
    /// --verbose: no progress bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status words for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Added,
    Created,
    Detected,
    Finished,
    Removed,
    Updated,

    Building,
    Cleaning,
    Fetching,
    Resolving,

    Info,

    Skipped,
    Warning,

    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Added => "Added",
            Status::Created => "Created",
            Status::Detected => "Detected",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Updated => "Updated",
            Status::Building => "Building",
            Status::Cleaning => "Cleaning",
            Status::Fetching => "Fetching",
            Status::Resolving => "Resolving",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Added
            | Status::Created
            | Status::Detected
            | Status::Finished
            | Status::Removed
            | Status::Updated => "\x1b[1;32m",
            Status::Building | Status::Cleaning | Status::Fetching | Status::Resolving => {
                "\x1b[1;36m"
            }
            Status::Info => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print a status line. Only errors survive quiet mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!("{}{:>width$}\x1b[0m", status.color_code(), text, width = STATUS_WIDTH)
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// A progress bar over `total` units; hidden in quiet and verbose modes.
    pub fn progress(&self, total: u64, msg: impl Display) -> Progress {
        let pb = if self.verbosity == Verbosity::Normal && io::stderr().is_terminal() {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(msg.to_string());
            Some(pb)
        } else {
            None
        };
        Progress { pb }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// Progress bar wrapper that respects shell verbosity.
pub struct Progress {
    pb: Option<ProgressBar>,
}

impl Progress {
    pub fn set_length(&self, total: u64) {
        if let Some(pb) = &self.pb {
            pb.set_length(total);
        }
    }

    pub fn set_position(&self, pos: u64) {
        if let Some(pb) = &self.pb {
            pb.set_position(pos);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.pb.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("ALWAYS".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("sometimes".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);
        let formatted = shell.format_status(Status::Fetching);
        assert_eq!(formatted, "    Fetching");

        let shell = Shell::new(Verbosity::Normal, ColorChoice::Always);
        assert!(shell.format_status(Status::Error).starts_with("\x1b[1;31m"));
    }

    #[test]
    fn test_from_flags() {
        assert!(Shell::from_flags(true, true, ColorChoice::Never).is_quiet());
        assert!(Shell::from_flags(false, true, ColorChoice::Never).is_verbose());
        let shell = Shell::from_flags(false, false, ColorChoice::Never);
        assert!(!shell.is_quiet() && !shell.is_verbose());
    }

    #[test]
    fn test_quiet_progress_is_hidden() {
        let shell = Shell::new(Verbosity::Quiet, ColorChoice::Never);
        let progress = shell.progress(10, "cloning");
        assert!(progress.is_hidden());
        progress.set_position(5);
        progress.finish();
    }
}
