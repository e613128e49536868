use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shell a pipeline runs its commands through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ShellDialect {
    /// `sh '...'`
    #[default]
    #[value(alias = "sh")]
    Posix,
    /// `bat "..."`
    #[value(alias = "bat")]
    Windows,
    /// `sh "osascript -e '...'"`
    #[value(alias = "osascript")]
    AppleScript,
}

/// Tag that names no known dialect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported shell dialect: {0}")]
pub struct UnknownDialect(pub String);

impl ShellDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellDialect::Posix => "posix",
            ShellDialect::Windows => "windows",
            ShellDialect::AppleScript => "apple-script",
        }
    }

    /// Short executor name used in prose ("sh", "bat", "osascript")
    pub fn executor(&self) -> &'static str {
        match self {
            ShellDialect::Posix => "sh",
            ShellDialect::Windows => "bat",
            ShellDialect::AppleScript => "osascript",
        }
    }

    /// Wraps one command as a pipeline step
    pub fn wrap(&self, command: &str) -> String {
        match self {
            ShellDialect::Posix => format!("sh '{}'", groovy_single(command)),
            ShellDialect::Windows => format!("bat \"{}\"", groovy_double(command)),
            ShellDialect::AppleScript => {
                let shell_quoted = command.replace('\'', r"'\''");
                format!("sh \"osascript -e '{}'\"", groovy_double(&shell_quoted))
            }
        }
    }
}

/// Escapes text for a single-quoted Groovy string
pub fn groovy_single(text: &str) -> String {
    escape_line_breaks(&text.replace('\\', r"\\").replace('\'', r"\'"))
}

/// Escapes text for a double-quoted (interpolating) Groovy string
pub fn groovy_double(text: &str) -> String {
    let escaped = text
        .replace('\\', r"\\")
        .replace('"', "\\\"")
        .replace('$', r"\$");
    escape_line_breaks(&escaped)
}

/// Groovy quoted strings cannot span lines
fn escape_line_breaks(text: &str) -> String {
    text.replace('\r', r"\r").replace('\n', r"\n")
}

impl FromStr for ShellDialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "posix" | "sh" | "bash" => Ok(ShellDialect::Posix),
            "windows" | "bat" | "cmd" => Ok(ShellDialect::Windows),
            "apple-script" | "applescript" | "osascript" => Ok(ShellDialect::AppleScript),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for ShellDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
