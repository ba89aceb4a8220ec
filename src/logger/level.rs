use std::fmt;

/// Severity tag attached to every log line.
///
/// The set is closed and unordered: every level is always emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Debug,
    Error,
    Http,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Info, Level::Debug, Level::Error, Level::Http];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Error => "ERROR",
            Level::Http => "HTTP",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        let names: Vec<String> = Level::ALL.iter().map(|l| l.to_string()).collect();
        assert_eq!(names, vec!["INFO", "DEBUG", "ERROR", "HTTP"]);
    }
}
