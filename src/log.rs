use std::env;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
}

impl Level {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" | "err" | "quiet" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        }
    }
}

/// Threshold from `SIEVE_LOG`; unrecognized values fall back to `info` so a
/// typo never silences progress reporting.
static THRESHOLD: LazyLock<Level> = LazyLock::new(|| {
    env::var("SIEVE_LOG")
        .ok()
        .and_then(|s| Level::parse(&s))
        .unwrap_or(Level::Info)
});

fn emit(level: Level, msg: &str) {
    if *THRESHOLD >= level {
        eprintln!("{}: {}", level.prefix(), msg);
    }
}

pub fn error(msg: impl AsRef<str>) {
    emit(Level::Error, msg.as_ref());
}

pub fn warn(msg: impl AsRef<str>) {
    emit(Level::Warn, msg.as_ref());
}

pub fn info(msg: impl AsRef<str>) {
    emit(Level::Info, msg.as_ref());
}
