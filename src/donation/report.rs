//! Outcome reporting.
//!
//! The flow only talks to `OutcomeReporter`; what a notice turns into (a
//! log line, terminal output, a toast) is up to the implementation.

use crate::blockchain::types::Signature;

/// Longest error text shown before truncation.
pub const MAX_MESSAGE_CHARS: usize = 100;

/// Marker of generic relay failures, replaced by `GENERIC_FAILURE_MESSAGE`.
pub const GENERIC_FAILURE_MARKER: &str = "Transaction failed:";

pub const GENERIC_FAILURE_MESSAGE: &str = "Transaction failed - please try again";

/// Shorten lower-layer error text for display.
pub fn format_error_message(error: &str) -> String {
    if error.contains(GENERIC_FAILURE_MARKER) {
        return GENERIC_FAILURE_MESSAGE.to_string();
    }
    if error.chars().count() > MAX_MESSAGE_CHARS {
        let mut short: String = error.chars().take(MAX_MESSAGE_CHARS).collect();
        short.push_str("...");
        return short;
    }
    error.to_string()
}

/// `head...tail` form of a long identifier.
pub fn shorten(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= head + tail {
        return value.to_string();
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}

/// Connected wallet display form.
pub fn shorten_address(address: &str) -> String {
    shorten(address, 4, 4)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerLink {
    pub url: String,
    pub label: String,
}

impl ExplorerLink {
    pub fn for_signature(explorer_url: &str, signature: &Signature) -> Self {
        Self {
            url: format!("{}/{}", explorer_url.trim_end_matches('/'), signature),
            label: shorten(&signature.to_string(), 6, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Loading,
    Info,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub link: Option<ExplorerLink>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            link: None,
        }
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Loading, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// Failure notice; the message goes through `format_error_message`.
    pub fn failure(message: impl AsRef<str>) -> Self {
        Self::new(NoticeLevel::Failure, format_error_message(message.as_ref()))
    }

    pub fn with_link(mut self, link: ExplorerLink) -> Self {
        self.link = Some(link);
        self
    }
}

/// Sink for user-visible notices.
pub trait OutcomeReporter: Send + Sync {
    fn report(&self, notice: Notice);
}

/// Reports notices as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn report(&self, notice: Notice) {
        let link = notice.link.as_ref().map(|l| l.url.as_str()).unwrap_or("");
        match notice.level {
            NoticeLevel::Failure => tracing::warn!(link, "{}", notice.message),
            NoticeLevel::Loading => tracing::debug!("{}", notice.message),
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(link, "{}", notice.message),
        }
    }
}

/// Prints notices for the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl OutcomeReporter for ConsoleReporter {
    fn report(&self, notice: Notice) {
        let line = match &notice.link {
            Some(link) => format!("{} [{}] {}", notice.message, link.label, link.url),
            None => notice.message.clone(),
        };
        match notice.level {
            NoticeLevel::Loading => println!("… {}", line),
            NoticeLevel::Info => println!("ℹ {}", line),
            NoticeLevel::Success => println!("✔ {}", line),
            NoticeLevel::Failure => eprintln!("✖ {}", line),
        }
    }
}
