//! Structured logging with redaction
//!
//! Progress records go to stderr as one line each. Field values are masked
//! by key name before they are ever formatted:
//! - signing keys are replaced entirely
//! - owners, wallets and other addresses keep their head and tail
//! - digests, signatures and transaction ids keep a longer head

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Turn on debug records (`--verbose` in the CLI)
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One structured record
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a field, masked according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let masked = mask_by_key(key, &value.to_string());
        self.fields.push((key, masked));
        self
    }

    /// Attach a field that is always fully masked
    pub fn secret_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let masked = mask_fully(&value.to_string());
        self.fields.push((key, masked));
        self
    }

    /// Attach an address field regardless of its key
    pub fn address_field(mut self, key: &'static str, address: impl fmt::Display) -> Self {
        let masked = mask_address(&address.to_string());
        self.fields.push((key, masked));
        self
    }

    /// Render without a timestamp
    pub fn render(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields.is_empty() {
            format!("{} [{}] {}", self.level, self.module, self.message)
        } else {
            format!("{} [{}] {} | {}", self.level, self.module, self.message, fields)
        }
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

const SECRET_KEYS: &[&str] = &[
    "private_key",
    "privatekey",
    "secret",
    "signing_key",
    "recovery_key",
    "sender_key",
    "key_hex",
];

const ADDRESS_KEYS: &[&str] = &[
    "address",
    "owner",
    "wallet",
    "signer",
    "sender",
    "recipient",
    "master",
    "factory",
    "handler",
    "to",
];

const HASH_KEYS: &[&str] = &["digest", "hash", "signature", "tx_id", "txid", "salt"];

fn mask_by_key(key: &str, value: &str) -> String {
    let key = key.to_lowercase();

    if SECRET_KEYS.iter().any(|k| key.contains(k)) {
        return mask_fully(value);
    }
    // hash keys first so "signer_signature" is treated as a signature
    if HASH_KEYS.iter().any(|k| key.contains(k)) {
        return mask_hash(value);
    }
    if ADDRESS_KEYS.iter().any(|k| key.contains(k)) {
        return mask_address(value);
    }

    value.to_string()
}

fn mask_fully(value: &str) -> String {
    if value.is_empty() {
        "[EMPTY]".to_string()
    } else if value.len() <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", value.len())
    }
}

/// Keep `0x` plus 6 digits and the last 4
fn mask_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let head = if trimmed.starts_with("0x") { 8 } else { 6 };
    let tail = 4;
    if trimmed.len() <= head + tail + 3 {
        return mask_fully(trimmed);
    }

    format!("{}...{}", &trimmed[..head], &trimmed[trimmed.len() - tail..])
}

/// Keep `0x` plus 10 digits and the last 6; short values pass through
fn mask_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    if trimmed.len() <= 20 {
        return trimmed.to_string();
    }

    let head = if trimmed.starts_with("0x") { 12 } else { 10 };
    let tail = 6;
    format!("{}...{}", &trimmed[..head], &trimmed[trimmed.len() - tail..])
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg,
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// `log_debug!("module", "message", key = value, ...)`
#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => { $crate::__log_at!(Debug, $($args)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => { $crate::__log_at!(Info, $($args)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => { $crate::__log_at!(Warn, $($args)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($args:tt)*) => { $crate::__log_at!(Error, $($args)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    const DIGEST: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

    #[test]
    fn test_mask_fully() {
        assert_eq!(mask_fully(""), "[EMPTY]");
        assert_eq!(mask_fully("abc"), "[REDACTED]");
        assert_eq!(mask_fully("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_mask_address() {
        let masked = mask_address(WALLET);
        assert_eq!(masked, "0xd8dA6B...6045");
    }

    #[test]
    fn test_mask_hash() {
        let masked = mask_hash(DIGEST);
        assert_eq!(masked, "0x1234567890...abcdef");
        assert_eq!(mask_hash("0x01"), "0x01");
    }

    #[test]
    fn test_mask_by_key() {
        assert!(mask_by_key("recovery_key", "0xabcdef0123").contains("REDACTED"));
        assert_eq!(mask_by_key("wallet", WALLET), "0xd8dA6B...6045");
        assert_eq!(mask_by_key("owner_signature", DIGEST), "0x1234567890...abcdef");
        assert_eq!(mask_by_key("threshold", "2"), "2");
    }

    #[test]
    fn test_render_never_contains_secret() {
        let key = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let entry = LogEntry::new(LogLevel::Info, "assembler", "signing")
            .field("signing_key", key)
            .field("digest", DIGEST)
            .address_field("safe", WALLET);

        let line = entry.render();
        assert!(!line.contains(key));
        assert!(line.contains("safe=0xd8dA6B...6045"));
        assert!(line.starts_with("INFO [assembler] signing | "));
    }

    #[test]
    fn test_secret_field_always_masked() {
        let entry = LogEntry::new(LogLevel::Debug, "cli", "loaded").secret_field("value", "plain");
        assert_eq!(entry.fields[0].1, "[REDACTED:5chars]");
    }
}
