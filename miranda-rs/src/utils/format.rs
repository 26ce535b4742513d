//! Formatting utilities

use chrono::{DateTime, Local, Utc};
use humansize::{DECIMAL, format_size};
use miranda_db::SettingValue;

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a timestamp in local time
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    if timestamp.timestamp() == 0 {
        "N/A".to_string()
    } else {
        timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// Format an offset as hex
pub fn format_offset(offset: u32) -> String {
    format!("{offset:#010x}")
}

/// Format an optional setting for a table cell
pub fn format_setting(value: Option<&SettingValue>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}

/// Format a signature, escaping non-printable bytes
pub fn format_signature(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|&b| std::ascii::escape_default(b))
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
    }

    #[test]
    fn test_format_timestamp_epoch() {
        assert_eq!(format_timestamp(DateTime::<Utc>::UNIX_EPOCH), "N/A");
    }

    #[test]
    fn test_format_setting() {
        assert_eq!(format_setting(None), "-");
        assert_eq!(format_setting(Some(&SettingValue::Dword(42))), "42");
    }

    #[test]
    fn test_format_offset_and_signature() {
        assert_eq!(format_offset(0x2c), "0x0000002c");
        assert_eq!(format_signature(b"Miranda\0\x1a"), "Miranda\\x00\\x1a");
    }
}
