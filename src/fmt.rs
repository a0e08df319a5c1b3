//! Human-readable rendering of decoded fields, used by the text output.

use crate::time::ticks_to_secs;

/// Renders a 32-bit identifier as four ASCII characters when they are all
/// alphanumeric (`CUEI`), and as `0x`-prefixed hex otherwise.
///
/// ```rust
/// use scte35_decoder::fmt::format_identifier;
///
/// assert_eq!(format_identifier(0x43554549), "CUEI");
/// assert_eq!(format_identifier(0x12345678), "0x12345678");
/// ```
pub fn format_identifier(identifier: u32) -> String {
    let bytes = identifier.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        format!("0x{identifier:08X}")
    }
}

/// Renders bytes as `0x`-prefixed lowercase hex; empty input renders as nothing.
pub fn format_as_hex(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }
    let digits: String = data.iter().map(|b| format!("{b:02x}")).collect();
    format!("0x{digits}")
}

/// Renders 90 kHz ticks together with their value in seconds.
pub fn format_ticks(ticks: u64) -> String {
    format!("{ticks} ({:.6}s)", ticks_to_secs(ticks))
}
