//! # ESC/POS Control Commands
//!
//! Paper feed and cutter commands shared by every print job.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics and cutter commands.
pub const GS: u8 = 0x1D;

/// Lines fed after every job so the last row clears the tear bar
pub const DEFAULT_FEED_LINES: u8 = 3;

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the buffer and advances the paper by `n` character lines.
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | ESC d n   |
/// | Hex     | 1B 64 n   |
/// | Decimal | 27 100 n  |
///
/// ## Example
///
/// ```
/// use slipcast::protocol::commands;
///
/// assert_eq!(commands::feed_lines(3), vec![0x1B, 0x64, 3]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Feed and Full Cut (GS V 65 n)
///
/// Feeds the paper to the cutter position plus `n` vertical motion units,
/// then performs a full cut.
///
/// | Format  | Bytes       |
/// |---------|-------------|
/// | ASCII   | GS V A n    |
/// | Hex     | 1D 56 41 n  |
/// | Decimal | 29 86 65 n  |
///
/// ## Example
///
/// ```
/// use slipcast::protocol::commands;
///
/// assert_eq!(commands::cut_full_feed(0), vec![0x1D, 0x56, 0x41, 0x00]);
/// ```
#[inline]
pub fn cut_full_feed(n: u8) -> Vec<u8> {
    vec![GS, b'V', b'A', n]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use slipcast::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(576), [0x40, 0x02]); // 576 = 0x0240
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
