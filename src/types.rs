//! Core data types for MBO events and MBP rows.
//!
//! These types are designed to be:
//! - Exact (prices are fixed-point integers, never compared with a tolerance)
//! - Small and `Copy` where they sit on the hot path
//! - Compatible with Databento's MBO/MBP-10 CSV vocabulary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MbpError, Result};

/// Fixed-point scale: one price unit is 1e-9.
pub const PRICE_SCALE: i64 = 1_000_000_000;

/// Maximum number of fractional digits representable in a [`Price`].
pub const PRICE_DECIMALS: usize = 9;

/// Default number of levels per side in an MBP snapshot.
pub const DEFAULT_LEVELS: usize = 10;

/// Databento record-type tag for MBP-10 rows.
pub const MBP10_RTYPE: u8 = 10;

// ============================================================================
// Price
// ============================================================================

/// Fixed-point price (divide by 1e9 for the decimal value).
///
/// Ordering and equality are plain integer comparisons, so the same basis is
/// used for level insertion, removal and depth lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero price (used by reset rows).
    pub const ZERO: Price = Price(0);

    /// Wrap a raw fixed-point value.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Price(raw)
    }

    /// Raw fixed-point value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert from a floating-point value, rounding to the nearest unit.
    ///
    /// Only meant for tests and synthetic data; feed prices go through
    /// [`FromStr`], which is exact.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Price((value * PRICE_SCALE as f64).round() as i64)
    }

    /// Get price as floating point.
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }
}

impl FromStr for Price {
    type Err = MbpError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MbpError::InvalidPrice(s.to_string());
        let text = s.trim();

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            Some(_) => (false, text),
            None => return Err(invalid()),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // Digits past the 9th decimal are only accepted when they are zeros.
        let (kept, dropped) = frac_part.split_at(frac_part.len().min(PRICE_DECIMALS));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }

        let mut units: i64 = 0;
        for b in int_part.bytes() {
            units = units
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
                .ok_or_else(invalid)?;
        }
        units = units.checked_mul(PRICE_SCALE).ok_or_else(invalid)?;

        let mut frac: i64 = 0;
        for b in kept.bytes() {
            frac = frac * 10 + i64::from(b - b'0');
        }
        for _ in kept.len()..PRICE_DECIMALS {
            frac *= 10;
        }

        let raw = units.checked_add(frac).ok_or_else(invalid)?;
        Ok(Price(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Price {
    /// Shortest exact decimal: `10`, `20.25`, `-0.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let scale = PRICE_SCALE as u64;
        let int = abs / scale;
        let frac = abs % scale;

        if self.0 < 0 {
            f.write_str("-")?;
        }
        if frac == 0 {
            return write!(f, "{int}");
        }

        let digits = format!("{frac:09}");
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

// ============================================================================
// Action / Side
// ============================================================================

/// MBO action type (what happened to the order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Book reset (clear all state)
    Reset = b'R',
    /// Add new order to book
    Add = b'A',
    /// Modify existing order (not book-affecting for MBP output)
    Modify = b'M',
    /// Cancel/reduce order
    Cancel = b'C',
    /// Trade execution report
    Trade = b'T',
    /// Fill report for the resting order
    Fill = b'F',
    /// No action (status/heartbeat rows)
    None = b'N',
}

impl Action {
    /// Parse action from a byte (Databento format).
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'R' => Some(Action::Reset),
            b'A' => Some(Action::Add),
            b'M' => Some(Action::Modify),
            b'C' => Some(Action::Cancel),
            b'T' => Some(Action::Trade),
            b'F' => Some(Action::Fill),
            b'N' => Some(Action::None),
            _ => None,
        }
    }

    /// Convert to byte representation.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Whether an event with this action must carry a price.
    pub fn requires_price(self) -> bool {
        matches!(self, Action::Add | Action::Cancel)
    }
}

impl FromStr for Action {
    type Err = MbpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().as_bytes() {
            [b] => Action::from_byte(*b).ok_or_else(|| MbpError::InvalidAction(s.to_string())),
            _ => Err(MbpError::InvalidAction(s.to_string())),
        }
    }
}

/// Order side (bid or ask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy order (bid)
    Bid = b'B',
    /// Sell order (ask)
    Ask = b'A',
    /// Non-directional (used for some trade types and resets)
    None = b'N',
}

impl Side {
    /// Parse side from a byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'B' => Some(Side::Bid),
            b'A' => Some(Side::Ask),
            b'N' => Some(Side::None),
            _ => None,
        }
    }

    /// Convert to byte representation.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Single-character code as written to CSV.
    pub fn as_char(self) -> char {
        self.to_byte() as char
    }

    /// Check if this is a bid.
    #[inline(always)]
    pub fn is_bid(self) -> bool {
        matches!(self, Side::Bid)
    }

    /// Check if this is an ask.
    #[inline(always)]
    pub fn is_ask(self) -> bool {
        matches!(self, Side::Ask)
    }
}

impl FromStr for Side {
    type Err = MbpError;

    /// An empty field reads as [`Side::None`].
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().as_bytes() {
            [] => Ok(Side::None),
            [b] => Side::from_byte(*b).ok_or_else(|| MbpError::InvalidSide(s.to_string())),
            _ => Err(MbpError::InvalidSide(s.to_string())),
        }
    }
}

/// Which half of an execution report referenced an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionKind {
    Trade,
    Fill,
}

/// How a cancel is reported once pending execution markers are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelResolution {
    /// Both a trade and a fill were seen for the order: the removal is a fill
    Execution,
    /// Ordinary cancellation
    PlainCancel,
}

impl CancelResolution {
    /// The row action this resolution is written as.
    pub fn row_action(self) -> RowAction {
        match self {
            CancelResolution::Execution => RowAction::Trade,
            CancelResolution::PlainCancel => RowAction::Cancel,
        }
    }
}

/// Action code of an emitted MBP row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RowAction {
    Reset = b'R',
    Add = b'A',
    Cancel = b'C',
    Trade = b'T',
}

impl RowAction {
    /// Single-character code as written to CSV.
    pub fn as_char(self) -> char {
        self as u8 as char
    }
}

// ============================================================================
// Events
// ============================================================================

/// Fields copied verbatim from the input row to the output row.
///
/// The book never interprets these; they are kept as the original text so the
/// output echoes the input exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passthrough {
    pub ts_recv: String,
    pub ts_event: String,
    pub publisher_id: String,
    pub instrument_id: String,
    pub flags: String,
    pub ts_in_delta: String,
    pub sequence: String,
    pub symbol: String,
}

/// Market By Order (MBO) event.
///
/// For cancels, `size` is the order's remaining size after the cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MboEvent {
    /// Unique order identifier
    pub order_id: u64,

    /// Order action
    pub action: Action,

    /// Order side
    pub side: Side,

    /// Limit price ([`Price::ZERO`] when the row carries none)
    pub price: Price,

    /// Order size (remaining size for cancels)
    pub size: u64,

    /// Opaque fields echoed into the output row
    pub passthrough: Passthrough,
}

impl MboEvent {
    /// Create a new MBO event with empty passthrough fields.
    pub fn new(order_id: u64, action: Action, side: Side, price: Price, size: u64) -> Self {
        Self {
            order_id,
            action,
            side,
            price,
            size,
            passthrough: Passthrough::default(),
        }
    }

    /// A reset event.
    pub fn reset() -> Self {
        Self::new(0, Action::Reset, Side::None, Price::ZERO, 0)
    }

    /// Attach passthrough fields.
    pub fn with_passthrough(mut self, passthrough: Passthrough) -> Self {
        self.passthrough = passthrough;
        self
    }
}

/// Order information stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub side: Side,
    pub price: Price,
    /// Remaining size
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Price tests
    // =========================================================================

    #[test]
    fn test_price_parse_exact() {
        assert_eq!("10".parse::<Price>().unwrap().raw(), 10_000_000_000);
        assert_eq!("10.0".parse::<Price>().unwrap().raw(), 10_000_000_000);
        assert_eq!("20.25".parse::<Price>().unwrap().raw(), 20_250_000_000);
        assert_eq!("0.000000001".parse::<Price>().unwrap().raw(), 1);
        assert_eq!(".5".parse::<Price>().unwrap().raw(), 500_000_000);
        assert_eq!("-1.5".parse::<Price>().unwrap().raw(), -1_500_000_000);
        assert_eq!(" 3.1 ".parse::<Price>().unwrap().raw(), 3_100_000_000);
    }

    #[test]
    fn test_price_parse_trailing_zero_digits() {
        assert_eq!(
            "1.2500000000000".parse::<Price>().unwrap(),
            "1.25".parse::<Price>().unwrap()
        );
        assert!("1.0000000001".parse::<Price>().is_err());
    }

    #[test]
    fn test_price_parse_rejects_garbage() {
        for bad in ["", "-", ".", "abc", "1.2.3", "1e5", "12a", "99999999999"] {
            assert!(bad.parse::<Price>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_price_no_float_drift() {
        // 0.1 + 0.2 style drift must not exist in the fixed-point domain.
        let a: Price = "0.3".parse().unwrap();
        let b = Price::from_raw("0.1".parse::<Price>().unwrap().raw() + "0.2".parse::<Price>().unwrap().raw());
        assert_eq!(a, b);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_raw(10_000_000_000).to_string(), "10");
        assert_eq!(Price::from_raw(20_250_000_000).to_string(), "20.25");
        assert_eq!(Price::from_raw(1).to_string(), "0.000000001");
        assert_eq!(Price::from_raw(-500_000_000).to_string(), "-0.5");
        assert_eq!(Price::ZERO.to_string(), "0");
    }

    #[test]
    fn test_price_from_f64() {
        assert_eq!(Price::from_f64(100.01).raw(), 100_010_000_000);
        assert!((Price::from_raw(100_010_000_000).as_f64() - 100.01).abs() < 1e-9);
    }

    // =========================================================================
    // Action and Side tests
    // =========================================================================

    #[test]
    fn test_action_from_byte() {
        assert_eq!(Action::from_byte(b'R'), Some(Action::Reset));
        assert_eq!(Action::from_byte(b'A'), Some(Action::Add));
        assert_eq!(Action::from_byte(b'M'), Some(Action::Modify));
        assert_eq!(Action::from_byte(b'C'), Some(Action::Cancel));
        assert_eq!(Action::from_byte(b'T'), Some(Action::Trade));
        assert_eq!(Action::from_byte(b'F'), Some(Action::Fill));
        assert_eq!(Action::from_byte(b'N'), Some(Action::None));
        assert_eq!(Action::from_byte(b'X'), None);
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("A".parse::<Action>().unwrap(), Action::Add);
        assert_eq!(" C ".parse::<Action>().unwrap(), Action::Cancel);
        assert!("".parse::<Action>().is_err());
        assert!("AC".parse::<Action>().is_err());
        assert!("X".parse::<Action>().is_err());
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("B".parse::<Side>().unwrap(), Side::Bid);
        assert_eq!("A".parse::<Side>().unwrap(), Side::Ask);
        assert_eq!("N".parse::<Side>().unwrap(), Side::None);
        assert_eq!("".parse::<Side>().unwrap(), Side::None);
        assert!("S".parse::<Side>().is_err());
    }

    #[test]
    fn test_side_checks() {
        assert!(Side::Bid.is_bid());
        assert!(!Side::Ask.is_bid());
        assert!(Side::Ask.is_ask());
        assert!(!Side::None.is_bid());
        assert!(!Side::None.is_ask());
        assert_eq!(Side::Bid.as_char(), 'B');
    }

    #[test]
    fn test_cancel_resolution_row_action() {
        assert_eq!(CancelResolution::Execution.row_action(), RowAction::Trade);
        assert_eq!(CancelResolution::PlainCancel.row_action(), RowAction::Cancel);
        assert_eq!(RowAction::Trade.as_char(), 'T');
    }

    #[test]
    fn test_requires_price() {
        assert!(Action::Add.requires_price());
        assert!(Action::Cancel.requires_price());
        assert!(!Action::Reset.requires_price());
        assert!(!Action::Trade.requires_price());
    }
}
