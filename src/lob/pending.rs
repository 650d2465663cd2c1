//! Pending-execution tracking.
//!
//! A venue reports an execution against a resting order as a trade and a
//! fill, followed by a cancel that removes the executed size. The trade and
//! fill only leave a marker here; the next cancel for the same order id
//! consumes the marker and is reported as an execution when both halves were
//! seen. Markers that are never consumed are simply left behind.

use ahash::AHashMap;

use crate::types::{CancelResolution, ExecutionKind};

/// Flags recorded for one order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingMarker {
    pub trade_seen: bool,
    pub fill_seen: bool,
}

impl PendingMarker {
    /// Both halves of the execution report were seen.
    #[inline]
    pub fn is_execution(&self) -> bool {
        self.trade_seen && self.fill_seen
    }
}

/// Pending markers keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct PendingExecutions {
    markers: AHashMap<u64, PendingMarker>,
}

impl PendingExecutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag for `kind` on the marker for `order_id`, creating it if
    /// absent.
    #[inline]
    pub fn record(&mut self, order_id: u64, kind: ExecutionKind) {
        let marker = self.markers.entry(order_id).or_default();
        match kind {
            ExecutionKind::Trade => marker.trade_seen = true,
            ExecutionKind::Fill => marker.fill_seen = true,
        }
    }

    /// Consume the marker for `order_id`.
    ///
    /// Returns [`CancelResolution::Execution`] only when both flags were set;
    /// a missing marker resolves to a plain cancel.
    #[inline]
    pub fn resolve(&mut self, order_id: u64) -> CancelResolution {
        match self.markers.remove(&order_id) {
            Some(marker) if marker.is_execution() => CancelResolution::Execution,
            _ => CancelResolution::PlainCancel,
        }
    }

    /// Look at a marker without consuming it.
    #[inline]
    pub fn peek(&self, order_id: u64) -> Option<&PendingMarker> {
        self.markers.get(&order_id)
    }

    /// Number of outstanding markers.
    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_and_fill_resolve_to_execution() {
        let mut pending = PendingExecutions::new();
        pending.record(5, ExecutionKind::Trade);
        pending.record(5, ExecutionKind::Fill);
        assert_eq!(pending.resolve(5), CancelResolution::Execution);
    }

    #[test]
    fn test_order_of_flags_does_not_matter() {
        let mut pending = PendingExecutions::new();
        pending.record(5, ExecutionKind::Fill);
        pending.record(5, ExecutionKind::Trade);
        assert_eq!(pending.resolve(5), CancelResolution::Execution);
    }

    #[test]
    fn test_fill_only_is_plain_cancel() {
        let mut pending = PendingExecutions::new();
        pending.record(5, ExecutionKind::Fill);
        assert_eq!(pending.resolve(5), CancelResolution::PlainCancel);
    }

    #[test]
    fn test_trade_only_is_plain_cancel() {
        let mut pending = PendingExecutions::new();
        pending.record(5, ExecutionKind::Trade);
        assert_eq!(pending.resolve(5), CancelResolution::PlainCancel);
    }

    #[test]
    fn test_missing_marker_is_plain_cancel() {
        let mut pending = PendingExecutions::new();
        assert_eq!(pending.resolve(42), CancelResolution::PlainCancel);
    }

    #[test]
    fn test_resolve_consumes_marker() {
        let mut pending = PendingExecutions::new();
        pending.record(5, ExecutionKind::Trade);
        pending.record(5, ExecutionKind::Fill);
        assert_eq!(pending.len(), 1);
        pending.resolve(5);
        assert!(pending.is_empty());
        assert_eq!(pending.resolve(5), CancelResolution::PlainCancel);
    }

    #[test]
    fn test_markers_are_per_order() {
        let mut pending = PendingExecutions::new();
        pending.record(1, ExecutionKind::Trade);
        pending.record(2, ExecutionKind::Fill);
        assert_eq!(pending.resolve(1), CancelResolution::PlainCancel);
        assert_eq!(pending.peek(2).map(|m| m.fill_seen), Some(true));
        assert_eq!(pending.len(), 1);
    }
}
