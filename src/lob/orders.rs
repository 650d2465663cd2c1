//! Order registry: order id → (side, price, remaining size).

use ahash::AHashMap;

use crate::types::Order;

/// Live orders keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct OrderRegistry {
    orders: AHashMap<u64, Order>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an order, returning the previous entry.
    #[inline]
    pub fn insert(&mut self, order_id: u64, order: Order) -> Option<Order> {
        self.orders.insert(order_id, order)
    }

    #[inline]
    pub fn get(&self, order_id: u64) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    #[inline]
    pub fn get_mut(&mut self, order_id: u64) -> Option<&mut Order> {
        self.orders.get_mut(&order_id)
    }

    #[inline]
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        self.orders.remove(&order_id)
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.orders.contains_key(&order_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterate over all live orders (order_id, order).
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Order)> {
        self.orders.iter().map(|(id, order)| (*id, order))
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Price, Side};

    fn order(size: u64) -> Order {
        Order {
            side: Side::Bid,
            price: Price::from_f64(10.0),
            size,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = OrderRegistry::new();
        assert!(registry.insert(1, order(5)).is_none());
        assert_eq!(registry.get(1).map(|o| o.size), Some(5));
        assert!(registry.contains(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_returns_previous() {
        let mut registry = OrderRegistry::new();
        registry.insert(1, order(5));
        let previous = registry.insert(1, order(7));
        assert_eq!(previous.map(|o| o.size), Some(5));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = OrderRegistry::new();
        registry.insert(1, order(5));
        registry.insert(2, order(6));
        assert_eq!(registry.remove(1).map(|o| o.size), Some(5));
        assert!(registry.remove(1).is_none());
        registry.clear();
        assert!(registry.is_empty());
    }
}
