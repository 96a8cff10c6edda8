use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::model::Item;

/// Max-heap over items ranked by profit percent, then absolute profit.
/// Items with identical keys come out in the order they were pushed.
#[derive(Debug, Default)]
pub struct ProfitHeap {
    heap: BinaryHeap<Ranked>,
    pushed: u64,
}

#[derive(Debug)]
struct Ranked {
    seq: u64,
    item: Item,
}

impl Ranked {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.item
            .profit_percent
            .total_cmp(&other.item.profit_percent)
            .then_with(|| self.item.profit.total_cmp(&other.item.profit))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_cmp(other)
    }
}

impl ProfitHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, item: Item) {
        let seq = self.pushed;
        self.pushed += 1;
        self.heap.push(Ranked { seq, item });
    }

    pub fn pop(&mut self) -> Option<Item> {
        self.heap.pop().map(|r| r.item)
    }

    pub fn peek(&self) -> Option<&Item> {
        self.heap.peek().map(|r| &r.item)
    }

    /// Pop up to `k` items, best first.
    pub fn take_top(mut self, k: usize) -> Vec<Item> {
        let mut top = Vec::with_capacity(k.min(self.heap.len()));
        while top.len() < k {
            match self.pop() {
                Some(item) => top.push(item),
                None => break,
            }
        }
        top
    }
}

impl FromIterator<Item> for ProfitHeap {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut heap = ProfitHeap::new();
        for item in iter {
            heap.push(item);
        }
        heap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewItem;
    use proptest::prelude::*;

    fn item(id: u64, buy: f64, market: f64) -> Item {
        Item::new(id, NewItem::new(format!("item-{id}"), "Other", buy, market), 0)
    }

    #[test]
    fn test_pop_order() {
        let mut heap = ProfitHeap::new();
        heap.push(item(1, 100.0, 150.0));
        heap.push(item(2, 200.0, 180.0));
        heap.push(item(3, 50.0, 50.0));

        assert_eq!(heap.peek().map(|i| i.id), Some(1));
        let ids: Vec<u64> = std::iter::from_fn(|| heap.pop()).map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert!(heap.pop().is_none());
    }

    #[test]
    fn test_equal_percent_breaks_on_profit() {
        // Both 50%, the second one earns more in absolute terms.
        let heap: ProfitHeap = vec![item(1, 10.0, 15.0), item(2, 100.0, 150.0)].into_iter().collect();
        let top = heap.take_top(2);
        assert_eq!(top[0].id, 2);
        assert_eq!(top[1].id, 1);
    }

    #[test]
    fn test_full_ties_follow_push_order() {
        let heap: ProfitHeap = (1..=4).map(|id| item(id, 10.0, 20.0)).collect();
        let ids: Vec<u64> = heap.take_top(4).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_take_top_stops_when_exhausted() {
        let heap: ProfitHeap = vec![item(1, 1.0, 2.0)].into_iter().collect();
        assert_eq!(heap.take_top(5).len(), 1);
        assert!(ProfitHeap::new().take_top(3).is_empty());
    }

    proptest! {
        #[test]
        fn prop_take_top_is_sorted(prices in prop::collection::vec((0.0..1000.0f64, 0.0..1000.0f64), 0..40), k in 0usize..50) {
            let items: Vec<Item> = prices
                .iter()
                .enumerate()
                .map(|(i, (buy, market))| item(i as u64 + 1, *buy, *market))
                .collect();
            let top = items.iter().cloned().collect::<ProfitHeap>().take_top(k);
            prop_assert_eq!(top.len(), k.min(items.len()));
            for pair in top.windows(2) {
                let ord = pair[0]
                    .profit_percent
                    .total_cmp(&pair[1].profit_percent)
                    .then(pair[0].profit.total_cmp(&pair[1].profit));
                prop_assert!(ord != Ordering::Less);
            }
        }
    }
}
