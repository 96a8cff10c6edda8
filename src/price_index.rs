use crate::model::Item;

/// Items kept in ascending market-price order.
///
/// Inserts go after every item with the same price (the upper bound), so
/// equal prices stay in the order they were inserted.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    items: Vec<Item>,
}

impl PriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// First position whose price is not less than `price`.
    pub fn lower_bound(&self, price: f64) -> usize {
        self.items.partition_point(|i| i.market_price < price)
    }

    /// First position whose price is strictly greater than `price`.
    pub fn upper_bound(&self, price: f64) -> usize {
        self.items.partition_point(|i| i.market_price <= price)
    }

    pub fn insert(&mut self, item: Item) {
        let at = self.upper_bound(item.market_price);
        self.items.insert(at, item);
    }

    pub fn remove(&mut self, id: u64) -> Option<Item> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Drop any entry for `item.id` and insert the new version.
    pub fn replace(&mut self, item: Item) {
        self.remove(item.id);
        self.insert(item);
    }

    /// Items with `min <= market_price <= max`.
    pub fn range(&self, min: f64, max: f64) -> &[Item] {
        let left = self.lower_bound(min);
        let right = self.upper_bound(max);
        if left >= right {
            return &[];
        }
        &self.items[left..right]
    }

    pub fn count_of(&self, id: u64) -> usize {
        self.items.iter().filter(|i| i.id == id).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewItem;
    use proptest::prelude::*;

    fn item(id: u64, market: f64) -> Item {
        Item::new(id, NewItem::new(format!("item-{id}"), "Other", 0.0, market), 0)
    }

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    fn index_ids(index: &PriceIndex) -> Vec<u64> {
        index.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_insert_keeps_order_and_ties() {
        let mut index = PriceIndex::new();
        index.insert(item(1, 50.0));
        index.insert(item(2, 10.0));
        index.insert(item(3, 50.0));
        index.insert(item(4, 30.0));
        assert_eq!(index_ids(&index), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_equal_prices_are_first_in_first_out() {
        let mut index = PriceIndex::new();
        for id in 1..=3 {
            index.insert(item(id, 50.0));
        }
        assert_eq!(index_ids(&index), vec![1, 2, 3]);
        assert_eq!(ids(index.range(50.0, 50.0)), vec![1, 2, 3]);

        index.replace(item(1, 50.0));
        assert_eq!(index_ids(&index), vec![2, 3, 1]);
    }

    #[test]
    fn test_bounds() {
        let mut index = PriceIndex::new();
        for (id, price) in [(1, 10.0), (2, 20.0), (3, 20.0), (4, 30.0)] {
            index.insert(item(id, price));
        }
        assert_eq!(index.lower_bound(20.0), 1);
        assert_eq!(index.upper_bound(20.0), 3);
        assert_eq!(index.lower_bound(5.0), 0);
        assert_eq!(index.upper_bound(99.0), 4);
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut index = PriceIndex::new();
        for (id, price) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0)] {
            index.insert(item(id, price));
        }
        assert_eq!(ids(index.range(20.0, 30.0)), vec![2, 3]);
        assert_eq!(ids(index.range(0.0, 5.0)), Vec::<u64>::new());
        assert_eq!(ids(index.range(35.0, 25.0)), Vec::<u64>::new());
        assert!(PriceIndex::new().range(0.0, 100.0).is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let mut index = PriceIndex::new();
        index.insert(item(1, 10.0));
        index.insert(item(2, 10.0));
        assert_eq!(index.remove(1).map(|i| i.id), Some(1));
        assert!(index.remove(1).is_none());
        assert_eq!(index_ids(&index), vec![2]);
    }

    #[test]
    fn test_replace_leaves_single_entry() {
        let mut index = PriceIndex::new();
        index.insert(item(1, 10.0));
        index.insert(item(2, 20.0));
        index.replace(item(1, 25.0));
        assert_eq!(index.count_of(1), 1);
        assert_eq!(index_ids(&index), vec![2, 1]);
    }

    proptest! {
        #[test]
        fn prop_range_matches_filter(prices in prop::collection::vec(0u32..500, 0..60), a in 0u32..500, b in 0u32..500) {
            let (min, max) = (a.min(b) as f64, a.max(b) as f64);
            let mut index = PriceIndex::new();
            for (i, p) in prices.iter().enumerate() {
                index.insert(item(i as u64, *p as f64));
            }
            let prices: Vec<f64> = index.iter().map(|i| i.market_price).collect();
            for pair in prices.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }

            let mut got = ids(index.range(min, max));
            let mut want: Vec<u64> = prices
                .iter()
                .enumerate()
                .filter(|(_, p)| (**p as f64) >= min && (**p as f64) <= max)
                .map(|(i, _)| i as u64)
                .collect();
            got.sort_unstable();
            want.sort_unstable();
            prop_assert_eq!(got, want);
        }
    }
}
