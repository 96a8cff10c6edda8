//! The authoritative inventory.
//!
//! `InventoryStore` owns every item record together with the three views over
//! them: the id map, the market-price index and the recency queue. Every
//! public mutation updates all of them before returning and then writes a
//! snapshot to the attached storage, if any.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::heap::ProfitHeap;
use crate::model::{CategoryTotals, InventoryStats, Item, ItemEdit, ItemRecord, NewItem};
use crate::price_index::PriceIndex;
use crate::recent::{RecentQueue, DEFAULT_RECENT_CAPACITY};
use crate::snapshot::{self, Snapshot};
use crate::stats;
use crate::storage::KeyValueStore;

const FIRST_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing stored under the key; the store is empty.
    Missing,
    Restored { items: usize, skipped: usize },
    /// The payload was unreadable. The store was reset and the payload deleted.
    Corrupt,
}

struct Persistence {
    storage: Rc<dyn KeyValueStore>,
    key: String,
}

pub struct InventoryStore {
    items: HashMap<u64, Item>,
    recent: RecentQueue<Item>,
    by_market: PriceIndex,
    next_id: u64,
    persistence: Option<Persistence>,
}

impl InventoryStore {
    /// A store that lives only in memory.
    pub fn new(recent_capacity: usize) -> Self {
        InventoryStore {
            items: HashMap::new(),
            recent: RecentQueue::new(recent_capacity),
            by_market: PriceIndex::new(),
            next_id: FIRST_ID,
            persistence: None,
        }
    }

    /// A store that writes a snapshot under `key` after every mutation.
    /// Nothing is read until [`InventoryStore::load`] is called.
    pub fn with_storage(storage: Rc<dyn KeyValueStore>, key: impl Into<String>, recent_capacity: usize) -> Self {
        let mut store = Self::new(recent_capacity);
        store.persistence = Some(Persistence {
            storage,
            key: key.into(),
        });
        store
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn price_index(&self) -> &PriceIndex {
        &self.by_market
    }

    pub fn recent_queue(&self) -> &RecentQueue<Item> {
        &self.recent
    }

    pub fn add_item(&mut self, draft: NewItem) -> Item {
        let id = self.next_id;
        self.next_id += 1;

        let item = Item::new(id, draft, now_millis());
        debug!(id, name = %item.name, profit = item.profit, "added item");

        self.items.insert(id, item.clone());
        self.recent.enqueue(item.clone());
        self.by_market.insert(item.clone());
        self.persist();
        item
    }

    /// Returns the removed item, or `None` (and changes nothing) when `id` is
    /// not in the store.
    pub fn remove_item(&mut self, id: u64) -> Option<Item> {
        let item = self.items.remove(&id)?;
        self.by_market.remove(id);
        self.recent.retain(|i| i.id != id);
        debug!(id, "removed item");
        self.persist();
        Some(item)
    }

    pub fn clear_all(&mut self) {
        self.reset();
        info!("cleared inventory");
        self.persist();
    }

    /// Apply `edit` to an existing item. The item's old position in the price
    /// index is dropped before the updated record is inserted, so an id never
    /// appears in the index twice.
    pub fn edit_item(&mut self, id: u64, edit: ItemEdit) -> Option<Item> {
        let item = self.items.get_mut(&id)?;
        item.apply(edit);
        let updated = item.clone();

        self.by_market.replace(updated.clone());
        self.recent.replace_where(|i| i.id == id, &updated);
        debug!(id, market = updated.market_price, "edited item");
        self.persist();
        Some(updated)
    }

    /// Most recently created first; equal timestamps put the higher id first.
    pub fn all_items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }

    /// Up to `k` items ranked by profit percent, then absolute profit.
    /// Builds a fresh heap every call.
    pub fn top_items(&self, k: usize) -> Vec<Item> {
        let heap: ProfitHeap = self.all_items().into_iter().collect();
        heap.take_top(k)
    }

    pub fn best_item(&self) -> Option<Item> {
        self.top_items(1).into_iter().next()
    }

    pub fn filter_by_market_range(&self, min: f64, max: f64) -> Vec<Item> {
        if self.by_market.is_empty() {
            return Vec::new();
        }
        self.by_market.range(min, max).to_vec()
    }

    pub fn recent_items(&self) -> Vec<Item> {
        self.recent.newest_first()
    }

    pub fn stats(&self) -> InventoryStats {
        stats::build_stats(self.items.values())
    }

    pub fn category_breakdown(&self) -> HashMap<String, CategoryTotals> {
        stats::category_breakdown(self.items.values())
    }

    pub fn ranked_categories(&self) -> Vec<(String, CategoryTotals)> {
        stats::rank_categories(self.category_breakdown())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            next_id: self.next_id,
            items: self.all_items(),
            recent: self.recent.oldest_first(),
        }
    }

    pub fn serialize_snapshot(&self) -> Result<String> {
        self.snapshot().to_json()
    }

    /// Read this store's snapshot from storage.
    pub fn load(&mut self) -> RestoreOutcome {
        let Some((storage, key)) = self.persistence.as_ref().map(|p| (p.storage.clone(), p.key.clone())) else {
            return RestoreOutcome::Missing;
        };
        match storage.read(&key) {
            Ok(Some(text)) => self.restore_snapshot(&text),
            Ok(None) => {
                self.reset();
                RestoreOutcome::Missing
            }
            Err(e) => {
                warn!(key = %key, error = %e, "could not read inventory snapshot");
                self.reset();
                RestoreOutcome::Missing
            }
        }
    }

    /// Replace the contents of the store with a serialized snapshot.
    ///
    /// Records without a positive id, a name or numeric prices are skipped.
    /// Derived fields are always recomputed from the stored prices.
    pub fn restore_snapshot(&mut self, text: &str) -> RestoreOutcome {
        let raw = match snapshot::decode(text) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "discarding unreadable inventory snapshot");
                self.reset();
                if let Some(p) = &self.persistence {
                    if let Err(e) = p.storage.remove(&p.key) {
                        warn!(key = %p.key, error = %e, "could not delete stale snapshot");
                    }
                }
                return RestoreOutcome::Corrupt;
            }
        };

        self.reset();
        let mut skipped = raw.skipped;
        let now = now_millis();

        // Items are stored newest first. Indexing them oldest first puts
        // equal prices back in their original first-in-first-out order.
        for record in raw.items.into_iter().rev() {
            let Some(id) = record.id else {
                skipped += 1;
                continue;
            };
            if self.items.contains_key(&id) {
                skipped += 1;
                continue;
            }
            let item = item_from_record(id, record, now);
            self.by_market.insert(item.clone());
            self.items.insert(id, item);
        }

        let max_id = self.items.keys().copied().max().unwrap_or(0);
        self.next_id = raw.next_id.unwrap_or(FIRST_ID).max(max_id + 1);

        let recent: Vec<Item> = raw
            .recent
            .iter()
            .filter_map(|r| r.id)
            .filter_map(|id| self.items.get(&id).cloned())
            .collect();
        self.recent.replace_all(recent);

        info!(items = self.items.len(), skipped, next_id = self.next_id, "restored inventory");
        RestoreOutcome::Restored {
            items: self.items.len(),
            skipped,
        }
    }

    /// Replace the contents with a plain list of records, oldest first by
    /// `created_at`. Records keep their id when they carry one; the rest get
    /// fresh ids. Returns the number of items imported.
    pub fn import_items(&mut self, records: Vec<ItemRecord>) -> usize {
        self.reset();
        let now = now_millis();

        let mut records = records;
        records.sort_by_key(|r| r.created_at.unwrap_or(0));

        let mut seen = HashSet::new();
        for record in records {
            if record.name.trim().is_empty() || !record.buying_price.is_finite() || !record.market_price.is_finite() {
                continue;
            }
            let id = match record.id {
                Some(id) if snapshot::valid_id(id) => id,
                Some(id) => {
                    debug!(id, "skipping out-of-range id on import");
                    continue;
                }
                None => self.next_id,
            };
            if !seen.insert(id) {
                debug!(id, "skipping duplicate id on import");
                continue;
            }
            let item = item_from_record(id, record, now);
            self.by_market.insert(item.clone());
            self.recent.enqueue(item.clone());
            self.items.insert(id, item);
            self.next_id = self.next_id.max(id + 1);
        }

        info!(items = self.items.len(), next_id = self.next_id, "imported items");
        self.persist();
        self.items.len()
    }

    pub fn export_items(&self) -> Vec<ItemRecord> {
        self.all_items().iter().map(Item::to_record).collect()
    }

    fn reset(&mut self) {
        self.items.clear();
        self.by_market.clear();
        self.recent.clear();
        self.next_id = FIRST_ID;
    }

    fn persist(&self) {
        let Some(p) = &self.persistence else {
            return;
        };
        let written = self
            .serialize_snapshot()
            .and_then(|payload| p.storage.write(&p.key, &payload));
        if let Err(e) = written {
            warn!(key = %p.key, error = %e, "failed to persist inventory");
        }
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

fn item_from_record(id: u64, record: ItemRecord, now: i64) -> Item {
    let created_at = record.created_at.unwrap_or(now);
    let draft = NewItem::new(record.name, record.category, record.buying_price, record.market_price)
        .with_image(record.image_url)
        .created_at(created_at);
    Item::new(id, draft, now)
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn ids(items: &[Item]) -> Vec<u64> {
        items.iter().map(|i| i.id).collect()
    }

    fn sorted_ids<'a>(items: impl Iterator<Item = &'a Item>) -> Vec<u64> {
        let mut ids: Vec<u64> = items.map(|i| i.id).collect();
        ids.sort_unstable();
        ids
    }

    fn index_ids(index: &PriceIndex) -> Vec<u64> {
        index.iter().map(|i| i.id).collect()
    }

    fn abc_store() -> InventoryStore {
        let mut store = InventoryStore::default();
        store.add_item(NewItem::new("A", "Electronics", 100.0, 150.0).created_at(1_000));
        store.add_item(NewItem::new("B", "Electronics", 200.0, 180.0).created_at(2_000));
        store.add_item(NewItem::new("C", "Books", 50.0, 50.0).created_at(3_000));
        store
    }

    #[test]
    fn test_profit_scenario() {
        let store = abc_store();

        let a = store.get(1).unwrap();
        assert_eq!(a.profit, 50.0);
        assert_eq!(a.profit_percent, 50.0);
        let b = store.get(2).unwrap();
        assert_eq!(b.profit, -20.0);
        assert_eq!(b.profit_percent, -10.0);
        let c = store.get(3).unwrap();
        assert_eq!(c.profit, 0.0);
        assert_eq!(c.profit_percent, 0.0);

        assert_eq!(store.best_item().map(|i| i.name), Some("A".to_string()));

        let stats = store.stats();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.total_profit, 30.0);
        assert_eq!(stats.profitable_items, 1);
        assert_eq!(stats.loss_items, 1);
    }

    #[test]
    fn test_empty_store() {
        let store = InventoryStore::default();
        assert!(store.best_item().is_none());
        assert_eq!(store.stats().avg_profit_percent, 0.0);
        assert!(store.filter_by_market_range(0.0, 100.0).is_empty());
        assert!(store.top_items(5).is_empty());
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut store = abc_store();
        assert!(store.remove_item(42).is_none());
        assert_eq!(store.len(), 3);
        assert_eq!(store.price_index().len(), 3);
        assert_eq!(store.recent_queue().len(), 3);
    }

    #[test]
    fn test_remove_updates_all_views() {
        let mut store = abc_store();
        let removed = store.remove_item(2).unwrap();
        assert_eq!(removed.name, "B");
        assert!(store.get(2).is_none());
        assert_eq!(store.price_index().count_of(2), 0);
        assert!(store.recent_items().iter().all(|i| i.id != 2));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut store = abc_store();
        store.remove_item(3);
        let d = store.add_item(NewItem::new("D", "Other", 1.0, 2.0));
        assert_eq!(d.id, 4);
    }

    #[test]
    fn test_clear_all_resets_ids() {
        let mut store = abc_store();
        store.clear_all();
        assert!(store.is_empty());
        assert!(store.price_index().is_empty());
        assert!(store.recent_queue().is_empty());
        assert_eq!(store.add_item(NewItem::new("X", "Other", 1.0, 1.0)).id, 1);
    }

    #[test]
    fn test_all_items_most_recent_first() {
        let mut store = abc_store();
        store.add_item(NewItem::new("D", "Other", 1.0, 2.0).created_at(3_000));
        assert_eq!(ids(&store.all_items()), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_repeated_edits_keep_one_index_entry() {
        let mut store = abc_store();
        for market in [10.0, 500.0, 120.0] {
            let updated = store.edit_item(1, ItemEdit::prices(100.0, market)).unwrap();
            assert_eq!(updated.market_price, market);
        }
        assert_eq!(store.price_index().count_of(1), 1);
        assert_eq!(store.price_index().len(), store.len());

        let item = store.get(1).unwrap();
        assert_eq!(item.profit, 20.0);
        assert_eq!(item.profit_percent, 20.0);

        let prices: Vec<f64> = store.price_index().iter().map(|i| i.market_price).collect();
        assert_eq!(prices, vec![50.0, 120.0, 180.0]);

        let queued = store.recent_items().into_iter().find(|i| i.id == 1).unwrap();
        assert_eq!(queued.market_price, 120.0);
    }

    #[test]
    fn test_edit_missing_id() {
        let mut store = abc_store();
        assert!(store.edit_item(99, ItemEdit::prices(1.0, 2.0)).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_filter_by_market_range() {
        let store = abc_store();
        assert_eq!(ids(&store.filter_by_market_range(50.0, 150.0)), vec![3, 1]);
        assert_eq!(ids(&store.filter_by_market_range(151.0, 179.0)), Vec::<u64>::new());
    }

    #[test]
    fn test_recent_keeps_last_five() {
        let mut store = InventoryStore::default();
        for i in 1..=7 {
            store.add_item(NewItem::new(format!("item {i}"), "Other", 1.0, 1.0));
        }
        assert_eq!(ids(&store.recent_queue().oldest_first()), vec![3, 4, 5, 6, 7]);
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut store = InventoryStore::with_storage(storage.clone(), "inventory:test", 5);
        for i in 1..=7u32 {
            store.add_item(
                NewItem::new(format!("item {i}"), "Fashion", 10.0 * i as f64, 15.0 * (i % 3) as f64)
                    .created_at(i as i64 * 10),
            );
        }
        store.remove_item(4);
        store.edit_item(2, ItemEdit::prices(5.0, 45.0));

        let mut restored = InventoryStore::with_storage(storage, "inventory:test", 5);
        assert_eq!(restored.load(), RestoreOutcome::Restored { items: 6, skipped: 0 });
        assert_eq!(restored.all_items(), store.all_items());
        assert_eq!(restored.next_id(), store.next_id());
        assert_eq!(restored.recent_queue().oldest_first(), store.recent_queue().oldest_first());
        assert_eq!(index_ids(restored.price_index()), index_ids(store.price_index()));
    }

    #[test]
    fn test_load_missing_key() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut store = InventoryStore::with_storage(storage, "inventory:nobody", 5);
        assert_eq!(store.load(), RestoreOutcome::Missing);
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_resets_and_discards() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut store = InventoryStore::with_storage(storage.clone(), "inventory:x", 5);
        store.add_item(NewItem::new("stale", "Other", 1.0, 2.0));
        storage.write("inventory:x", "{{{ definitely not json").unwrap();

        assert_eq!(store.load(), RestoreOutcome::Corrupt);
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);
        assert_eq!(storage.read("inventory:x").unwrap(), None);
    }

    #[test]
    fn test_partially_malformed_snapshot() {
        let mut store = InventoryStore::default();
        let outcome = store.restore_snapshot(
            r#"{
                "nextId": 2,
                "items": [
                    {"id": 7, "name": "Good", "category": "Books", "buyingPrice": 10, "marketPrice": 30, "createdAt": 5},
                    {"id": "x", "name": "Bad id", "buyingPrice": 10, "marketPrice": 30},
                    {"name": "No id", "buyingPrice": 10, "marketPrice": 30},
                    {"id": 8, "name": "Bad price", "buyingPrice": "ten", "marketPrice": 30}
                ],
                "recent": [{"id": 7, "name": "Good", "buyingPrice": 10, "marketPrice": 30}]
            }"#,
        );
        assert_eq!(outcome, RestoreOutcome::Restored { items: 1, skipped: 3 });

        let item = store.get(7).unwrap();
        assert_eq!(item.profit, 20.0);
        assert_eq!(item.profit_percent, 200.0);
        // next id moves past the imported id even though the payload said 2
        assert_eq!(store.next_id(), 8);
        assert_eq!(ids(&store.recent_items()), vec![7]);
    }

    #[test]
    fn test_out_of_range_ids_are_skipped() {
        let mut store = InventoryStore::default();
        let outcome = store.restore_snapshot(
            r#"{
                "nextId": 18446744073709551615,
                "items": [
                    {"id": 18446744073709551615, "name": "huge", "buyingPrice": 1, "marketPrice": 2},
                    {"id": 9007199254740992, "name": "past exact", "buyingPrice": 1, "marketPrice": 2},
                    {"id": 4, "name": "fine", "buyingPrice": 1, "marketPrice": 2}
                ],
                "recent": []
            }"#,
        );
        assert_eq!(outcome, RestoreOutcome::Restored { items: 1, skipped: 2 });
        assert_eq!(store.next_id(), 5);
        assert_eq!(store.add_item(NewItem::new("next", "Other", 1.0, 1.0)).id, 5);

        let record = |id: u64| ItemRecord {
            id: Some(id),
            name: format!("item {id}"),
            category: String::new(),
            buying_price: 1.0,
            market_price: 2.0,
            image_url: String::new(),
            created_at: None,
        };
        assert_eq!(store.import_items(vec![record(u64::MAX), record(2)]), 1);
        assert_eq!(store.next_id(), 3);
    }

    #[test]
    fn test_import_items_keeps_and_assigns_ids() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut store = InventoryStore::with_storage(storage.clone(), "inventory:import", 5);
        let record = |id: Option<u64>, name: &str, created_at: i64| ItemRecord {
            id,
            name: name.to_string(),
            category: String::new(),
            buying_price: 10.0,
            market_price: 12.0,
            image_url: String::new(),
            created_at: Some(created_at),
        };

        let count = store.import_items(vec![
            record(Some(10), "ten", 200),
            record(None, "fresh", 300),
            record(Some(3), "three", 100),
            record(Some(3), "dup", 400),
            record(None, "   ", 500),
        ]);

        assert_eq!(count, 3);
        // "three" first (id 3), then "ten" (id 10), then the new one gets 11
        assert_eq!(ids(&store.all_items()), vec![11, 10, 3]);
        assert_eq!(store.next_id(), 12);
        assert_eq!(store.get(3).unwrap().category, "Other");
        assert_eq!(ids(&store.recent_queue().oldest_first()), vec![3, 10, 11]);
        assert!(storage.read("inventory:import").unwrap().is_some());

        let exported = store.export_items();
        assert_eq!(exported.len(), 3);
        assert_eq!(exported[0].id, Some(11));
    }

    #[test]
    fn test_ranked_categories() {
        let store = abc_store();
        let ranked = store.ranked_categories();
        assert_eq!(ranked[0].0, "Electronics");
        assert_eq!(ranked[0].1.count, 2);
        assert_eq!(ranked[0].1.total_profit, 30.0);
        assert_eq!(store.category_breakdown().len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u32, u32),
        Remove(u64),
        Edit(u64, u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..300, 0u32..300).prop_map(|(b, m)| Op::Add(b, m)),
            (1u64..20).prop_map(Op::Remove),
            (1u64..20, 0u32..300).prop_map(|(id, m)| Op::Edit(id, m)),
        ]
    }

    proptest! {
        #[test]
        fn prop_views_stay_consistent(ops in prop::collection::vec(op(), 0..60)) {
            let mut store = InventoryStore::default();
            for op in ops {
                match op {
                    Op::Add(b, m) => { store.add_item(NewItem::new("x", "Other", b as f64, m as f64)); }
                    Op::Remove(id) => { store.remove_item(id); }
                    Op::Edit(id, m) => { store.edit_item(id, ItemEdit { market_price: Some(m as f64), ..Default::default() }); }
                }

                prop_assert_eq!(sorted_ids(store.items.values()), sorted_ids(store.price_index().iter()));
                let prices: Vec<f64> = store.price_index().iter().map(|i| i.market_price).collect();
                for pair in prices.windows(2) {
                    prop_assert!(pair[0] <= pair[1]);
                }
                prop_assert!(store.recent_queue().len() <= 5);
                for queued in store.recent_queue().iter() {
                    prop_assert_eq!(Some(queued), store.get(queued.id));
                }
            }
        }
    }
}
