use std::collections::HashSet;

use tracing::info;

use crate::model::{Item, ItemRecord, NewItem};
use crate::store::InventoryStore;

/// (name, category, buying price, market price)
pub static DEFAULT_PRODUCTS: [(&str, &str, f64, f64); 12] = [
    ("iPhone 12 (128GB)", "Electronics", 28500.0, 33500.0),
    ("Samsung 32-inch Monitor", "Electronics", 7200.0, 9100.0),
    ("Study Table (Wood)", "Furniture", 2600.0, 3400.0),
    ("Nike Running Shoes", "Fashion", 2200.0, 3100.0),
    ("Mountain Bicycle", "Sports", 6400.0, 7600.0),
    ("Engineering Book Set", "Books", 1800.0, 2400.0),
    ("Bluetooth Speaker", "Electronics", 1500.0, 2300.0),
    ("Office Chair", "Furniture", 2900.0, 3600.0),
    ("Cricket Kit", "Sports", 3100.0, 2950.0),
    ("Denim Jacket", "Fashion", 1100.0, 1700.0),
    ("PlayStation 4 Console", "Electronics", 14500.0, 18200.0),
    ("Kindle Paperwhite", "Electronics", 6200.0, 7800.0),
];

pub fn default_products() -> impl Iterator<Item = NewItem> {
    DEFAULT_PRODUCTS
        .iter()
        .map(|(name, category, buy, market)| NewItem::new(*name, *category, *buy, *market))
}

/// Identity used to tell whether a default product is already present.
pub fn signature(name: &str, category: &str, buying_price: f64, market_price: f64) -> String {
    format!(
        "{}::{}::{}::{}",
        name.trim().to_lowercase(),
        category.trim().to_lowercase(),
        buying_price,
        market_price
    )
}

fn item_signature(item: &Item) -> String {
    signature(&item.name, &item.category, item.buying_price, item.market_price)
}

/// Add the default products to an empty store. Returns how many were added.
pub fn seed_if_empty(store: &mut InventoryStore) -> usize {
    if !store.is_empty() {
        return 0;
    }
    let mut added = 0;
    for product in default_products() {
        store.add_item(product);
        added += 1;
    }
    info!(added, "seeded default products");
    added
}

/// Add every default product whose signature is not already in the store.
pub fn ensure_defaults(store: &mut InventoryStore) -> usize {
    if store.is_empty() {
        return seed_if_empty(store);
    }

    let mut existing: HashSet<String> = store.all_items().iter().map(item_signature).collect();
    let mut added = 0;
    for product in default_products() {
        let sig = signature(&product.name, &product.category, product.buying_price, product.market_price);
        if existing.insert(sig) {
            store.add_item(product);
            added += 1;
        }
    }
    if added > 0 {
        info!(added, "restored missing default products");
    }
    added
}

/// Starter records for a new demo account, newest first by one millisecond
/// steps from `base_time`.
pub fn starter_items(base_time: i64) -> Vec<ItemRecord> {
    default_products()
        .enumerate()
        .map(|(index, product)| ItemRecord {
            id: None,
            name: product.name,
            category: product.category,
            buying_price: product.buying_price,
            market_price: product.market_price,
            image_url: String::new(),
            created_at: Some(base_time - index as i64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_only_when_empty() {
        let mut store = InventoryStore::default();
        assert_eq!(seed_if_empty(&mut store), 12);
        assert_eq!(seed_if_empty(&mut store), 0);
        assert_eq!(store.len(), 12);
    }

    #[test]
    fn test_ensure_defaults_fills_gaps() {
        let mut store = InventoryStore::default();
        seed_if_empty(&mut store);
        let chair = store
            .all_items()
            .into_iter()
            .find(|i| i.name == "Office Chair")
            .unwrap();
        store.remove_item(chair.id);
        store.add_item(NewItem::new("My own thing", "Other", 1.0, 2.0));

        assert_eq!(ensure_defaults(&mut store), 1);
        assert_eq!(ensure_defaults(&mut store), 0);
        assert_eq!(store.len(), 13);
    }

    #[test]
    fn test_signature_is_case_insensitive() {
        assert_eq!(
            signature(" Office Chair ", "FURNITURE", 2900.0, 3600.0),
            signature("office chair", "Furniture", 2900.0, 3600.0)
        );
    }

    #[test]
    fn test_starter_items_import_in_listed_order() {
        let mut store = InventoryStore::default();
        store.import_items(starter_items(1_000_000));
        let all = store.all_items();
        assert_eq!(all.len(), 12);
        assert_eq!(all[0].name, "iPhone 12 (128GB)");
        assert_eq!(all[11].name, "Kindle Paperwhite");
        assert_eq!(store.next_id(), 13);
    }
}
