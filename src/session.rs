use std::rc::Rc;
use tracing::{info, warn};

use crate::accounts::inventory_key;
use crate::defaults::starter_items;
use crate::store::{now_millis, InventoryStore, RestoreOutcome};
use crate::storage::KeyValueStore;

/// A signed-in user and their inventory.
pub struct Session {
    pub username: String,
    pub store: InventoryStore,
}

impl Session {
    /// Load the user's inventory. Demo accounts with nothing stored yet get
    /// the starter products.
    pub fn open(storage: Rc<dyn KeyValueStore>, username: &str, is_demo: bool, recent_capacity: usize) -> Self {
        let mut store = InventoryStore::with_storage(storage, inventory_key(username), recent_capacity);
        match store.load() {
            RestoreOutcome::Missing if is_demo => {
                let count = store.import_items(starter_items(now_millis()));
                info!(username, count, "loaded starter items for demo account");
            }
            RestoreOutcome::Corrupt => {
                warn!(username, "inventory was unreadable and has been reset");
            }
            RestoreOutcome::Restored { items, skipped } if skipped > 0 => {
                warn!(username, items, skipped, "some stored items could not be read");
            }
            _ => {}
        }
        Session {
            username: username.to_string(),
            store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewItem;
    use crate::storage::MemoryStore;

    #[test]
    fn test_demo_gets_starter_items_once() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut session = Session::open(storage.clone(), "devk", true, 5);
        assert_eq!(session.store.len(), 12);

        let first = session.store.all_items()[0].id;
        session.store.remove_item(first);

        let session = Session::open(storage, "devk", true, 5);
        assert_eq!(session.store.len(), 11);
    }

    #[test]
    fn test_users_are_isolated() {
        let storage: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let mut alice = Session::open(storage.clone(), "alice", false, 5);
        assert!(alice.store.is_empty());
        alice.store.add_item(NewItem::new("Lamp", "Furniture", 10.0, 20.0));

        let bob = Session::open(storage.clone(), "bob", false, 5);
        assert!(bob.store.is_empty());

        let alice = Session::open(storage, "alice", false, 5);
        assert_eq!(alice.store.len(), 1);
    }
}
