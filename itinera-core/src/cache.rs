//! Memo for per-item lookups (images, ticket prices) keyed by item position.
//!
//! An entry remembers a fingerprint of the item's place and activity text;
//! once either changes the entry is stale and is evicted on the next read.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::plan::{Item, ItemKey, Plan};

fn fingerprint(item: &Item) -> u64 {
    let mut h = DefaultHasher::new();
    item.place.hash(&mut h);
    item.activity.hash(&mut h);
    h.finish()
}

#[derive(Debug, Clone)]
pub struct EnrichmentCache<V> {
    entries: HashMap<ItemKey, (u64, V)>,
}

impl<V> Default for EnrichmentCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> EnrichmentCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, plan: &Plan, key: ItemKey, value: V) -> bool {
        let Some(item) = plan.item(key) else {
            return false;
        };
        self.entries.insert(key, (fingerprint(item), value));
        true
    }

    /// Cached value for the item at `key`, provided its text is unchanged.
    pub fn get(&mut self, plan: &Plan, key: ItemKey) -> Option<&V> {
        let current = plan.item(key).map(fingerprint);
        let fresh = matches!(
            (current, self.entries.get(&key)),
            (Some(fp), Some((cached, _))) if fp == *cached
        );
        if !fresh {
            self.entries.remove(&key);
            return None;
        }
        self.entries.get(&key).map(|(_, v)| v)
    }

    /// Drop entries whose item disappeared or changed text.
    pub fn retain_plan(&mut self, plan: &Plan) {
        self.entries
            .retain(|key, (fp, _)| plan.item(*key).map(fingerprint) == Some(*fp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Item;
    use crate::test_support::{budget_with, plan_of};

    fn plan() -> Plan {
        plan_of(
            vec![vec![
                Item::new("09:00", "Lotte World", "Theme park"),
                Item::new("18:00", "Gwangjang Market", "Dinner"),
            ]],
            budget_with(|_| {}),
        )
    }

    #[test]
    fn hit_while_text_unchanged() {
        let p = plan();
        let mut cache = EnrichmentCache::new();
        assert!(cache.insert(&p, ItemKey::new(0, 0), 59_000));
        assert_eq!(cache.get(&p, ItemKey::new(0, 0)), Some(&59_000));

        let mut recosted = p.clone();
        recosted.days[0].items[0].cost = Some(1);
        assert_eq!(cache.get(&recosted, ItemKey::new(0, 0)), Some(&59_000));
    }

    #[test]
    fn text_edit_invalidates() {
        let p = plan();
        let mut cache = EnrichmentCache::new();
        cache.insert(&p, ItemKey::new(0, 0), "img-a");

        let mut edited = p.clone();
        edited.days[0].items[0].activity = "Night parade".into();
        assert_eq!(cache.get(&edited, ItemKey::new(0, 0)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn retain_drops_removed_items() {
        let p = plan();
        let mut cache = EnrichmentCache::new();
        cache.insert(&p, ItemKey::new(0, 0), 1);
        cache.insert(&p, ItemKey::new(0, 1), 2);
        assert!(!cache.insert(&p, ItemKey::new(3, 0), 3));

        let mut shorter = p.clone();
        shorter.days[0].items.truncate(1);
        cache.retain_plan(&shorter);
        assert_eq!(cache.len(), 1);
    }
}
