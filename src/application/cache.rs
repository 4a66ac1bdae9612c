//! Process-wide response cache for catalog reads.
//!
//! Keyed by operation plus all input parameters: point reads by item id,
//! listings by (predicate fingerprint, page, page size). Every mutation
//! clears the whole map, so no stale entry can survive a write. Entries
//! carry no expiry beyond invalidation.
//!
//! Constructed once at startup and injected into the catalog service; the
//! underlying container is a sharded concurrent map, so in-process cache
//! operations are infallible and reads degrade to store calls only on miss.

use dashmap::DashMap;
use metrics::counter;
use uuid::Uuid;

use crate::application::pagination::{ItemPage, PageRequest};
use crate::domain::items::ItemRecord;

pub const METRIC_CACHE_HIT: &str = "listino_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "listino_cache_miss_total";
pub const METRIC_CACHE_INVALIDATE: &str = "listino_cache_invalidate_total";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    ItemById(Uuid),
    ItemList {
        fingerprint: u64,
        page: u32,
        per_page: u32,
    },
}

#[derive(Clone)]
enum CachedValue {
    Item(ItemRecord),
    List(ItemPage<ItemRecord>),
}

#[derive(Default)]
pub struct ResponseCache {
    entries: DashMap<CacheKey, CachedValue>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get_item(&self, id: Uuid) -> Option<ItemRecord> {
        match self.entries.get(&CacheKey::ItemById(id)) {
            Some(entry) => match entry.value() {
                CachedValue::Item(record) => {
                    counter!(METRIC_CACHE_HIT).increment(1);
                    Some(record.clone())
                }
                CachedValue::List(_) => None,
            },
            None => {
                counter!(METRIC_CACHE_MISS).increment(1);
                None
            }
        }
    }

    pub fn put_item(&self, record: &ItemRecord) {
        self.entries
            .insert(CacheKey::ItemById(record.id), CachedValue::Item(record.clone()));
    }

    pub fn get_list(&self, fingerprint: u64, request: PageRequest) -> Option<ItemPage<ItemRecord>> {
        let key = CacheKey::ItemList {
            fingerprint,
            page: request.page(),
            per_page: request.per_page(),
        };
        match self.entries.get(&key) {
            Some(entry) => match entry.value() {
                CachedValue::List(page) => {
                    counter!(METRIC_CACHE_HIT).increment(1);
                    Some(page.clone())
                }
                CachedValue::Item(_) => None,
            },
            None => {
                counter!(METRIC_CACHE_MISS).increment(1);
                None
            }
        }
    }

    pub fn put_list(&self, fingerprint: u64, request: PageRequest, page: &ItemPage<ItemRecord>) {
        let key = CacheKey::ItemList {
            fingerprint,
            page: request.page(),
            per_page: request.per_page(),
        };
        self.entries.insert(key, CachedValue::List(page.clone()));
    }

    /// Drop every entry, all operations included.
    pub fn invalidate_all(&self) {
        self.entries.clear();
        counter!(METRIC_CACHE_INVALIDATE).increment(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn record(name: &str) -> ItemRecord {
        let now = OffsetDateTime::now_utc();
        ItemRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price: "1".parse().expect("decimal"),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    #[test]
    fn point_read_round_trip() {
        let cache = ResponseCache::new();
        let item = record("cached");

        assert!(cache.get_item(item.id).is_none());
        cache.put_item(&item);
        assert_eq!(cache.get_item(item.id), Some(item));
    }

    #[test]
    fn list_entries_are_keyed_by_page_and_fingerprint() {
        let cache = ResponseCache::new();
        let first = PageRequest::new(0, 10).expect("valid request");
        let second = PageRequest::new(1, 10).expect("valid request");
        let page = ItemPage::new(vec![record("a")], 1, first);

        cache.put_list(7, first, &page);
        assert_eq!(cache.get_list(7, first), Some(page));
        assert!(cache.get_list(7, second).is_none());
        assert!(cache.get_list(8, first).is_none());
    }

    #[test]
    fn invalidate_all_clears_every_operation() {
        let cache = ResponseCache::new();
        let item = record("gone");
        let request = PageRequest::new(0, 10).expect("valid request");

        cache.put_item(&item);
        cache.put_list(0, request, &ItemPage::new(vec![item.clone()], 1, request));
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(cache.get_item(item.id).is_none());
        assert!(cache.get_list(0, request).is_none());
    }
}
