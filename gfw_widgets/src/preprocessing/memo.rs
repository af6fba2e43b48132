use std::sync::Arc;

/// Single-entry memo for one node of the derived-state graph.
///
/// Holds the last dependency key and the value derived from it. A lookup
/// with a structurally equal key returns the cached value, including a
/// cached `None`.
#[derive(Debug)]
pub struct Memo<K, V> {
    name: &'static str,
    entry: Option<(K, Option<Arc<V>>)>,
    recomputations: usize,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entry: None,
            recomputations: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute<F>(&mut self, key: K, compute: F) -> Option<Arc<V>>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        if let Some((cached_key, value)) = &self.entry {
            if *cached_key == key {
                return value.clone();
            }
        }

        self.recomputations += 1;
        let value = compute(&key).map(Arc::new);
        log::debug!(
            "Recomputed {} ({}){}",
            self.name,
            self.recomputations,
            if value.is_none() { ": no value" } else { "" }
        );
        self.entry = Some((key, value.clone()));
        value
    }

    /// How many times the value has been derived.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}
