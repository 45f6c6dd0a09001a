use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Result;

use crate::family::FamilyGraph;
use crate::layout::LayoutResult;

const DEFAULT_CAPACITY: usize = 10;

/// Memoizes the layout collaborator per (node set, root). Owned by the
/// ViewModel rather than living behind a global. Eviction is FIFO on insertion
/// order: a hit does not refresh an entry's position.
pub struct LayoutCache {
    capacity: usize,
    entries: HashMap<String, Arc<LayoutResult>>,
    insertion_order: VecDeque<String>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Order-independent in the node set, order-dependent in the root.
    fn cache_key(graph: &FamilyGraph, root_id: &str) -> String {
        let ids = graph.sorted_ids();
        let mut key = String::with_capacity(root_id.len() + ids.len() * 8);
        key.push_str(root_id);
        key.push('|');
        for id in &ids {
            key.push_str(id);
            key.push(',');
        }
        key.push('|');
        key.push_str(&ids.len().to_string());
        key
    }

    pub fn get<F>(
        &mut self,
        graph: &FamilyGraph,
        root_id: &str,
        layout_fn: F,
    ) -> Result<Arc<LayoutResult>>
    where
        F: FnOnce(&FamilyGraph, &str) -> Result<LayoutResult>,
    {
        let key = Self::cache_key(graph, root_id);

        if let Some(result) = self.entries.get(&key) {
            log::debug!("layout cache hit for root {root_id}");
            return Ok(Arc::clone(result));
        }

        // Errors propagate uncached; no partial entries.
        let result = Arc::new(layout_fn(graph, root_id)?);

        self.entries.insert(key.clone(), Arc::clone(&result));
        self.insertion_order.push_back(key);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            log::debug!("layout cache evicted oldest entry (capacity {})", self.capacity);
        }

        Ok(result)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;

    use super::*;
    use crate::family::test_support::chain;
    use crate::layout::layout_tree;

    #[test]
    fn second_get_returns_the_memoized_result_without_recomputing() {
        let graph = chain(&["a", "b", "c"]);
        let mut cache = LayoutCache::new();
        let calls = Cell::new(0usize);

        let mut layout = |graph: &FamilyGraph, root: &str| {
            calls.set(calls.get() + 1);
            layout_tree(graph, root)
        };

        let first = cache.get(&graph, "a", &mut layout).unwrap();
        let second = cache.get(&graph, "a", &mut layout).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn key_ignores_node_order_but_not_root() {
        let graph = chain(&["a", "b"]);
        let mut cache = LayoutCache::new();

        cache.get(&graph, "a", layout_tree).unwrap();
        assert_eq!(cache.len(), 1);

        // Same node set, different root: distinct entry.
        cache.get(&graph, "b", layout_tree).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn eleventh_distinct_key_evicts_the_first_inserted() {
        let graph = chain(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"]);
        let mut cache = LayoutCache::new();
        let roots = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

        for root in roots {
            cache.get(&graph, root, layout_tree).unwrap();
        }
        assert_eq!(cache.len(), 10);

        // Touch the oldest entry; FIFO must ignore recency.
        let calls = Cell::new(0usize);
        cache
            .get(&graph, "a", |graph, root| {
                calls.set(calls.get() + 1);
                layout_tree(graph, root)
            })
            .unwrap();
        assert_eq!(calls.get(), 0);

        cache.get(&graph, "k", layout_tree).unwrap();
        assert_eq!(cache.len(), 10);

        // "a" was inserted first, so it is the one gone.
        cache
            .get(&graph, "a", |graph, root| {
                calls.set(calls.get() + 1);
                layout_tree(graph, root)
            })
            .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn layout_errors_are_not_cached() {
        let graph = chain(&["a"]);
        let mut cache = LayoutCache::new();

        let result = cache.get(&graph, "a", |_, _| Err(anyhow!("layout exploded")));
        assert!(result.is_err());
        assert!(cache.is_empty());

        // A later successful call for the same key computes fresh.
        let result = cache.get(&graph, "a", layout_tree).unwrap();
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_unconditionally() {
        let graph = chain(&["a", "b"]);
        let mut cache = LayoutCache::new();
        cache.get(&graph, "a", layout_tree).unwrap();
        cache.get(&graph, "b", layout_tree).unwrap();

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn empty_graph_results_are_cached_like_any_other() {
        let graph = chain(&[]);
        let mut cache = LayoutCache::new();
        let result = cache.get(&graph, "root", layout_tree).unwrap();
        assert!(result.nodes.is_empty());
        assert_eq!(cache.len(), 1);
    }
}
