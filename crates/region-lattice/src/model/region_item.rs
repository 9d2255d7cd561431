//! Cached tree items mirroring a region hierarchy.
//!
//! [`RegionTreeItems`] is an arena of [`RegionTreeItem`]s: one item per region
//! reachable from the current root, plus a synthetic *invisible root* whose
//! single child is the item for the real root region. Items address each
//! other by [`ItemKey`]; ownership flows from the arena, and the parent link
//! is just a key.
//!
//! The cache is a point-in-time snapshot. When a region's children change,
//! [`RegionTreeItems::rebuild_region_tree_items`] frees the items below that
//! region and re-derives them from the live hierarchy. Items outside the
//! rebuilt subtree keep their keys and rows. Freed keys never resolve again,
//! which is what makes stale view indices detectable.

use region_lattice_core::Region;
use region_lattice_core::logging::targets;
use slotmap::{Key, KeyData, SlotMap, new_key_type};

new_key_type! {
    /// Arena handle for a cached tree item.
    pub struct ItemKey;
}

impl ItemKey {
    /// Converts the key into the opaque id stored in a `ModelIndex`.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Recovers a key from an opaque id. The key may be stale.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(KeyData::from_ffi(raw))
    }
}

/// One cached node: a region, its row among its siblings, and its children.
#[derive(Debug)]
pub struct RegionTreeItem {
    /// `None` only for the invisible root.
    region: Option<Region>,
    row: usize,
    parent: Option<ItemKey>,
    children: Vec<ItemKey>,
}

impl RegionTreeItem {
    /// The mirrored region, or `None` for the invisible root.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Row of this item within its parent.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Key of the parent item; `None` only for the invisible root.
    pub fn parent(&self) -> Option<ItemKey> {
        self.parent
    }

    /// Number of cached children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Key of the child at `row`, or `None` if out of range.
    pub fn child(&self, row: usize) -> Option<ItemKey> {
        self.children.get(row).copied()
    }
}

/// Arena of cached items rooted at a synthetic invisible root.
#[derive(Debug)]
pub struct RegionTreeItems {
    items: SlotMap<ItemKey, RegionTreeItem>,
    invisible_root: ItemKey,
}

impl Default for RegionTreeItems {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionTreeItems {
    /// Creates a cache containing only the invisible root.
    pub fn new() -> Self {
        let mut items = SlotMap::with_key();
        let invisible_root = items.insert(RegionTreeItem {
            region: None,
            row: 0,
            parent: None,
            children: Vec::new(),
        });
        Self {
            items,
            invisible_root,
        }
    }

    /// Creates a cache mirroring the hierarchy under `root`.
    pub fn with_root(root: &Region) -> Self {
        let mut cache = Self::new();
        cache.set_root_region(Some(root));
        cache
    }

    /// Key of the synthetic invisible root.
    #[inline]
    pub fn invisible_root(&self) -> ItemKey {
        self.invisible_root
    }

    /// Key of the real root item, if a root region is set.
    pub fn root_item(&self) -> Option<ItemKey> {
        self.child(self.invisible_root, 0)
    }

    /// Returns the item for `key`, or `None` if the key is stale.
    pub fn get(&self, key: ItemKey) -> Option<&RegionTreeItem> {
        self.items.get(key)
    }

    /// Returns `true` if `key` refers to a live item.
    pub fn contains(&self, key: ItemKey) -> bool {
        self.items.contains_key(key)
    }

    /// Number of live items, including the invisible root.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if only the invisible root exists.
    pub fn is_empty(&self) -> bool {
        self.items.len() == 1
    }

    /// Child of `key` at `row`; `None` when out of range or `key` is stale.
    pub fn child(&self, key: ItemKey, row: usize) -> Option<ItemKey> {
        self.items.get(key).and_then(|item| item.child(row))
    }

    /// Number of children of `key`; 0 if `key` is stale.
    pub fn child_count(&self, key: ItemKey) -> usize {
        self.items.get(key).map_or(0, RegionTreeItem::child_count)
    }

    /// Parent of `key`.
    pub fn parent(&self, key: ItemKey) -> Option<ItemKey> {
        self.items.get(key).and_then(RegionTreeItem::parent)
    }

    /// Region mirrored by `key`.
    pub fn region(&self, key: ItemKey) -> Option<&Region> {
        self.items.get(key).and_then(RegionTreeItem::region)
    }

    /// Depth-first search for the item mirroring `region`, by identity.
    pub fn find_item_for_region(&self, region: &Region) -> Option<ItemKey> {
        self.find_item_for_region_from(self.invisible_root, region)
    }

    /// Depth-first search below (and including) `start`, in pre-order.
    pub fn find_item_for_region_from(&self, start: ItemKey, region: &Region) -> Option<ItemKey> {
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            let Some(item) = self.items.get(key) else {
                continue;
            };
            if item.region.as_ref().is_some_and(|r| r.ptr_eq(region)) {
                return Some(key);
            }
            stack.extend(item.children.iter().rev().copied());
        }
        None
    }

    /// Re-derives the children of the item mirroring `region`.
    ///
    /// Returns the key of the rebuilt item. When no item mirrors `region`
    /// the error is logged and the cache is left untouched.
    pub fn rebuild_region_tree_items(&mut self, region: &Region) -> Option<ItemKey> {
        let Some(key) = self.find_item_for_region(region) else {
            tracing::error!(
                target: targets::MODEL,
                region = %region.display_name(),
                id = %region.id(),
                "missing item for region"
            );
            return None;
        };
        self.build_child_items(key);
        Some(key)
    }

    /// Replaces the invisible root's single child.
    ///
    /// The previous root item and its subtree are freed. `root_item` must be
    /// a live key outside that subtree, normally a freshly built item; it is
    /// re-parented under the invisible root at row 0.
    pub fn set_invisible_root_child(&mut self, root_item: ItemKey) {
        if !self.items.contains_key(root_item) {
            return;
        }
        let previous = std::mem::take(&mut self.items[self.invisible_root].children);
        for key in previous.into_iter().filter(|&key| key != root_item) {
            self.free_subtree(key);
        }
        let invisible_root = self.invisible_root;
        let item = &mut self.items[root_item];
        item.row = 0;
        item.parent = Some(invisible_root);
        self.items[invisible_root].children = vec![root_item];
    }

    /// Rebuilds the whole cache from `root`, or empties it for `None`.
    pub fn set_root_region(&mut self, root: Option<&Region>) {
        match root {
            Some(root) => {
                let root_item = self.build_item(root.clone(), 0, Some(self.invisible_root));
                self.set_invisible_root_child(root_item);
            }
            None => {
                let previous = std::mem::take(&mut self.items[self.invisible_root].children);
                for key in previous {
                    self.free_subtree(key);
                }
            }
        }
    }

    /// Creates an item for `region` and, recursively, its children.
    fn build_item(&mut self, region: Region, row: usize, parent: Option<ItemKey>) -> ItemKey {
        let key = self.items.insert(RegionTreeItem {
            region: Some(region),
            row,
            parent,
            children: Vec::new(),
        });
        self.build_child_items(key);
        key
    }

    /// Frees the existing children of `key` and rebuilds them from its region.
    fn build_child_items(&mut self, key: ItemKey) {
        let Some(item) = self.items.get_mut(key) else {
            return;
        };
        let previous = std::mem::take(&mut item.children);
        let child_regions = item.region.as_ref().map(Region::children).unwrap_or_default();
        for child in previous {
            self.free_subtree(child);
        }

        let children: Vec<ItemKey> = child_regions
            .into_iter()
            .enumerate()
            .map(|(row, child)| self.build_item(child, row, Some(key)))
            .collect();
        self.items[key].children = children;
    }

    /// Removes `key` and all of its descendants from the arena.
    fn free_subtree(&mut self, key: ItemKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if let Some(item) = self.items.remove(key) {
                stack.extend(item.children);
            }
        }
    }
}
