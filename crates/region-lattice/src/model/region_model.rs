//! Tree model adapter for region hierarchies.
//!
//! [`RegionTreeModel`] exposes a [`Region`] hierarchy through the generic
//! [`ItemModel`] interface so any tree view can display and rename regions.
//! It keeps a [`RegionTreeItems`] cache and hands out indices whose internal
//! ID is the cached item's arena key.
//!
//! The model does not subscribe to region changes on its own. Whoever owns the
//! subscription (normally [`RegionEditor`](crate::editor::RegionEditor)) calls
//! [`reconstruct_region_tree`](RegionTreeModel::reconstruct_region_tree) with
//! the changed region, and the model rebuilds only the affected subtree.

use parking_lot::{Mutex, RwLock};
use region_lattice_core::logging::targets;
use region_lattice_core::{PerfSpan, Region, RegionId};

use super::index::ModelIndex;
use super::region_item::{ItemKey, RegionTreeItems};
use super::role::{ItemData, ItemRole};
use super::traits::{ItemFlags, ItemModel, ModelSignals};

/// What to do when a change notification names a region the cache lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingRegionPolicy {
    /// Log the inconsistency and keep the last good cache.
    #[default]
    Ignore,
    /// Log the inconsistency, then rebuild the whole cache from the root.
    RebuildAll,
}

/// Configuration for a [`RegionTreeModel`].
#[derive(Debug, Clone, Default)]
pub struct RegionModelConfig {
    /// Recovery behavior for notifications about uncached regions.
    pub missing_region_policy: MissingRegionPolicy,
}

impl RegionModelConfig {
    /// Sets the missing region policy.
    pub fn with_missing_region_policy(mut self, policy: MissingRegionPolicy) -> Self {
        self.missing_region_policy = policy;
        self
    }
}

/// An [`ItemModel`] over a region hierarchy.
///
/// The model is single-column. The real root region is the only top-level
/// row; it sits under a synthetic invisible root that views never see.
///
/// # Example
///
/// ```
/// use region_lattice::model::{ItemModel, ModelIndex, RegionTreeModel};
/// use region_lattice_core::Region;
///
/// let root = Region::new_root("Heart");
/// root.create_named_child("Lung-L").unwrap();
/// let right = root.create_named_child("Lung-R").unwrap();
///
/// let model = RegionTreeModel::new(&root);
/// let heart = model.index(0, 0, &ModelIndex::invalid());
/// let lung_r = model.index(1, 0, &heart);
///
/// assert_eq!(model.display_text(&lung_r).as_deref(), Some("Lung-R"));
/// assert!(model.region_at_index(&lung_r).unwrap().ptr_eq(&right));
/// assert_eq!(model.region_index(&right), lung_r);
/// ```
pub struct RegionTreeModel {
    items: RwLock<RegionTreeItems>,
    root_region: RwLock<Option<Region>>,
    /// Region currently being renamed through `set_data`.
    renaming: Mutex<Option<RegionId>>,
    config: RegionModelConfig,
    signals: ModelSignals,
}

impl RegionTreeModel {
    /// Creates a model mirroring the hierarchy under `root`.
    pub fn new(root: &Region) -> Self {
        Self::with_config(Some(root), RegionModelConfig::default())
    }

    /// Creates a model with no root region and no rows.
    pub fn empty() -> Self {
        Self::with_config(None, RegionModelConfig::default())
    }

    /// Creates a model with custom configuration.
    pub fn with_config(root: Option<&Region>, config: RegionModelConfig) -> Self {
        let items = match root {
            Some(root) => RegionTreeItems::with_root(root),
            None => RegionTreeItems::new(),
        };
        Self {
            items: RwLock::new(items),
            root_region: RwLock::new(root.cloned()),
            renaming: Mutex::new(None),
            config,
            signals: ModelSignals::new(),
        }
    }

    /// Returns the model configuration.
    pub fn config(&self) -> &RegionModelConfig {
        &self.config
    }

    /// Returns the current root region.
    pub fn root_region(&self) -> Option<Region> {
        self.root_region.read().clone()
    }

    /// Rebuilds the entire cache from a new root region.
    ///
    /// Emits `model_about_to_reset` / `model_reset`. Every previously issued
    /// index becomes stale.
    pub fn set_root_region(&self, root: &Region) {
        let _span = PerfSpan::new("region_model.set_root_region");
        self.signals.emit_reset(|| {
            self.items.write().set_root_region(Some(root));
            *self.root_region.write() = Some(root.clone());
        });
        tracing::debug!(
            target: targets::MODEL,
            root = %root.display_name(),
            id = %root.id(),
            "rebuilt region tree"
        );
    }

    /// Brings the cache up to date after a change to `region`.
    ///
    /// A change to the model's root region, or any region while the model has
    /// no root, rebuilds the whole cache from it. Otherwise only the children
    /// of `region` are rebuilt: rows are reported removed and re-inserted
    /// under its index, and items elsewhere keep their indices.
    ///
    /// If `region` is not in the cache (it was removed, or an ancestor was
    /// removed before this notification arrived) the error is logged and the
    /// configured [`MissingRegionPolicy`] applies. A detached region never
    /// replaces the root.
    pub fn reconstruct_region_tree(&self, region: &Region) {
        match self.root_region() {
            Some(root) if !root.ptr_eq(region) => self.rebuild_subtree(region),
            _ => self.set_root_region(region),
        }
    }

    fn rebuild_subtree(&self, region: &Region) {
        let _span = PerfSpan::new("region_model.rebuild_subtree");

        let target = {
            let items = self.items.read();
            items
                .find_item_for_region(region)
                .and_then(|key| Some((Self::create_index(&items, key)?, items.child_count(key))))
        };
        let Some((parent_index, old_count)) = target else {
            tracing::error!(
                target: targets::MODEL,
                region = %region.display_name(),
                id = %region.id(),
                detached = region.is_root(),
                policy = ?self.config.missing_region_policy,
                "change notification for region missing from tree cache"
            );
            self.recover_missing_region();
            return;
        };

        if old_count > 0 {
            self.signals
                .rows_about_to_be_removed
                .emit((parent_index, 0, old_count - 1));
        }
        let new_count = {
            let mut items = self.items.write();
            items
                .rebuild_region_tree_items(region)
                .map_or(0, |key| items.child_count(key))
        };
        if old_count > 0 {
            self.signals.rows_removed.emit((parent_index, 0, old_count - 1));
        }
        if new_count > 0 {
            self.signals
                .rows_about_to_be_inserted
                .emit((parent_index, 0, new_count - 1));
            self.signals.rows_inserted.emit((parent_index, 0, new_count - 1));
        }

        tracing::debug!(
            target: targets::MODEL,
            region = %region.display_name(),
            old_count,
            new_count,
            "rebuilt region subtree"
        );
    }

    fn recover_missing_region(&self) {
        match self.config.missing_region_policy {
            MissingRegionPolicy::Ignore => {}
            MissingRegionPolicy::RebuildAll => {
                if let Some(root) = self.root_region() {
                    self.set_root_region(&root);
                }
            }
        }
    }

    /// Emits `data_changed` for the item mirroring `region`.
    ///
    /// Call this for property-only (non-structural) changes. Renames made
    /// through [`ItemModel::set_data`] already report their own change.
    pub fn region_data_changed(&self, region: &Region) {
        if *self.renaming.lock() == Some(region.id()) {
            return;
        }
        let index = self.region_index(region);
        if index.is_valid() {
            self.signals
                .emit_data_changed_single(index, ItemRole::RENAME.to_vec());
        }
    }

    /// Returns the region an index points at, or `None` for invalid or stale
    /// indices.
    pub fn region_at_index(&self, index: &ModelIndex) -> Option<Region> {
        let items = self.items.read();
        let key = Self::item_key(&items, index)?;
        items.region(key).cloned()
    }

    /// Returns the index of the item mirroring `region`, or an invalid index
    /// if the region is not in the cache.
    pub fn region_index(&self, region: &Region) -> ModelIndex {
        let items = self.items.read();
        items
            .find_item_for_region(region)
            .and_then(|key| Self::create_index(&items, key))
            .unwrap_or_else(ModelIndex::invalid)
    }

    /// Resolves a valid index to a live item key.
    fn item_key(items: &RegionTreeItems, index: &ModelIndex) -> Option<ItemKey> {
        if !index.is_valid() {
            return None;
        }
        let key = ItemKey::from_raw(index.internal_id());
        (items.contains(key) && key != items.invisible_root()).then_some(key)
    }

    /// Resolves a parent index; the invalid index means the invisible root.
    fn parent_key(items: &RegionTreeItems, parent: &ModelIndex) -> Option<ItemKey> {
        if parent.is_valid() {
            Self::item_key(items, parent)
        } else {
            Some(items.invisible_root())
        }
    }

    fn create_index(items: &RegionTreeItems, key: ItemKey) -> Option<ModelIndex> {
        if key == items.invisible_root() {
            return None;
        }
        let row = items.get(key)?.row();
        Some(ModelIndex::with_internal_id(row, 0, key.as_raw()))
    }
}

impl Default for RegionTreeModel {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for RegionTreeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionTreeModel")
            .field("root_region", &*self.root_region.read())
            .field("items", &self.items.read().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ItemModel for RegionTreeModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.column() > 0 {
            return 0;
        }
        let items = self.items.read();
        Self::parent_key(&items, parent).map_or(0, |key| items.child_count(key))
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        1
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if index.column() != 0 {
            return ItemData::None;
        }
        let Some(region) = self.region_at_index(index) else {
            return ItemData::None;
        };
        match role {
            ItemRole::Display => region.display_name().into(),
            ItemRole::Edit => region.name().into(),
            ItemRole::ToolTip => region.path().into(),
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column != 0 || parent.column() > 0 {
            return ModelIndex::invalid();
        }
        let items = self.items.read();
        Self::parent_key(&items, parent)
            .and_then(|key| items.child(key, row))
            .and_then(|child| Self::create_index(&items, child))
            .unwrap_or_else(ModelIndex::invalid)
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let items = self.items.read();
        Self::item_key(&items, index)
            .and_then(|key| items.parent(key))
            .and_then(|parent| Self::create_index(&items, parent))
            .unwrap_or_else(ModelIndex::invalid)
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    /// Renames the region at `index` to `value` coerced to text.
    ///
    /// Returns the rename result: `false` for invalid or stale indices,
    /// `ItemData::None`, roles that are not writable, and names the
    /// region rejects (such as a sibling's name).
    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        if !role.is_writable() {
            return false;
        }
        let Some(region) = self.region_at_index(index) else {
            return false;
        };
        let Some(name) = value.to_text() else {
            return false;
        };

        *self.renaming.lock() = Some(region.id());
        let renamed = region.set_name(name);
        *self.renaming.lock() = None;

        if renamed {
            self.signals
                .emit_data_changed_single(*index, ItemRole::RENAME.to_vec());
        }
        renamed
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if self.region_at_index(index).is_some() {
            ItemFlags::editable()
        } else {
            ItemFlags::none()
        }
    }
}

static_assertions::assert_impl_all!(RegionTreeModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn heart() -> (Region, Region, Region) {
        let root = Region::new_root("Heart");
        let left = root.create_named_child("Lung-L").unwrap();
        let right = root.create_named_child("Lung-R").unwrap();
        (root, left, right)
    }

    fn top(model: &RegionTreeModel) -> ModelIndex {
        model.index(0, 0, &ModelIndex::invalid())
    }

    #[test]
    fn test_empty_model() {
        let model = RegionTreeModel::empty();
        assert_eq!(model.row_count(&ModelIndex::invalid()), 0);
        assert!(!top(&model).is_valid());
        assert!(model.root_region().is_none());
    }

    #[test]
    fn test_single_top_level_row() {
        let (root, _, _) = heart();
        let model = RegionTreeModel::new(&root);

        assert_eq!(model.row_count(&ModelIndex::invalid()), 1);
        assert_eq!(model.column_count(&ModelIndex::invalid()), 1);
        let heart = top(&model);
        assert_eq!(model.display_text(&heart).as_deref(), Some("Heart"));
        assert!(!model.parent(&heart).is_valid());
        assert_eq!(model.row_count(&heart), 2);
    }

    #[test]
    fn test_index_out_of_range_is_invalid() {
        let (root, _, _) = heart();
        let model = RegionTreeModel::new(&root);
        let heart = top(&model);

        assert!(!model.index(2, 0, &heart).is_valid());
        assert!(!model.index(0, 1, &heart).is_valid());
        assert!(!model.index(1, 0, &ModelIndex::invalid()).is_valid());
    }

    #[test]
    fn test_row_count_non_zero_column() {
        let (root, _, _) = heart();
        let model = RegionTreeModel::new(&root);
        let heart = top(&model);
        let fake_column = ModelIndex::with_internal_id(heart.row(), 1, heart.internal_id());
        assert_eq!(model.row_count(&fake_column), 0);
    }

    #[test]
    fn test_data_roles() {
        let (root, _, _) = heart();
        let model = RegionTreeModel::new(&root);
        let heart = top(&model);

        assert_eq!(model.data(&heart, ItemRole::Display).as_string(), Some("Heart"));
        assert_eq!(model.data(&heart, ItemRole::Edit).as_string(), Some("Heart"));
        assert_eq!(model.data(&heart, ItemRole::ToolTip).as_string(), Some("/"));
        let lung_l = model.index(0, 0, &heart);
        assert_eq!(model.data(&lung_l, ItemRole::ToolTip).as_string(), Some("/Lung-L"));
        assert!(model.data(&ModelIndex::invalid(), ItemRole::Display).is_none());
    }

    #[test]
    fn test_unnamed_root_displays_slash() {
        let root = Region::new_root("");
        let model = RegionTreeModel::new(&root);
        assert_eq!(model.display_text(&top(&model)).as_deref(), Some("/"));
        assert_eq!(model.data(&top(&model), ItemRole::Edit).as_string(), Some(""));
    }

    #[test]
    fn test_flags() {
        let (root, _, _) = heart();
        let model = RegionTreeModel::new(&root);
        assert_eq!(model.flags(&top(&model)), ItemFlags::editable());
        assert_eq!(model.flags(&ModelIndex::invalid()), ItemFlags::none());
    }

    #[test]
    fn test_set_data_renames_and_emits_once() {
        let (root, left, _) = heart();
        let model = Arc::new(RegionTreeModel::new(&root));
        let changed = Arc::new(Mutex::new(Vec::new()));
        let sink = changed.clone();
        model.signals().data_changed.connect(move |(index, _, _)| {
            sink.lock().push(*index);
        });
        // Forward property changes the way an editor does
        let weak = Arc::downgrade(&model);
        root.connect_region_change(move |region, structural| {
            if let (false, Some(model)) = (structural, weak.upgrade()) {
                model.region_data_changed(region);
            }
        });

        let lung_l = model.region_index(&left);
        assert!(model.set_data(&lung_l, ItemData::from("Lung-Left"), ItemRole::Edit));
        assert_eq!(left.name(), "Lung-Left");
        assert_eq!(model.display_text(&lung_l).as_deref(), Some("Lung-Left"));
        assert_eq!(*changed.lock(), vec![lung_l]);

        // Renames made outside the model are forwarded
        left.set_name("Lung-L");
        assert_eq!(changed.lock().len(), 2);
    }

    #[test]
    fn test_set_data_rejections() {
        let (root, left, right) = heart();
        let model = RegionTreeModel::new(&root);
        let lung_r = model.region_index(&right);

        assert!(!model.set_data(&lung_r, ItemData::from("Lung-L"), ItemRole::Edit));
        assert!(!model.set_data(&lung_r, ItemData::None, ItemRole::Edit));
        assert!(!model.set_data(&lung_r, ItemData::from("x"), ItemRole::ToolTip));
        assert!(!model.set_data(&ModelIndex::invalid(), ItemData::from("x"), ItemRole::Edit));
        assert_eq!(model.display_text(&lung_r).as_deref(), Some("Lung-R"));
        assert_eq!(left.name(), "Lung-L");

        // Numbers are coerced to text
        assert!(model.set_data(&lung_r, ItemData::from(2), ItemRole::Display));
        assert_eq!(right.name(), "2");
    }

    #[test]
    fn test_targeted_rebuild_emits_row_signals() {
        let (root, left, _) = heart();
        left.create_child();
        let model = RegionTreeModel::new(&root);
        let events = Arc::new(Mutex::new(Vec::new()));

        let sink = events.clone();
        model.signals().rows_removed.connect(move |(parent, first, last)| {
            sink.lock().push(("removed", parent.row(), *first, *last));
        });
        let sink = events.clone();
        model.signals().rows_inserted.connect(move |(parent, first, last)| {
            sink.lock().push(("inserted", parent.row(), *first, *last));
        });

        left.create_child();
        left.create_child();
        model.reconstruct_region_tree(&left);

        assert_eq!(
            *events.lock(),
            vec![("removed", 0, 0, 0), ("inserted", 0, 0, 2)]
        );
        assert_eq!(model.row_count(&model.region_index(&left)), 3);
    }

    #[test]
    fn test_reconstruct_root_resets() {
        let (root, _, _) = heart();
        let model = RegionTreeModel::new(&root);
        let resets = Arc::new(Mutex::new(0));
        let sink = resets.clone();
        model.signals().model_reset.connect(move |_| *sink.lock() += 1);

        let old_top = top(&model);
        root.create_child();
        model.reconstruct_region_tree(&root);

        assert_eq!(*resets.lock(), 1);
        assert_eq!(model.row_count(&top(&model)), 3);
        // The old index went stale with the reset
        assert!(model.region_at_index(&old_top).is_none());
    }

    #[test]
    fn test_detached_region_does_not_replace_root() {
        let (root, left, right) = heart();
        let model = RegionTreeModel::new(&root);
        let resets = Arc::new(Mutex::new(0));
        let sink = resets.clone();
        model.signals().model_reset.connect(move |_| *sink.lock() += 1);

        left.remove().unwrap();
        model.reconstruct_region_tree(&root);
        let lung_r = model.region_index(&right);

        left.create_child();
        model.reconstruct_region_tree(&left);

        assert_eq!(*resets.lock(), 1);
        assert!(model.root_region().unwrap().ptr_eq(&root));
        assert_eq!(model.display_text(&top(&model)).as_deref(), Some("Heart"));
        assert!(model.region_at_index(&lung_r).unwrap().ptr_eq(&right));
    }

    #[test]
    fn test_empty_model_adopts_first_region() {
        let model = RegionTreeModel::empty();
        let (root, _, _) = heart();
        model.reconstruct_region_tree(&root);
        assert!(model.root_region().unwrap().ptr_eq(&root));
        assert_eq!(model.row_count(&top(&model)), 2);
    }

    /// Heart > Lung-L > Lobe > Segment, with Lung-R beside Lung-L.
    fn deep() -> (Region, Region, Region, Region) {
        let (root, left, _) = heart();
        let lobe = left.create_named_child("Lobe").unwrap();
        let segment = lobe.create_named_child("Segment").unwrap();
        (root, left, lobe, segment)
    }

    #[test]
    fn test_missing_region_ignored_by_default() {
        let (root, left, lobe, segment) = deep();
        let model = RegionTreeModel::new(&root);
        let lung_r = model.index(1, 0, &top(&model));

        lobe.remove().unwrap();
        model.reconstruct_region_tree(&left);
        assert_eq!(model.row_count(&model.region_index(&left)), 0);

        // Segment still points at the detached lobe, which is no longer cached
        segment.create_child();
        model.reconstruct_region_tree(&segment);

        assert_eq!(model.display_text(&lung_r).as_deref(), Some("Lung-R"));
        assert_eq!(model.row_count(&top(&model)), 2);
        assert!(!model.region_index(&segment).is_valid());
    }

    #[test]
    fn test_missing_region_rebuild_all_policy() {
        let (root, left, lobe, segment) = deep();
        let config = RegionModelConfig::default()
            .with_missing_region_policy(MissingRegionPolicy::RebuildAll);
        let model = RegionTreeModel::with_config(Some(&root), config);
        let resets = Arc::new(Mutex::new(0));
        let sink = resets.clone();
        model.signals().model_reset.connect(move |_| *sink.lock() += 1);

        lobe.remove().unwrap();
        model.reconstruct_region_tree(&left);
        segment.create_child();
        model.reconstruct_region_tree(&segment);

        assert_eq!(*resets.lock(), 1);
        assert_eq!(model.row_count(&top(&model)), 2);
        assert!(model.region_index(&left).is_valid());
        assert!(!model.region_index(&lobe).is_valid());
    }
}
