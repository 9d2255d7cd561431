//! Region hierarchy for Region Lattice.
//!
//! A [`Region`] is a named node in a hierarchical document. Regions own their
//! children; each child keeps only a weak reference back to its parent, so
//! ownership flows strictly from the root downwards and dropping the root
//! releases the whole tree.
//!
//! # Identity
//!
//! `Region` is a cheap, clonable handle. Two handles refer to the same region
//! when [`Region::ptr_eq`] returns `true`; names are *not* identities, since a
//! hierarchy may contain many regions with the same name at different levels.
//!
//! # Change Notification
//!
//! Every mutation reports `(changed_region, structural_change)` through the
//! region-change signal of the changed region and of each of its ancestors,
//! so subscribing on the root observes the whole document:
//!
//! | Operation                       | Changed region | Structural |
//! |---------------------------------|----------------|------------|
//! | [`create_child`](Region::create_child) | the parent | `true` |
//! | [`clear`](Region::clear)        | the cleared region | `true` |
//! | [`remove`](Region::remove)      | the former parent  | `true` |
//! | [`set_name`](Region::set_name)  | the renamed region | `false` |
//!
//! Slots run synchronously on the mutating thread after every region lock has
//! been released, so they may freely query or mutate the hierarchy.
//!
//! # Example
//!
//! ```
//! use region_lattice_core::Region;
//!
//! let root = Region::new_root("Heart");
//! root.connect_region_change(|region, structural| {
//!     println!("{} changed (structural: {})", region.display_name(), structural);
//! });
//!
//! let lung = root.create_child();
//! assert_eq!(lung.name(), "region1");
//! assert!(lung.set_name("Lung-L"));
//! assert_eq!(lung.path(), "/Lung-L");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{RegionError, Result, SignalError};
use crate::logging::{RegionTreeDebug, TreeFormatOptions, targets};
use crate::signal::{ConnectionId, Signal};

/// Prefix for names generated by [`Region::create_child`].
const DEFAULT_CHILD_PREFIX: &str = "region";

/// Separator used in region paths; reserved in region names.
const PATH_SEPARATOR: char = '/';

static REGION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A stable numeric identifier for a region.
///
/// Unique for the lifetime of the process. Used in logs and debug output;
/// lookups use [`Region::ptr_eq`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

impl RegionId {
    fn next() -> Self {
        Self(REGION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Convert the RegionId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Signal type carrying `(changed_region, structural_change)`.
pub type RegionChangeSignal = Signal<(Region, bool)>;

struct RegionState {
    name: String,
    parent: Weak<RegionInner>,
    children: Vec<Region>,
}

struct RegionInner {
    id: RegionId,
    state: RwLock<RegionState>,
    region_changed: RegionChangeSignal,
}

/// A shared handle to a node in the region hierarchy.
#[derive(Clone)]
pub struct Region {
    inner: Arc<RegionInner>,
}

impl Region {
    fn with_parent(name: String, parent: Weak<RegionInner>) -> Self {
        Self {
            inner: Arc::new(RegionInner {
                id: RegionId::next(),
                state: RwLock::new(RegionState {
                    name,
                    parent,
                    children: Vec::new(),
                }),
                region_changed: Signal::new(),
            }),
        }
    }

    /// Create a new parentless region.
    ///
    /// An empty name gives an unnamed root, displayed as `"/"`.
    pub fn new_root(name: impl Into<String>) -> Self {
        let region = Self::with_parent(name.into(), Weak::new());
        tracing::debug!(target: targets::REGION, id = %region.id(), "created root region");
        region
    }

    /// Returns this region's identifier.
    #[inline]
    pub fn id(&self) -> RegionId {
        self.inner.id
    }

    /// Returns `true` if both handles refer to the same region.
    #[inline]
    pub fn ptr_eq(&self, other: &Region) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the region's name. May be empty for a root.
    pub fn name(&self) -> String {
        self.inner.state.read().name.clone()
    }

    /// Returns the name shown to users: the name, or `"/"` when unnamed.
    pub fn display_name(&self) -> String {
        let state = self.inner.state.read();
        if state.name.is_empty() {
            PATH_SEPARATOR.to_string()
        } else {
            state.name.clone()
        }
    }

    /// Returns the parent region, or `None` for a root or detached region.
    pub fn parent(&self) -> Option<Region> {
        self.inner
            .state
            .read()
            .parent
            .upgrade()
            .map(|inner| Region { inner })
    }

    /// Returns `true` if this region has no (live) parent.
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Returns the number of child regions.
    pub fn child_count(&self) -> usize {
        self.inner.state.read().children.len()
    }

    /// Returns the child at `index`, or `None` if out of range.
    pub fn child(&self, index: usize) -> Option<Region> {
        self.inner.state.read().children.get(index).cloned()
    }

    /// Returns a snapshot of the child list, in order.
    pub fn children(&self) -> Vec<Region> {
        self.inner.state.read().children.clone()
    }

    /// Returns the position of `child` among this region's children.
    pub fn index_of_child(&self, child: &Region) -> Option<usize> {
        self.inner
            .state
            .read()
            .children
            .iter()
            .position(|c| c.ptr_eq(child))
    }

    /// Finds the first direct child with the given name.
    pub fn find_child_by_name(&self, name: &str) -> Option<Region> {
        self.inner
            .state
            .read()
            .children
            .iter()
            .find(|c| c.inner.state.read().name == name)
            .cloned()
    }

    /// Returns the `/`-separated path from the root, e.g. `/Lung-L/Lobe`.
    ///
    /// The root itself is `/`; its name is not part of descendant paths.
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            names.push(current.name());
            current = parent;
        }
        if names.is_empty() {
            return PATH_SEPARATOR.to_string();
        }
        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push(PATH_SEPARATOR);
            path.push_str(name);
            path
        })
    }

    // =========================================================================
    // Structural mutations
    // =========================================================================

    /// Appends a new child named `regionN`, using the smallest free `N >= 1`.
    pub fn create_child(&self) -> Region {
        let child = {
            let mut state = self.inner.state.write();
            let name = (1..)
                .map(|n| format!("{DEFAULT_CHILD_PREFIX}{n}"))
                .find(|candidate| !has_child_named(&state.children, candidate, None))
                .unwrap_or_else(|| DEFAULT_CHILD_PREFIX.to_string());
            let child = Region::with_parent(name, Arc::downgrade(&self.inner));
            state.children.push(child.clone());
            child
        };
        tracing::debug!(
            target: targets::REGION,
            parent = %self.id(),
            child = %child.id(),
            "created child region"
        );
        self.notify_change(true);
        child
    }

    /// Appends a new child with an explicit name.
    ///
    /// Fails without modifying the hierarchy if the name is invalid or
    /// already used by a child of this region.
    pub fn create_named_child(&self, name: impl Into<String>) -> Result<Region> {
        let name = name.into();
        validate_name(&name)?;
        let child = {
            let mut state = self.inner.state.write();
            if has_child_named(&state.children, &name, None) {
                return Err(RegionError::DuplicateName(name).into());
            }
            let child = Region::with_parent(name, Arc::downgrade(&self.inner));
            state.children.push(child.clone());
            child
        };
        tracing::debug!(
            target: targets::REGION,
            parent = %self.id(),
            child = %child.id(),
            "created named child region"
        );
        self.notify_change(true);
        Ok(child)
    }

    /// Removes all child regions.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut self.inner.state.write().children);
        for child in &removed {
            child.inner.state.write().parent = Weak::new();
        }
        tracing::debug!(
            target: targets::REGION,
            id = %self.id(),
            removed = removed.len(),
            "cleared region"
        );
        self.notify_change(true);
    }

    /// Detaches this region (and its subtree) from its parent.
    ///
    /// The parent is reported as the changed region.
    pub fn remove(&self) -> Result<()> {
        let parent = self.parent().ok_or(RegionError::RootRemoval)?;
        parent
            .inner
            .state
            .write()
            .children
            .retain(|c| !c.ptr_eq(self));
        self.inner.state.write().parent = Weak::new();
        tracing::debug!(
            target: targets::REGION,
            id = %self.id(),
            parent = %parent.id(),
            "removed region"
        );
        parent.notify_change(true);
        Ok(())
    }

    // =========================================================================
    // Renaming
    // =========================================================================

    /// Renames the region, returning `false` if the name was rejected.
    ///
    /// See [`try_set_name`](Self::try_set_name) for the validation rules.
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        match self.try_set_name(name) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(target: targets::REGION, id = %self.id(), %err, "rename rejected");
                false
            }
        }
    }

    /// Renames the region.
    ///
    /// The name must be non-empty, must not contain `/`, and must not be used
    /// by a sibling. Renaming to the current name succeeds without emitting a
    /// notification.
    pub fn try_set_name(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        if self.inner.state.read().name == name {
            return Ok(());
        }
        if let Some(parent) = self.parent() {
            let siblings = parent.inner.state.read();
            if has_child_named(&siblings.children, &name, Some(self)) {
                return Err(RegionError::DuplicateName(name).into());
            }
        }
        self.inner.state.write().name = name;
        self.notify_change(false);
        Ok(())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Returns the signal emitted for changes to this region or its descendants.
    pub fn region_changed(&self) -> &RegionChangeSignal {
        &self.inner.region_changed
    }

    /// Subscribes to changes in this region's subtree.
    ///
    /// The slot receives the changed region and whether the change was
    /// structural. Returns an ID for
    /// [`disconnect_region_change`](Self::disconnect_region_change).
    pub fn connect_region_change<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Region, bool) + Send + Sync + 'static,
    {
        self.inner
            .region_changed
            .connect(move |(region, structural)| slot(region, *structural))
    }

    /// Removes a subscription made with
    /// [`connect_region_change`](Self::connect_region_change).
    pub fn disconnect_region_change(&self, id: ConnectionId) -> Result<()> {
        if self.inner.region_changed.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection.into())
        }
    }

    /// Emits `(self, structural)` on this region and every ancestor.
    fn notify_change(&self, structural: bool) {
        let mut chain = vec![self.clone()];
        while let Some(parent) = chain.last().and_then(Region::parent) {
            chain.push(parent);
        }
        tracing::trace!(
            target: targets::REGION,
            id = %self.id(),
            structural,
            depth = chain.len(),
            "region changed"
        );
        for region in &chain {
            region.inner.region_changed.emit((self.clone(), structural));
        }
    }

    /// Returns an indented dump of this subtree, for debugging.
    pub fn dump_tree(&self) -> String {
        RegionTreeDebug::with_options(TreeFormatOptions::detailed()).format_subtree(self)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("id", &self.inner.id)
            .field("name", &self.inner.state.read().name)
            .finish()
    }
}

fn validate_name(name: &str) -> std::result::Result<(), RegionError> {
    if name.is_empty() {
        return Err(RegionError::EmptyName);
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(RegionError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn has_child_named(children: &[Region], name: &str, except: Option<&Region>) -> bool {
    children
        .iter()
        .filter(|c| except.is_none_or(|e| !c.ptr_eq(e)))
        .any(|c| c.inner.state.read().name == name)
}

static_assertions::assert_impl_all!(Region: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LatticeError;
    use parking_lot::Mutex;

    type Events = Arc<Mutex<Vec<(String, bool)>>>;

    fn record(region: &Region) -> Events {
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        region.connect_region_change(move |changed, structural| {
            sink.lock().push((changed.display_name(), structural));
        });
        events
    }

    #[test]
    fn test_unnamed_root_display_name() {
        let root = Region::new_root("");
        assert_eq!(root.name(), "");
        assert_eq!(root.display_name(), "/");
        assert_eq!(root.path(), "/");
        assert!(root.is_root());
    }

    #[test]
    fn test_create_child_generates_unique_names() {
        let root = Region::new_root("Heart");
        let first = root.create_child();
        let second = root.create_child();
        assert_eq!(first.name(), "region1");
        assert_eq!(second.name(), "region2");

        first.remove().unwrap();
        let third = root.create_child();
        assert_eq!(third.name(), "region1");
        assert_eq!(root.child_count(), 2);
    }

    #[test]
    fn test_parent_is_weak() {
        let root = Region::new_root("Heart");
        let child = root.create_child();
        assert!(child.parent().unwrap().ptr_eq(&root));

        drop(root);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_rename_rejects_sibling_collision() {
        let root = Region::new_root("Heart");
        let left = root.create_named_child("Lung-L").unwrap();
        let right = root.create_named_child("Lung-R").unwrap();

        assert_eq!(
            right.try_set_name("Lung-L"),
            Err(LatticeError::Region(RegionError::DuplicateName("Lung-L".into())))
        );
        assert!(!right.set_name("Lung-L"));
        assert_eq!(right.name(), "Lung-R");

        // Same name at a different level is fine
        let lobe = left.create_named_child("Lobe").unwrap();
        assert!(lobe.set_name("Lung-R"));
    }

    #[test]
    fn test_rename_validation() {
        let root = Region::new_root("Heart");
        let child = root.create_child();
        assert_eq!(child.try_set_name(""), Err(LatticeError::Region(RegionError::EmptyName)));
        assert_eq!(
            child.try_set_name("a/b"),
            Err(LatticeError::Region(RegionError::InvalidName("a/b".into())))
        );
        assert_eq!(
            root.create_named_child("region1").unwrap_err(),
            LatticeError::Region(RegionError::DuplicateName("region1".into()))
        );
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_rename_notifies_non_structural() {
        let root = Region::new_root("Heart");
        let child = root.create_child();
        let events = record(&root);

        assert!(child.set_name("Lung-L"));
        assert!(child.set_name("Lung-L")); // unchanged, no notification

        assert_eq!(*events.lock(), vec![("Lung-L".to_string(), false)]);
    }

    #[test]
    fn test_remove_notifies_parent_structural() {
        let root = Region::new_root("Heart");
        let left = root.create_named_child("Lung-L").unwrap();
        root.create_named_child("Lung-R").unwrap();
        let events = record(&root);

        left.remove().unwrap();

        assert_eq!(*events.lock(), vec![("Heart".to_string(), true)]);
        assert_eq!(root.child_count(), 1);
        assert!(left.parent().is_none());
        assert_eq!(root.child(0).unwrap().name(), "Lung-R");
    }

    #[test]
    fn test_remove_root_fails() {
        let root = Region::new_root("Heart");
        assert_eq!(root.remove(), Err(LatticeError::Region(RegionError::RootRemoval)));
    }

    #[test]
    fn test_clear_detaches_children() {
        let root = Region::new_root("Heart");
        let child = root.create_child();
        child.create_child();
        let events = record(&root);

        root.clear();

        assert_eq!(root.child_count(), 0);
        assert!(child.parent().is_none());
        assert_eq!(*events.lock(), vec![("Heart".to_string(), true)]);
    }

    #[test]
    fn test_notifications_bubble_to_ancestors() {
        let root = Region::new_root("Heart");
        let lung = root.create_named_child("Lung-L").unwrap();
        let root_events = record(&root);
        let lung_events = record(&lung);

        let lobe = lung.create_named_child("Lobe").unwrap();
        lobe.create_child();

        assert_eq!(
            *root_events.lock(),
            vec![("Lung-L".to_string(), true), ("Lobe".to_string(), true)]
        );
        assert_eq!(*lung_events.lock(), *root_events.lock());
    }

    #[test]
    fn test_slot_may_mutate_hierarchy() {
        let root = Region::new_root("Heart");
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();
        root.connect_region_change(move |changed, structural| {
            *counter_clone.lock() += 1;
            // Rename the freshly created child from inside the slot
            if structural {
                if let Some(child) = changed.child(0) {
                    let _ = child.try_set_name("renamed");
                }
            }
        });

        let child = root.create_child();
        assert_eq!(child.name(), "renamed");
        assert_eq!(*counter.lock(), 2);
    }

    #[test]
    fn test_disconnect_region_change() {
        let root = Region::new_root("Heart");
        let id = root.connect_region_change(|_, _| {});
        assert_eq!(root.disconnect_region_change(id), Ok(()));
        assert_eq!(
            root.disconnect_region_change(id),
            Err(LatticeError::Signal(SignalError::InvalidConnection))
        );
    }

    #[test]
    fn test_path_and_lookup() {
        let root = Region::new_root("Heart");
        let lung = root.create_named_child("Lung-L").unwrap();
        let lobe = lung.create_named_child("Lobe").unwrap();

        assert_eq!(lobe.path(), "/Lung-L/Lobe");
        assert!(root.find_child_by_name("Lung-L").unwrap().ptr_eq(&lung));
        assert!(root.find_child_by_name("Lobe").is_none());
        assert_eq!(root.index_of_child(&lung), Some(0));
        assert!(lobe.dump_tree().contains("/Lung-L/Lobe"));
    }
}
