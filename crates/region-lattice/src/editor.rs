//! Region editor controller.
//!
//! [`RegionEditor`] is the non-visual half of a region tree panel. It owns a
//! [`RegionTreeModel`], subscribes to the root region's change notifications,
//! tracks the current selection and exposes the add/clear/remove commands of
//! the panel's context menu.
//!
//! # Example
//!
//! ```
//! use region_lattice::editor::{EditorConfig, RegionEditor};
//! use region_lattice::model::ItemModel;
//! use region_lattice_core::Region;
//!
//! let root = Region::new_root("Heart");
//! let editor = RegionEditor::with_config(
//!     EditorConfig::default().with_confirm_destructive_edits(false),
//! );
//! editor.set_root_region(&root);
//! editor.region_selected().connect(|region| println!("selected {}", region.path()));
//!
//! assert!(editor.set_current_region(&root));
//! let child = editor.add_child_region().unwrap();
//!
//! // The new child's parent is reported as changed and becomes current
//! assert!(editor.current_region().unwrap().ptr_eq(&root));
//! assert_eq!(editor.model().row_count(&editor.current_index()), 1);
//! assert!(editor.set_current_region(&child));
//! assert!(editor.remove_region());
//! assert_eq!(root.child_count(), 0);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use region_lattice_core::logging::targets;
use region_lattice_core::{ConnectionId, Region, Signal};

use crate::model::{ModelIndex, RegionModelConfig, RegionTreeModel};

/// Window title used for destructive edit confirmations.
pub const CONFIRM_TITLE: &str = "Please confirm";

/// Configuration for a [`RegionEditor`].
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Ask the confirmation handler before clearing or removing a region.
    pub confirm_destructive_edits: bool,
    /// Make the changed region current after a structural change.
    pub select_changed_region: bool,
    /// Configuration for the owned model.
    pub model: RegionModelConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            confirm_destructive_edits: true,
            select_changed_region: true,
            model: RegionModelConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Sets whether clear/remove require confirmation.
    pub fn with_confirm_destructive_edits(mut self, confirm: bool) -> Self {
        self.confirm_destructive_edits = confirm;
        self
    }

    /// Sets whether structural changes move the selection.
    pub fn with_select_changed_region(mut self, select: bool) -> Self {
        self.select_changed_region = select;
        self
    }

    /// Sets the model configuration.
    pub fn with_model(mut self, model: RegionModelConfig) -> Self {
        self.model = model;
        self
    }
}

/// A request to confirm a destructive edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    /// Dialog title.
    pub title: String,
    /// Question shown to the user.
    pub message: String,
}

impl ConfirmRequest {
    fn clear(region: &Region) -> Self {
        Self {
            title: CONFIRM_TITLE.to_string(),
            message: format!(
                "Clear region {} and remove its sub-regions?",
                region.display_name()
            ),
        }
    }

    fn remove(region: &Region) -> Self {
        Self {
            title: CONFIRM_TITLE.to_string(),
            message: format!(
                "Remove region {} and all its sub-regions?",
                region.display_name()
            ),
        }
    }
}

type ConfirmHandler = Arc<dyn Fn(&ConfirmRequest) -> bool + Send + Sync>;

struct EditorShared {
    model: RegionTreeModel,
    config: EditorConfig,
    current: RwLock<Option<Region>>,
    subscription: Mutex<Option<(Region, ConnectionId)>>,
    confirm_handler: RwLock<Option<ConfirmHandler>>,
    region_selected: Signal<Region>,
}

impl EditorShared {
    fn on_region_change(&self, changed: &Region, structural: bool) {
        if !structural {
            self.model.region_data_changed(changed);
            return;
        }

        tracing::debug!(
            target: targets::EDITOR,
            region = %changed.path(),
            "structural change"
        );
        self.model.reconstruct_region_tree(changed);

        if self.config.select_changed_region && self.model.region_index(changed).is_valid() {
            *self.current.write() = Some(changed.clone());
            self.region_selected.emit(changed.clone());
        }
    }
}

/// Controller binding a region hierarchy to a tree model and a selection.
///
/// The editor reacts to every change under its root region: structural
/// changes rebuild the affected part of the model and select the changed
/// region, renames refresh the affected row.
pub struct RegionEditor {
    shared: Arc<EditorShared>,
}

impl Default for RegionEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionEditor {
    /// Creates an editor with no root region.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: EditorConfig) -> Self {
        let model = RegionTreeModel::with_config(None, config.model.clone());
        Self {
            shared: Arc::new(EditorShared {
                model,
                config,
                current: RwLock::new(None),
                subscription: Mutex::new(None),
                confirm_handler: RwLock::new(None),
                region_selected: Signal::new(),
            }),
        }
    }

    /// Returns the editor configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.shared.config
    }

    /// Returns the model driving the tree view.
    pub fn model(&self) -> &RegionTreeModel {
        &self.shared.model
    }

    /// Signal emitted with the region a user or a structural change selected.
    pub fn region_selected(&self) -> &Signal<Region> {
        &self.shared.region_selected
    }

    /// Returns the root region being edited.
    pub fn root_region(&self) -> Option<Region> {
        self.shared.model.root_region()
    }

    /// Starts editing the hierarchy under `root`.
    ///
    /// Any previous root is unsubscribed, the model is rebuilt and the
    /// selection is cleared.
    pub fn set_root_region(&self, root: &Region) {
        self.unsubscribe();

        let weak: Weak<EditorShared> = Arc::downgrade(&self.shared);
        let id = root.connect_region_change(move |changed, structural| {
            if let Some(shared) = weak.upgrade() {
                shared.on_region_change(changed, structural);
            }
        });
        *self.shared.subscription.lock() = Some((root.clone(), id));
        *self.shared.current.write() = None;

        self.shared.model.set_root_region(root);
        tracing::debug!(target: targets::EDITOR, root = %root.display_name(), "editing new root");
    }

    fn unsubscribe(&self) {
        let previous = self.shared.subscription.lock().take();
        if let Some((region, id)) = previous
            && let Err(err) = region.disconnect_region_change(id)
        {
            tracing::warn!(target: targets::EDITOR, %err, "failed to drop region subscription");
        }
    }

    /// Installs the hook asked before clearing or removing a region.
    ///
    /// The hook returns `true` to proceed. While confirmation is enabled and
    /// no hook is installed, destructive edits are declined.
    pub fn set_confirm_handler<F>(&self, handler: F)
    where
        F: Fn(&ConfirmRequest) -> bool + Send + Sync + 'static,
    {
        *self.shared.confirm_handler.write() = Some(Arc::new(handler));
    }

    /// Index of the current region, or invalid if nothing is selected.
    pub fn current_index(&self) -> ModelIndex {
        match &*self.shared.current.read() {
            Some(region) => self.shared.model.region_index(region),
            None => ModelIndex::invalid(),
        }
    }

    /// The current region, if it is still shown by the model.
    pub fn current_region(&self) -> Option<Region> {
        self.shared
            .current
            .read()
            .clone()
            .filter(|region| self.shared.model.region_index(region).is_valid())
    }

    /// Selects the region at `index`, as a click in the view would.
    ///
    /// Returns `false` for invalid or stale indices.
    pub fn select_index(&self, index: &ModelIndex) -> bool {
        let Some(region) = self.shared.model.region_at_index(index) else {
            return false;
        };
        self.select(region);
        true
    }

    /// Selects `region` if the model shows it.
    pub fn set_current_region(&self, region: &Region) -> bool {
        if !self.shared.model.region_index(region).is_valid() {
            return false;
        }
        self.select(region.clone());
        true
    }

    fn select(&self, region: Region) {
        tracing::trace!(target: targets::EDITOR, region = %region.path(), "region selected");
        *self.shared.current.write() = Some(region.clone());
        self.shared.region_selected.emit(region);
    }

    /// Creates a default-named child of the current region.
    pub fn add_child_region(&self) -> Option<Region> {
        let region = self.current_region()?;
        Some(region.create_child())
    }

    /// Removes all children of the current region, after confirmation.
    pub fn clear_region(&self) -> bool {
        let Some(region) = self.current_region() else {
            return false;
        };
        if !self.confirm(&ConfirmRequest::clear(&region)) {
            return false;
        }
        region.clear();
        true
    }

    /// Removes the current region and its subtree, after confirmation.
    ///
    /// The root region cannot be removed.
    pub fn remove_region(&self) -> bool {
        let Some(region) = self.current_region() else {
            return false;
        };
        if region.is_root() {
            tracing::warn!(target: targets::EDITOR, "refusing to remove the root region");
            return false;
        }
        if !self.confirm(&ConfirmRequest::remove(&region)) {
            return false;
        }
        match region.remove() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: targets::EDITOR, %err, "remove failed");
                false
            }
        }
    }

    fn confirm(&self, request: &ConfirmRequest) -> bool {
        if !self.shared.config.confirm_destructive_edits {
            return true;
        }
        let handler = self.shared.confirm_handler.read().clone();
        let accepted = handler.is_some_and(|handler| handler(request));
        tracing::debug!(
            target: targets::EDITOR,
            message = %request.message,
            accepted,
            "destructive edit confirmation"
        );
        accepted
    }
}

impl Drop for RegionEditor {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for RegionEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionEditor")
            .field("model", &self.shared.model)
            .field("current", &*self.shared.current.read())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(RegionEditor: Send, Sync);
