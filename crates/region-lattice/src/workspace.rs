//! Application-level document state around a region hierarchy.
//!
//! These are small bookkeeping types an editor application keeps next to its
//! [`RegionEditor`](crate::editor::RegionEditor): the open [`Document`], the
//! list of recently opened files and whether there are unsaved edits.

use std::path::{Path, PathBuf};

use region_lattice_core::logging::targets;
use region_lattice_core::Region;

/// Most-recently-used list of document locations.
///
/// The newest entry is last.
#[derive(Debug, Clone, Default)]
pub struct RecentList {
    entries: Vec<PathBuf>,
    capacity: Option<usize>,
}

impl RecentList {
    /// Creates an unbounded list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list that keeps at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Records `path` as the most recent entry.
    ///
    /// An existing entry for the same path is moved to the end rather than
    /// duplicated. When the list is full the oldest entry is dropped.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|entry| *entry != path);
        self.entries.push(path);
        if let Some(capacity) = self.capacity {
            let excess = self.entries.len().saturating_sub(capacity);
            self.entries.drain(..excess);
        }
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// The newest entry.
    pub fn latest(&self) -> Option<&Path> {
        self.entries.last().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// An open document: a root region plus where it was loaded from.
#[derive(Debug)]
pub struct Document {
    root_region: Region,
    location: Option<PathBuf>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a blank document with an unnamed root region.
    pub fn new() -> Self {
        Self {
            root_region: Region::new_root(""),
            location: None,
        }
    }

    pub fn root_region(&self) -> &Region {
        &self.root_region
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: impl Into<PathBuf>) {
        self.location = Some(location.into());
    }

    /// Replaces the hierarchy with a fresh unnamed root.
    ///
    /// Editors showing the old root must be pointed at the new one with
    /// [`RegionEditor::set_root_region`](crate::editor::RegionEditor::set_root_region).
    pub fn reset(&mut self) -> &Region {
        tracing::debug!(
            target: targets::EDITOR,
            old_root = %self.root_region.id(),
            "document reset"
        );
        self.root_region = Region::new_root("");
        &self.root_region
    }
}

/// Tracks unsaved changes by comparing undo stack positions.
///
/// The tracker only compares indices; it has no undo semantics of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifiedTracker {
    save_index: usize,
    current_index: usize,
}

impl ModifiedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the undo stack position of the last save.
    pub fn set_save_index(&mut self, index: usize) {
        self.save_index = index;
    }

    /// Records the current undo stack position.
    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    /// Marks the current position as saved.
    pub fn mark_saved(&mut self) {
        self.save_index = self.current_index;
    }

    pub fn save_index(&self) -> usize {
        self.save_index
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Returns `true` if the document differs from its saved state.
    pub fn is_modified(&self) -> bool {
        self.save_index != self.current_index
    }
}
