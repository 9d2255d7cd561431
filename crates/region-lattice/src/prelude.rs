//! Prelude module for Region Lattice.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use region_lattice::prelude::*;
//! ```

// ============================================================================
// Regions and Signals
// ============================================================================

pub use crate::region::{Region, RegionId};
pub use crate::signal::{ConnectionId, Signal};
pub use crate::{LatticeError, RegionError};

// ============================================================================
// Model/View
// ============================================================================

pub use crate::model::{
    ItemData, ItemFlags, ItemModel, ItemRole, MissingRegionPolicy, ModelIndex, RegionModelConfig,
    RegionTreeModel,
};

// ============================================================================
// Editor and Workspace
// ============================================================================

pub use crate::editor::{ConfirmRequest, EditorConfig, RegionEditor};
pub use crate::workspace::{Document, ModifiedTracker, RecentList};
