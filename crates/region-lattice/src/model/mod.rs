//! Model/View layer for region hierarchies.
//!
//! This module adapts a [`Region`](region_lattice_core::Region) tree to the
//! generic item model interface that tree views consume.
//!
//! # Core Types
//!
//! - `ModelIndex`: Identifies an item's position in a model
//! - `ItemRole`: Which aspect of an item is read or written
//! - `ItemData`: Scalar value passed between model and view
//! - `ItemModel`: The trait that models implement
//! - `ModelSignals`: Signals for change notifications
//!
//! # Region Model
//!
//! - `RegionTreeItems`: Cache of `RegionTreeItem`s mirroring the hierarchy
//! - `RegionTreeModel`: `ItemModel` over that cache, with targeted rebuilds
//!
//! # Example
//!
//! ```
//! use region_lattice::model::{ItemModel, ModelIndex, RegionTreeModel};
//! use region_lattice_core::Region;
//!
//! let root = Region::new_root("Heart");
//! let left = root.create_named_child("Lung-L").unwrap();
//! let model = RegionTreeModel::new(&root);
//!
//! model.signals().rows_inserted.connect(|(parent, first, last)| {
//!     println!("rows {first}..={last} inserted under {parent:?}");
//! });
//!
//! left.create_child();
//! model.reconstruct_region_tree(&left);
//!
//! let lung_l = model.region_index(&left);
//! assert_eq!(model.row_count(&lung_l), 1);
//! assert_eq!(model.parent(&lung_l), model.index(0, 0, &ModelIndex::invalid()));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  region_changed  ┌──────────────────┐     ┌─────────────┐
//! │   Region    │─────────────────>│ RegionTreeModel  │────>│    View     │
//! │  hierarchy  │                  │ (RegionTreeItems)│     │             │
//! └─────────────┘                  └──────────────────┘     └─────────────┘
//!       ^                                    │                     │
//!       │ set_data (rename)                  │  ModelIndex         │
//!       └────────────────────────────────────┴─────────────────────┘
//! ```

mod index;
mod region_item;
mod region_model;
mod role;
mod traits;

pub use index::ModelIndex;
pub use region_item::{ItemKey, RegionTreeItem, RegionTreeItems};
pub use region_model::{MissingRegionPolicy, RegionModelConfig, RegionTreeModel};
pub use role::{ItemData, ItemRole};
pub use traits::{ItemFlags, ItemModel, ModelSignals};
