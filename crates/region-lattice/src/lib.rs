//! Region Lattice - tree model/view synchronization for region hierarchies.
//!
//! This is the main umbrella crate. It re-exports the core region and signal
//! APIs and adds the tree model, the editor controller and document-level
//! bookkeeping.
//!
//! # Example
//!
//! ```
//! use region_lattice::prelude::*;
//!
//! let root = Region::new_root("Heart");
//! root.create_named_child("Lung-L").unwrap();
//! root.create_named_child("Lung-R").unwrap();
//!
//! let editor = RegionEditor::new();
//! editor.set_root_region(&root);
//!
//! let model = editor.model();
//! let heart = model.index(0, 0, &ModelIndex::invalid());
//! let lung_r = model.index(1, 0, &heart);
//! assert_eq!(model.display_text(&lung_r).as_deref(), Some("Lung-R"));
//! ```

pub use region_lattice_core::*;

pub mod editor;
pub mod model;
pub mod prelude;
pub mod workspace;
