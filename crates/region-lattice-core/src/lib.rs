//! Core systems for Region Lattice.
//!
//! This crate provides the foundational components underneath the region
//! tree model:
//!
//! - **Region Hierarchy**: Named regions with owned children, weak parent
//!   links, structural edits, and sibling-unique renaming
//! - **Signal/Slot System**: Type-safe, synchronous change notification
//! - **Logging**: `tracing` targets and region tree debug output
//!
//! # Region Example
//!
//! ```
//! use region_lattice_core::Region;
//!
//! let root = Region::new_root("Heart");
//! let left = root.create_named_child("Lung-L").unwrap();
//! root.create_named_child("Lung-R").unwrap();
//!
//! // Sibling names are unique
//! assert!(!left.set_name("Lung-R"));
//!
//! // Removing a region reports a structural change on its parent
//! root.connect_region_change(|region, structural| {
//!     assert_eq!(region.display_name(), "Heart");
//!     assert!(structural);
//! });
//! left.remove().unwrap();
//! assert_eq!(root.child_count(), 1);
//! ```
//!
//! # Signal/Slot Example
//!
//! ```
//! use region_lattice_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod region;
pub mod signal;

pub use error::{LatticeError, RegionError, Result, SignalError};
pub use logging::{PerfSpan, RegionTreeDebug, TreeFormatOptions, TreeStyle};
pub use region::{Region, RegionChangeSignal, RegionId};
pub use signal::{ConnectionId, Signal};
