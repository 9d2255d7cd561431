//! Logging and debugging facilities for Region Lattice.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Debug visualization for region trees
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Region Lattice uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Structural inconsistencies (a change notification for a region that the
//! tree cache no longer contains) are reported at `error` level under the
//! [`targets::MODEL`] target rather than returned to the caller.
//!
//! # Debug Visualization
//!
//! Use [`RegionTreeDebug`] to get a readable view of a region hierarchy:
//!
//! ```
//! use region_lattice_core::{Region, logging::RegionTreeDebug};
//!
//! let root = Region::new_root("Heart");
//! root.create_child();
//! println!("{}", RegionTreeDebug::new().format_subtree(&root));
//! ```

use std::fmt::Write as FmtWrite;

use crate::region::Region;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "region_lattice_core";
    /// Region hierarchy mutations and notifications.
    pub const REGION: &str = "region_lattice_core::region";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "region_lattice_core::signal";
    /// Tree model cache rebuilds and lookups.
    pub const MODEL: &str = "region_lattice::model";
    /// Editor actions and selection.
    pub const EDITOR: &str = "region_lattice::editor";
}

/// Style options for region tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Plain indentation without connectors.
    Compact,
}

/// Configuration for region tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show region IDs.
    pub show_ids: bool,
    /// Whether to show each region's full path.
    pub show_paths: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_paths: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_paths: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_paths: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing region trees.
#[derive(Debug, Clone, Default)]
pub struct RegionTreeDebug {
    options: TreeFormatOptions,
}

impl RegionTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`, one region per line.
    pub fn format_subtree(&self, root: &Region) -> String {
        let mut output = String::new();
        self.format_subtree_into(root, 0, true, &mut output);
        output
    }

    fn format_subtree_into(&self, region: &Region, depth: usize, is_last: bool, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(&region.display_name());

        if self.options.show_ids {
            let _ = write!(output, " [{}]", region.id());
        }
        if self.options.show_paths {
            let _ = write!(output, " ({})", region.path());
        }
        output.push('\n');

        let children = region.children();
        let child_count = children.len();
        for (i, child) in children.iter().enumerate() {
            self.format_subtree_into(child, depth + 1, i + 1 == child_count, output);
        }
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "", ""),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }

        if self.options.style == TreeStyle::Compact {
            prefix.push_str(&" ".repeat(self.options.indent_size));
        } else {
            prefix.push_str(if is_last { corner } else { tee });
            prefix.push(' ');
        }
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time cache rebuilds.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "region_lattice::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
