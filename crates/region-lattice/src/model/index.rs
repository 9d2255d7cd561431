//! Model indices.

/// Where an item sits in an [`ItemModel`](super::ItemModel), plus the
/// model's private handle to it.
///
/// Only the model that issued an index can resolve it. Indices are cheap
/// values meant for immediate use: once the model rebuilds the part of its
/// cache an index points into, the model treats that index as invalid.
///
/// The invalid index doubles as "the top level" when passed as a parent.
///
/// ```
/// use region_lattice::model::ModelIndex;
///
/// let index = ModelIndex::with_internal_id(1, 0, 42);
/// assert!(index.is_valid());
/// assert_eq!((index.row(), index.column()), (1, 0));
///
/// assert!(!ModelIndex::invalid().is_valid());
/// assert_eq!(ModelIndex::invalid(), ModelIndex::default());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    position: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Position {
    row: usize,
    column: usize,
    internal_id: u64,
}

impl ModelIndex {
    /// The null index.
    #[inline]
    pub const fn invalid() -> Self {
        Self { position: None }
    }

    /// A valid index carrying a model-specific handle.
    ///
    /// Models call this; views get indices from
    /// [`ItemModel::index`](super::ItemModel::index).
    #[inline]
    pub const fn with_internal_id(row: usize, column: usize, internal_id: u64) -> Self {
        Self {
            position: Some(Position {
                row,
                column,
                internal_id,
            }),
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.position.is_some()
    }

    /// Row within the parent; 0 for the invalid index.
    #[inline]
    pub fn row(&self) -> usize {
        self.position.map_or(0, |p| p.row)
    }

    /// Column within the parent; 0 for the invalid index.
    #[inline]
    pub fn column(&self) -> usize {
        self.position.map_or(0, |p| p.column)
    }

    /// The issuing model's handle; 0 for the invalid index.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.position.map_or(0, |p| p.internal_id)
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(p) => write!(f, "ModelIndex({}, {}, #{})", p.row, p.column, p.internal_id),
            None => f.write_str("ModelIndex(invalid)"),
        }
    }
}
