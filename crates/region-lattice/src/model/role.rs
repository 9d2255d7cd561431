//! Data roles and values exchanged between a model and its views.
//!
//! A view asks for an item's data under an [`ItemRole`] and gets back an
//! [`ItemData`]. Editors hand values back the same way through
//! [`ItemModel::set_data`](super::ItemModel::set_data).

/// Which aspect of an item is being read or written.
///
/// For region items:
///
/// | Role      | Read                          | Write  |
/// |-----------|-------------------------------|--------|
/// | `Display` | display name (`/` if unnamed) | rename |
/// | `Edit`    | raw name, possibly empty      | rename |
/// | `ToolTip` | full region path              | -      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Text shown in the view.
    Display,
    /// Value placed in an in-place editor.
    Edit,
    /// Hover text.
    ToolTip,
}

impl ItemRole {
    /// Roles whose value changes when an item is renamed.
    pub const RENAME: [ItemRole; 3] = [ItemRole::Display, ItemRole::Edit, ItemRole::ToolTip];

    /// Returns `true` if values written under this role rename the item.
    pub fn is_writable(self) -> bool {
        matches!(self, ItemRole::Display | ItemRole::Edit)
    }
}

/// A value read from or written to a model.
///
/// Reads from a region model are always text. Writes accept any scalar and
/// coerce it with [`to_text`](Self::to_text).
///
/// ```
/// use region_lattice::model::ItemData;
///
/// assert_eq!(ItemData::from("Lung-L").as_string(), Some("Lung-L"));
/// assert_eq!(ItemData::from(3).to_text().as_deref(), Some("3"));
/// assert_eq!(ItemData::None.to_text(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemData {
    /// No value, for unsupported roles and invalid indices.
    #[default]
    None,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ItemData {
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Borrows the text of a `String` value.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Takes the text of a `String` value.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Formats any scalar as text; `None` has no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ItemData::None => None,
            ItemData::String(s) => Some(s.clone()),
            ItemData::Int(n) => Some(n.to_string()),
            ItemData::Float(n) => Some(n.to_string()),
            ItemData::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_owned())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<i32> for ItemData {
    fn from(n: i32) -> Self {
        ItemData::Int(n.into())
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}
