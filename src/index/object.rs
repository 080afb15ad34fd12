//! Header shared by every catalog object.

use std::fmt;

/// Kind of catalog object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sort {
    Attribute,
    Variable,
    Dimension,
    Type,
    Group,
}

impl Sort {
    /// Global sorts are numbered file-wide, local sorts per container.
    #[inline]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::Dimension | Self::Type | Self::Group)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Variable => "variable",
            Self::Dimension => "dimension",
            Self::Type => "type",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort, name and numeric id of a catalog object.
///
/// The name is stored here and nowhere else; hash tables reach it through
/// the object's position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NcObject {
    pub sort: Sort,
    name: String,
    /// Global id for groups, dimensions and types; position for the rest.
    pub id: usize,
}

impl NcObject {
    pub fn new(sort: Sort, name: impl Into<String>, id: usize) -> Self {
        Self {
            sort,
            name: name.into(),
            id,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only the owning index may rename, it has to rehash the entry.
    pub(crate) fn set_name(&mut self, name: String) -> String {
        std::mem::replace(&mut self.name, name)
    }
}

/// Objects that can live in a [`ListIndex`](super::ListIndex).
pub trait Indexed {
    fn header(&self) -> &NcObject;

    fn header_mut(&mut self) -> &mut NcObject;

    #[inline]
    fn name(&self) -> &str {
        self.header().name()
    }

    #[inline]
    fn id(&self) -> usize {
        self.header().id
    }
}

impl Indexed for NcObject {
    fn header(&self) -> &NcObject {
        self
    }

    fn header_mut(&mut self) -> &mut NcObject {
        self
    }
}
