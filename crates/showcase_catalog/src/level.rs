//! Atomic design levels used to group and order components.

use serde::Serialize;

/// The category a component belongs to. Declaration order is sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum AtomicLevel {
    /// Basic building blocks.
    Atoms,
    /// Small groups of atoms.
    Molecules,
    /// Larger sections built from molecules.
    Organisms,
    /// Page layouts.
    Templates,
    /// Complete pages.
    Pages,
    /// Any other category.
    #[default]
    Unknown,
}

impl AtomicLevel {
    /// All levels in sort order.
    pub const ALL: [Self; 6] = [
        Self::Atoms,
        Self::Molecules,
        Self::Organisms,
        Self::Templates,
        Self::Pages,
        Self::Unknown,
    ];

    /// Reads a category path segment, ignoring case. Unrecognized names map
    /// to [`AtomicLevel::Unknown`].
    #[must_use]
    pub fn from_category(category: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(category.trim()))
            .unwrap_or(Self::Unknown)
    }

    /// Position in the sort order, starting at zero.
    #[must_use]
    pub fn order(self) -> u8 {
        self as u8
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atoms => "Atoms",
            Self::Molecules => "Molecules",
            Self::Organisms => "Organisms",
            Self::Templates => "Templates",
            Self::Pages => "Pages",
            Self::Unknown => "Unknown",
        }
    }
}

impl core::fmt::Display for AtomicLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
