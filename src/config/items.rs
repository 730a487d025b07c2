//! Line-oriented item lists (`lists/*.txt`).
//!
//! One identifier per line. Blank lines, `#` comments and lines carrying
//! [`IGNORE_MARKER`] are skipped; everything else is trimmed and kept in
//! source order, duplicates included.
use std::path::Path;

use crate::error::ItemListError;

/// Lines containing this marker are excluded from the list.
pub const IGNORE_MARKER: &str = "--- IGNORE ---";

/// A parsed item list document.
///
/// Holds the source text; [`ItemList::iter`] walks it lazily and can be
/// called any number of times.
///
/// # Examples
///
/// ```
/// use devstrap::config::items::ItemList;
///
/// let list = ItemList::parse("foo\n# comment\n\nbar\n");
/// assert_eq!(list.to_vec(), ["foo", "bar"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemList {
    source: String,
}

impl ItemList {
    /// Wrap document text.
    #[must_use]
    pub fn parse(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read the list at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ItemListError::Missing`] when the file does not exist, so
    /// callers can tell an absent list apart from an empty one, and
    /// [`ItemListError::Io`] when it cannot be read.
    pub fn load(path: &Path) -> Result<Self, ItemListError> {
        if !path.exists() {
            return Err(ItemListError::Missing {
                path: path.to_path_buf(),
            });
        }
        std::fs::read_to_string(path)
            .map(Self::parse)
            .map_err(|source| ItemListError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Iterate the items in source order.
    #[must_use]
    pub fn iter(&self) -> Items<'_> {
        Items {
            lines: self.source.lines(),
        }
    }

    /// Collect the items into owned strings.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    /// Whether the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a str;
    type IntoIter = Items<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the items of an [`ItemList`].
#[derive(Debug, Clone)]
pub struct Items<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Iterator for Items<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.lines.by_ref().map(str::trim).find(|line| {
            !line.is_empty() && !line.starts_with('#') && !line.contains(IGNORE_MARKER)
        })
    }
}
