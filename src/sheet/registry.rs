//! Registry of every sheet an application created.

use log::debug;

use super::sheet::{SheetId, StyleSheet};
use crate::style::CssOptions;

/// Ordered set of style sheets, used for global enumeration.
///
/// Sheets are kept in the order they were added; [`SheetRegistry::to_css`]
/// emits them in that order. Nothing else in the crate depends on the
/// registry, so a standalone one is as good as the one inside a
/// [`StyleEngine`](crate::StyleEngine).
///
/// # Example
///
/// ```rust
/// use stylekit::{SheetOptions, SheetRegistry, StyleSheet};
///
/// let mut registry = SheetRegistry::new();
/// let id = registry.add(StyleSheet::new(SheetOptions::new()));
/// assert_eq!(registry.len(), 1);
/// assert!(registry.get(id).is_some());
/// ```
#[derive(Debug, Default)]
pub struct SheetRegistry {
    sheets: Vec<StyleSheet>,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a sheet and returns its id.
    pub fn add(&mut self, sheet: StyleSheet) -> SheetId {
        let id = sheet.id();
        debug!("registered {}", id);
        self.sheets.push(sheet);
        id
    }

    /// Removes a sheet, handing it back to the caller.
    pub fn remove(&mut self, id: SheetId) -> Option<StyleSheet> {
        let pos = self.sheets.iter().position(|sheet| sheet.id() == id)?;
        debug!("unregistered {}", id);
        Some(self.sheets.remove(pos))
    }

    pub fn get(&self, id: SheetId) -> Option<&StyleSheet> {
        self.sheets.iter().find(|sheet| sheet.id() == id)
    }

    pub fn get_mut(&mut self, id: SheetId) -> Option<&mut StyleSheet> {
        self.sheets.iter_mut().find(|sheet| sheet.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleSheet> {
        self.sheets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StyleSheet> {
        self.sheets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Drops every sheet. Render targets are left as they are.
    pub fn clear(&mut self) {
        self.sheets.clear();
    }

    /// CSS text of all sheets, separated by newlines.
    pub fn to_css(&self) -> String {
        self.join_css(|_| true)
    }

    /// CSS text of the attached sheets only.
    pub fn to_css_attached(&self) -> String {
        self.join_css(StyleSheet::is_attached)
    }

    fn join_css(&self, include: impl Fn(&StyleSheet) -> bool) -> String {
        let options = CssOptions::default();
        self.sheets
            .iter()
            .filter(|sheet| include(*sheet))
            .map(|sheet| sheet.to_css(&options))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a SheetRegistry {
    type Item = &'a StyleSheet;
    type IntoIter = std::slice::Iter<'a, StyleSheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}
