//! Data structures for parsed exports files.
//!
//! This module defines the values the parser produces and their canonical
//! textual rendering. Rendering is done through [`Display`], so
//! `to_string()` yields text the parser accepts again.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Display};

/// A single export option: a key and an optional value.
///
/// An empty value means the option is a plain flag such as `ro`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportOption {
    /// The option name (e.g., "rw", "anonuid").
    pub key: String,
    /// The option value, empty for flags.
    #[serde(default)]
    pub value: String,
}

impl ExportOption {
    /// Creates a new option with the given key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a flag option (no value).
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, String::new())
    }

    /// Returns true if this option carries a value.
    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}

impl Display for ExportOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            f.write_str(&self.key)
        } else {
            write!(f, "{}={}", self.key, self.value)
        }
    }
}

/// One host's access grant to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    /// The exported path, without surrounding quotes.
    pub path: String,
    /// The host pattern (hostname, wildcard, CIDR, `@netgroup`, ...).
    pub machine: String,
    /// Options in source order. Duplicate keys are kept.
    #[serde(default)]
    pub options: Vec<ExportOption>,
}

impl Export {
    /// Creates a new export.
    pub fn new(
        path: impl Into<String>,
        machine: impl Into<String>,
        options: Vec<ExportOption>,
    ) -> Self {
        Self {
            path: path.into(),
            machine: machine.into(),
            options,
        }
    }

    /// Returns the first option with the given key.
    pub fn option(&self, key: &str) -> Option<&ExportOption> {
        self.options.iter().find(|opt| opt.key == key)
    }

    /// Returns true if an option with the given key is present.
    pub fn has_option(&self, key: &str) -> bool {
        self.option(key).is_some()
    }

    /// Returns the machine followed by its rendered option list,
    /// e.g. `master(rw,sync)`.
    pub fn host_literal(&self) -> String {
        format!("{}{}", self.machine, RenderedOptions(&self.options))
    }
}

impl Display for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}",
            render_path(&self.path),
            self.machine,
            RenderedOptions(&self.options)
        )
    }
}

/// Renders `(opt,opt=val)`, or nothing for an empty list.
struct RenderedOptions<'a>(&'a [ExportOption]);

impl Display for RenderedOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, opt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", opt)?;
        }
        f.write_str(")")
    }
}

/// Renders a path, wrapping it in double quotes if it contains a space.
pub fn render_path(path: &str) -> Cow<'_, str> {
    if path.contains(' ') {
        Cow::Owned(format!("\"{}\"", path))
    } else {
        Cow::Borrowed(path)
    }
}

/// Renders several exports of the same path as a single line:
/// `path host1(opts) host2(opts)`.
///
/// All exports must share one path. The path of the first export is the one
/// rendered; exports for other paths would be silently attributed to it,
/// which debug builds reject with a panic. Use [`ExportGroup`] to have the
/// type system keep this precondition. Returns an empty string for an empty
/// slice.
pub fn render_export_group(exports: &[Export]) -> String {
    let Some(first) = exports.first() else {
        return String::new();
    };
    debug_assert!(
        exports.iter().all(|e| e.path == first.path),
        "render_export_group called with exports for different paths"
    );

    let mut out = render_path(&first.path).into_owned();
    for export in exports {
        out.push(' ');
        out.push_str(&export.host_literal());
    }
    out
}

/// The accumulated `-opts` defaults of one logical line.
///
/// Keys are unique; merging a key that already exists replaces the option
/// in place, so its position does not move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultOptions {
    options: Vec<ExportOption>,
}

impl DefaultOptions {
    /// Creates an empty set of defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges new default options into the set.
    pub fn merge(&mut self, changes: impl IntoIterator<Item = ExportOption>) {
        for opt in changes {
            match self.options.iter_mut().find(|o| o.key == opt.key) {
                Some(existing) => *existing = opt,
                None => self.options.push(opt),
            }
        }
    }

    /// Returns an owned copy of the current defaults for one export.
    pub fn snapshot(&self) -> Vec<ExportOption> {
        self.options.clone()
    }

    /// Returns the current defaults.
    pub fn as_slice(&self) -> &[ExportOption] {
        &self.options
    }

    /// Returns true if no defaults have been set.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// All exports for a single path, in the order they were encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportGroup {
    path: String,
    exports: Vec<Export>,
}

impl ExportGroup {
    /// Creates an empty group for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            exports: Vec::new(),
        }
    }

    /// Returns the shared path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the exports of this path.
    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    /// Returns an iterator over the host patterns of this path.
    pub fn machines(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|e| e.machine.as_str())
    }

    /// Appends an export. Returns it back if it belongs to another path.
    pub fn push(&mut self, export: Export) -> Result<(), Export> {
        if export.path != self.path {
            return Err(export);
        }
        self.exports.push(export);
        Ok(())
    }

    /// Consumes the group, returning its exports.
    pub fn into_exports(self) -> Vec<Export> {
        self.exports
    }
}

impl Display for ExportGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_export_group(&self.exports))
    }
}

/// The parsed contents of an exports file: path → ordered exports.
///
/// Paths keep the order of their first appearance. Exports of a path keep
/// the order in which their host entries appeared, across every line that
/// names the path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    groups: Vec<ExportGroup>,
    index: HashMap<String, usize>,
}

impl ExportTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an export to the entry for its path, creating it if absent.
    pub fn push(&mut self, export: Export) {
        let idx = match self.index.get(&export.path) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.index.insert(export.path.clone(), idx);
                self.groups.push(ExportGroup::new(export.path.clone()));
                idx
            }
        };
        self.groups[idx].exports.push(export);
    }

    /// Returns the exports for a path.
    pub fn get(&self, path: &str) -> Option<&[Export]> {
        self.group(path).map(ExportGroup::exports)
    }

    /// Returns the group for a path.
    pub fn group(&self, path: &str) -> Option<&ExportGroup> {
        self.index.get(path).map(|&idx| &self.groups[idx])
    }

    /// Returns true if the table has an entry for the path.
    pub fn contains_path(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Returns an iterator over all paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(ExportGroup::path)
    }

    /// Returns an iterator over all groups.
    pub fn groups(&self) -> impl Iterator<Item = &ExportGroup> {
        self.groups.iter()
    }

    /// Returns an iterator over `(path, exports)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Export])> {
        self.groups.iter().map(|g| (g.path(), g.exports()))
    }

    /// Returns an iterator over every export, grouped by path.
    pub fn exports(&self) -> impl Iterator<Item = &Export> {
        self.groups.iter().flat_map(|g| g.exports.iter())
    }

    /// Returns the number of distinct paths.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if there are no paths.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Converts the table into a plain map.
    pub fn into_map(self) -> HashMap<String, Vec<Export>> {
        self.groups
            .into_iter()
            .map(|g| (g.path, g.exports))
            .collect()
    }
}

impl Extend<Export> for ExportTable {
    fn extend<T: IntoIterator<Item = Export>>(&mut self, iter: T) {
        for export in iter {
            self.push(export);
        }
    }
}

impl FromIterator<Export> for ExportTable {
    fn from_iter<T: IntoIterator<Item = Export>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl IntoIterator for ExportTable {
    type Item = ExportGroup;
    type IntoIter = std::vec::IntoIter<ExportGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl Display for ExportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(f, "{}", group)?;
        }
        Ok(())
    }
}

impl Serialize for ExportTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.path, &group.exports)?;
        }
        map.end()
    }
}
