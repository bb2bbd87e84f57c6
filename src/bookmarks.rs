// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Named views, kept in a small JSON file.
//!
//! The file is an object mapping each name to the four bounds of its
//! window.  Every window is validated again when the file is read.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::planes::ViewWindow;

/// Named views, kept sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkStore {
    views: BTreeMap<String, ViewWindow>,
}

impl BookmarkStore {
    /// An empty store.
    pub fn new() -> BookmarkStore {
        BookmarkStore::default()
    }

    /// Reads a store from `path`.  A missing file is an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BookmarkStore> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(ref err) if err.kind() == ErrorKind::NotFound => {
                debug!("no bookmark file at {}; starting empty", path.display());
                return Ok(BookmarkStore::new());
            }
            Err(err) => return Err(err.into()),
        };
        BookmarkStore::from_json(&text)
    }

    /// Parses a store, re-validating every window.
    pub fn from_json(text: &str) -> Result<BookmarkStore> {
        Ok(serde_json::from_str(text)?)
    }

    /// The store as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the store to `path`, replacing any previous file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("saved {} bookmarks to {}", self.views.len(), path.display());
        Ok(())
    }

    /// Stores `view` under `name`, returning the view it replaced.
    pub fn add(&mut self, name: &str, view: ViewWindow) -> Option<ViewWindow> {
        self.views.insert(name.to_string(), view)
    }

    /// Deletes a bookmark and returns its view.
    pub fn remove(&mut self, name: &str) -> Result<ViewWindow> {
        self.views
            .remove(name)
            .ok_or_else(|| Error::UnknownBookmark(name.to_string()))
    }

    /// The view saved under `name`.
    pub fn get(&self, name: &str) -> Result<ViewWindow> {
        self.views
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownBookmark(name.to_string()))
    }

    /// Bookmarks in name order.
    pub fn list(&self) -> impl Iterator<Item = (&str, &ViewWindow)> {
        self.views.iter().map(|(name, view)| (name.as_str(), view))
    }

    /// Number of bookmarks.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True when there are no bookmarks.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seahorse() -> ViewWindow {
        ViewWindow::new(-0.76, -0.74, 0.09, 0.11).unwrap()
    }

    #[test]
    fn add_get_remove() {
        let mut store = BookmarkStore::new();
        assert!(store.add("seahorse", seahorse()).is_none());
        assert!(store.add("home", ViewWindow::default()).is_none());
        assert_eq!(store.get("seahorse").unwrap(), seahorse());
        let names: Vec<&str> = store.list().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["home", "seahorse"]);

        assert_eq!(store.remove("seahorse").unwrap(), seahorse());
        assert!(matches!(store.get("seahorse"), Err(Error::UnknownBookmark(_))));
        assert!(matches!(store.remove("seahorse"), Err(Error::UnknownBookmark(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        let mut store = BookmarkStore::new();
        store.add("seahorse", seahorse());
        store.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"seahorse\""));
        assert!(text.contains("\"real_min\""));
        assert_eq!(BookmarkStore::load(&path).unwrap(), store);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = BookmarkStore::load(dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn inverted_window_in_file_is_rejected() {
        let text = r#"{"bad": {"real_min": 1.0, "real_max": -1.0, "imag_min": -1.0, "imag_max": 1.0}}"#;
        assert!(matches!(
            BookmarkStore::from_json(text),
            Err(Error::Bookmark(_))
        ));
        assert!(BookmarkStore::from_json("not json").is_err());
    }
}
