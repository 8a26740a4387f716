/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Represents an absolute path inside the RAM file system, always starting
/// with `/`.
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct PathName(String);

/// File or directory name (a single path segment).
pub type Name = String;

impl Display for PathName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathName {
    fn from(value: &str) -> Self {
        PathName(value.to_owned())
    }
}

impl From<String> for PathName {
    fn from(value: String) -> Self {
        PathName(value)
    }
}

impl PathName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.segments().is_empty()
    }

    /// Splits the raw text into name segments, normalizing away the leading
    /// and trailing slash and collapsing any run of `/` in between.
    ///
    /// This is the ordered-sequence-of-segments representation the original
    /// design notes recommend in place of a linked chain with a
    /// directory/filename duality per segment.
    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Splits the path into its parent's segments and its terminal name.
    /// Returns `None` for the root path, which has no parent or name.
    pub fn split(&self) -> Option<(Vec<&str>, &str)> {
        let segments = self.segments();
        let (name, parent) = segments.split_last()?;
        Some((parent.to_vec(), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_segments() {
        let p: PathName = "/".into();
        assert!(p.segments().is_empty());
        assert!(p.is_root());
    }

    #[test]
    fn segments_collapse_slashes() {
        let p: PathName = "/a//b/c/".into();
        assert_eq!(p.segments(), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_yields_parent_and_name() {
        let p: PathName = "/a/b/c".into();
        let (parent, name) = p.split().unwrap();
        assert_eq!(parent, vec!["a", "b"]);
        assert_eq!(name, "c");
    }

    #[test]
    fn split_of_top_level_file_has_empty_parent() {
        let p: PathName = "/hello.txt".into();
        let (parent, name) = p.split().unwrap();
        assert!(parent.is_empty());
        assert_eq!(name, "hello.txt");
    }

    #[test]
    fn split_of_root_is_none() {
        let p: PathName = "/".into();
        assert!(p.split().is_none());
    }
}
