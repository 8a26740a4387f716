/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::rc::Weak;

use crate::flags::OpenFlags;
use crate::node::{DirNode, FileNode};

/// Identifies a live [`FileHandle`] inside its file's handle set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

/// A caller-owned handle on an open file.
///
/// Holds a *weak* back-reference to the file: the directory tree is the
/// only strong owner of file data, so a handle can never keep a file alive
/// past `unlink`, and a forgotten handle after `Context::deinit` simply goes
/// inert (`file.upgrade()` returns `None`) instead of dangling.
#[derive(Debug)]
pub struct FileHandle {
    pub(crate) id: HandleId,
    pub(crate) file: Weak<std::cell::RefCell<FileNode>>,
    pub(crate) mode: OpenFlags,
    pub(crate) attr: u32,
    pub(crate) position: u64,
}

/// A caller-owned handle on an open directory, with independent iteration
/// cursors into the files and subdirectories sequences.
#[derive(Debug)]
pub struct DirHandle {
    pub(crate) dir: Weak<std::cell::RefCell<DirNode>>,
    pub(crate) file_idx: usize,
    pub(crate) subdir_idx: usize,
}
