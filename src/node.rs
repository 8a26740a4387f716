/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::handle::HandleId;
use crate::pathname::Name;

pub type FileRef = Rc<RefCell<FileNode>>;
pub type DirRef = Rc<RefCell<DirNode>>;

/// A file: an owned name, an owned byte buffer (empty iff size is zero) and
/// the set of handles currently open on it.
///
/// A file may be unlinked only once `handles` is empty.
#[derive(Debug)]
pub struct FileNode {
    pub name: Name,
    pub data: Vec<u8>,
    pub handles: HashSet<HandleId>,
}

impl FileNode {
    pub fn new(name: Name) -> Self {
        FileNode {
            name,
            data: Vec::new(),
            handles: HashSet::new(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A directory: an owned name plus front-insertion ordered sequences of
/// child files and child subdirectories.
///
/// Children are pushed to the front on creation, so front-to-back traversal
/// (as `readdir` performs) yields reverse-creation order.
#[derive(Debug)]
pub struct DirNode {
    pub name: Name,
    pub files: VecDeque<FileRef>,
    pub subdirs: VecDeque<DirRef>,
}

impl DirNode {
    pub fn new(name: Name) -> Self {
        DirNode {
            name,
            files: VecDeque::new(),
            subdirs: VecDeque::new(),
        }
    }

    pub fn root() -> DirRef {
        Rc::new(RefCell::new(DirNode::new("/".to_owned())))
    }

    pub fn find_subdir(&self, name: &str) -> Option<DirRef> {
        self.subdirs
            .iter()
            .find(|d| d.borrow().name == name)
            .cloned()
    }

    pub fn find_file(&self, name: &str) -> Option<FileRef> {
        self.files.iter().find(|f| f.borrow().name == name).cloned()
    }

    /// Whether any direct child (file or subdirectory) already bears `name`.
    pub fn name_exists(&self, name: &str) -> bool {
        self.find_file(name).is_some() || self.find_subdir(name).is_some()
    }
}
