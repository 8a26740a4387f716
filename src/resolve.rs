/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Name resolution: walks a parsed path (an ordered sequence of segments)
//! from a starting directory.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{RamFsError, Result};
use crate::node::{DirNode, DirRef, FileNode, FileRef};
use crate::pathname::PathName;

/// Finds the file named by `segments`, starting the walk at `start`.
pub fn find_file(start: &DirRef, segments: &[&str]) -> Option<FileRef> {
    match segments {
        [] => None,
        [&name] => start.borrow().find_file(name),
        [&head, rest @ ..] => {
            let sub = start.borrow().find_subdir(head)?;
            find_file(&sub, rest)
        }
    }
}

/// Finds the directory named by `segments`, starting the walk at `start`.
/// An empty `segments` resolves to `start` itself.
pub fn find_dir(start: &DirRef, segments: &[&str]) -> Option<DirRef> {
    match segments {
        [] => Some(start.clone()),
        [&head, rest @ ..] => {
            let sub = start.borrow().find_subdir(head)?;
            find_dir(&sub, rest)
        }
    }
}

/// Creates a file along `segments`, requiring every intermediate segment to
/// already name an existing subdirectory (no implicit mkdir-p for files).
pub fn create_file(start: &DirRef, segments: &[&str], path: &PathName) -> Result<FileRef> {
    let (&name, parent_segments) = segments
        .split_last()
        .ok_or_else(|| RamFsError::InvalidPath(path.clone()))?;
    let parent =
        find_dir(start, parent_segments).ok_or_else(|| RamFsError::NotFound(path.clone()))?;
    if parent.borrow().name_exists(name) {
        return Err(RamFsError::NameExists(path.clone()));
    }
    let file_ref = Rc::new(RefCell::new(FileNode::new(name.to_owned())));
    parent.borrow_mut().files.push_front(file_ref.clone());
    Ok(file_ref)
}

/// Creates a directory along `segments`, creating every missing intermediate
/// directory along the way (mkdir-p). Idempotent on the terminal segment.
pub fn create_dir(start: &DirRef, segments: &[&str]) -> Result<DirRef> {
    match segments {
        [] => Ok(start.clone()),
        [&head, rest @ ..] => {
            // Bind the lookup result (an owned `Option<DirRef>`, not a
            // `Ref` guard) before matching on it, so the immutable borrow
            // from `find_subdir` doesn't outlive the statement and collide
            // with the `borrow_mut()` below.
            let existing = start.borrow().find_subdir(head);
            let sub = match existing {
                Some(sub) => sub,
                None => {
                    if start.borrow().find_file(head).is_some() {
                        return Err(RamFsError::NameExists(format!("/{}", head).into()));
                    }
                    let new_dir = Rc::new(RefCell::new(DirNode::new(head.to_owned())));
                    start.borrow_mut().subdirs.push_front(new_dir.clone());
                    new_dir
                }
            };
            create_dir(&sub, rest)
        }
    }
}
