/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use crate::pathname::PathName;

pub type Result<T> = std::result::Result<T, RamFsError>;

/// Error taxonomy for every `Context` operation.
///
/// Every variant maps onto exactly one coarse [`Status`] for callers that only
/// care about the generic file-system-interface classification.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RamFsError {
    #[error("context is invalid (bad magic or already torn down)")]
    InvalidContext,
    #[error("'{0}' is not a file")]
    NotAFile(PathName),
    #[error("'{0}' is not a directory")]
    NotADir(PathName),
    #[error("a node named '{0}' already exists")]
    NameExists(PathName),
    #[error("removing root is forbidden")]
    RootRemovalForbidden,
    #[error("'{0}' not found")]
    NotFound(PathName),
    #[error("'{0}' is not a valid path")]
    InvalidPath(PathName),
    #[error("'{0}' is in use and cannot be unlinked")]
    InUse(PathName),
    #[error("seek produced a negative offset")]
    NegativeSeek,
    #[error("internal invariant violation: {0}")]
    General(String),
}

/// Coarse status classification mirroring the generic file-system-interface
/// vocabulary this core would be mounted behind (`OK` / `ERR_INVALID` /
/// `ERR_NOT_FOUND` / `ERR_GENERAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Invalid,
    NotFound,
    General,
}

impl From<&RamFsError> for Status {
    fn from(err: &RamFsError) -> Self {
        match err {
            RamFsError::InvalidContext
            | RamFsError::NameExists(_)
            | RamFsError::RootRemovalForbidden
            | RamFsError::InvalidPath(_)
            | RamFsError::InUse(_)
            | RamFsError::NegativeSeek => Status::Invalid,
            RamFsError::NotAFile(_) | RamFsError::NotADir(_) | RamFsError::NotFound(_) => {
                Status::NotFound
            }
            RamFsError::General(_) => Status::General,
        }
    }
}

impl RamFsError {
    pub fn status(&self) -> Status {
        Status::from(self)
    }
}
