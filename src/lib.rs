/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! An in-memory, single-agent, POSIX-like hierarchical file system core.
//!
//! [`Context`] is the entry point: [`Context::init`] builds an empty mount,
//! and its methods (`fopen`, `fwrite`, `mkdir`, `readdir`, ...) are the
//! whole operation surface. There is no on-disk persistence and no
//! threading story beyond what a single `&mut Context` already enforces.

pub mod config;
pub mod context;
pub mod error;
pub mod flags;
pub mod handle;
pub mod node;
pub mod pathname;
pub mod resolve;

pub use config::RamFsConfig;
pub use context::{Context, DirEntry};
pub use error::{RamFsError, Result, Status};
pub use flags::OpenFlags;
pub use handle::{DirHandle, FileHandle, HandleId};
pub use pathname::PathName;
