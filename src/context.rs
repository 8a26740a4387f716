/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The operation surface: every entry point a mounted RAMFS exposes to a
//! caller, built on top of the node model, the handle layer and the name
//! resolver.

use std::cell::Cell;
use std::io::SeekFrom;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::RamFsConfig;
use crate::error::{RamFsError, Result};
use crate::flags::{OpenFlags, ATTR_DIR, ATTR_FILE};
use crate::handle::{DirHandle, FileHandle, HandleId};
use crate::node::DirNode;
use crate::pathname::PathName;
use crate::resolve;

/// A directory entry as returned by `readdir`/`stat`: name, size (0 for
/// directories), the generic file-system-interface attribute byte (`0x10`
/// for directory, `0` for file) and a modification time that is always `0`
/// since this core does not track timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
    pub attr: u8,
    pub mtime: u64,
}

/// Per-mount state. Owns the directory tree; every operation hangs off it.
pub struct Context {
    magic: u32,
    root: Rc<std::cell::RefCell<DirNode>>,
    config: RamFsConfig,
    next_handle_id: Cell<u64>,
}

impl Context {
    pub(crate) const MAGIC: u32 = 0x5241_4D46; // ASCII "RAMF"

    /// Builds a fresh, empty mount. `config` is stored for introspection but
    /// not consulted by any operation below.
    pub fn init(config: RamFsConfig) -> Context {
        debug!("init ramfs context, label='{}'", config.label);
        Context {
            magic: Self::MAGIC,
            root: DirNode::root(),
            config,
            next_handle_id: Cell::new(0),
        }
    }

    /// Recursively frees the whole tree. Any `FileHandle`/`DirHandle` the
    /// caller forgot to close simply goes inert (its `Weak` no longer
    /// upgrades) rather than dangling.
    pub fn deinit(self) {
        debug!("deinit ramfs context, label='{}'", self.config.label);
    }

    pub fn context_is_valid(&self) -> bool {
        self.magic == Self::MAGIC
    }

    pub fn config(&self) -> &RamFsConfig {
        &self.config
    }

    fn check_valid(&self) -> Result<()> {
        if self.context_is_valid() {
            Ok(())
        } else {
            Err(RamFsError::InvalidContext)
        }
    }

    fn alloc_handle_id(&self) -> HandleId {
        let id = self.next_handle_id.get();
        self.next_handle_id.set(id + 1);
        HandleId(id)
    }

    // ---- file operations -------------------------------------------------

    pub fn fopen(&mut self, path: &str, mode: OpenFlags, attr: u32) -> Result<FileHandle> {
        self.check_valid()?;
        let pathname: PathName = path.into();
        let segments = pathname.segments();
        let file_ref = match resolve::find_file(&self.root, &segments) {
            Some(f) => f,
            None => {
                if resolve::find_dir(&self.root, &segments).is_some() {
                    return Err(RamFsError::NotAFile(pathname));
                }
                if mode.contains(OpenFlags::O_CREAT) || mode.contains(OpenFlags::O_WRONLY) {
                    resolve::create_file(&self.root, &segments, &pathname)?
                } else {
                    return Err(RamFsError::NotFound(pathname));
                }
            }
        };
        if mode.contains(OpenFlags::O_TRUNC) {
            file_ref.borrow_mut().data.clear();
        }
        let position = if mode.contains(OpenFlags::O_APPEND) {
            file_ref.borrow().size()
        } else {
            0
        };
        let id = self.alloc_handle_id();
        file_ref.borrow_mut().handles.insert(id);
        debug!("fopen '{}' -> {:?} (position={})", pathname, id, position);
        Ok(FileHandle {
            id,
            file: Rc::downgrade(&file_ref),
            mode,
            attr,
            position,
        })
    }

    pub fn fclose(&mut self, handle: FileHandle) -> Result<()> {
        self.check_valid()?;
        if let Some(file_ref) = handle.file.upgrade() {
            file_ref.borrow_mut().handles.remove(&handle.id);
        }
        Ok(())
    }

    pub fn fread(&mut self, handle: &mut FileHandle, buf: &mut [u8]) -> Result<usize> {
        self.check_valid()?;
        let file_ref = handle.file.upgrade().ok_or(RamFsError::InvalidContext)?;
        let n = {
            let file = file_ref.borrow();
            let size = file.size();
            if handle.position >= size {
                0
            } else {
                let start = handle.position as usize;
                let avail = size as usize - start;
                let n = buf.len().min(avail);
                buf[..n].copy_from_slice(&file.data[start..start + n]);
                n
            }
        };
        handle.position += n as u64;
        Ok(n)
    }

    pub fn fwrite(&mut self, handle: &mut FileHandle, buf: &[u8]) -> Result<usize> {
        self.check_valid()?;
        let file_ref = handle.file.upgrade().ok_or(RamFsError::InvalidContext)?;
        {
            let mut file = file_ref.borrow_mut();
            let start = handle.position as usize;
            let end = start + buf.len();
            if end > file.data.len() {
                file.data.resize(end, 0);
            }
            file.data[start..end].copy_from_slice(buf);
        }
        handle.position += buf.len() as u64;
        Ok(buf.len())
    }

    pub fn lseek(&self, handle: &mut FileHandle, pos: SeekFrom) -> Result<u64> {
        self.check_valid()?;
        let file_ref = handle.file.upgrade().ok_or(RamFsError::InvalidContext)?;
        let size = file_ref.borrow().size() as i64;
        let new_pos = match pos {
            SeekFrom::Start(base) => base as i64,
            SeekFrom::Current(offset) => handle.position as i64 + offset,
            SeekFrom::End(offset) => size + offset,
        };
        if new_pos < 0 {
            return Err(RamFsError::NegativeSeek);
        }
        handle.position = new_pos as u64;
        Ok(handle.position)
    }

    pub fn tell(&self, handle: &FileHandle) -> u64 {
        handle.position
    }

    pub fn eof(&self, handle: &FileHandle) -> Result<bool> {
        self.check_valid()?;
        let file_ref = handle.file.upgrade().ok_or(RamFsError::InvalidContext)?;
        Ok(handle.position >= file_ref.borrow().size())
    }

    pub fn fsize(&self, handle: &FileHandle) -> Result<u64> {
        self.check_valid()?;
        let file_ref = handle.file.upgrade().ok_or(RamFsError::InvalidContext)?;
        Ok(file_ref.borrow().size())
    }

    pub fn getc(&mut self, handle: &mut FileHandle) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        let n = self.fread(handle, &mut buf)?;
        Ok(if n == 0 { None } else { Some(buf[0]) })
    }

    pub fn putc(&mut self, handle: &mut FileHandle, byte: u8) -> Result<()> {
        self.fwrite(handle, &[byte])?;
        Ok(())
    }

    // ---- directory operations ---------------------------------------------

    pub fn opendir(&self, path: &str) -> Result<DirHandle> {
        self.check_valid()?;
        let pathname: PathName = path.into();
        let segments = pathname.segments();
        let dir = match resolve::find_dir(&self.root, &segments) {
            Some(d) => d,
            None => {
                if resolve::find_file(&self.root, &segments).is_some() {
                    return Err(RamFsError::NotADir(pathname));
                }
                return Err(RamFsError::NotFound(pathname));
            }
        };
        Ok(DirHandle {
            dir: Rc::downgrade(&dir),
            file_idx: 0,
            subdir_idx: 0,
        })
    }

    pub fn readdir(&self, handle: &mut DirHandle) -> Result<DirEntry> {
        self.check_valid()?;
        let dir_ref = handle.dir.upgrade().ok_or(RamFsError::InvalidContext)?;
        let dir = dir_ref.borrow();
        if handle.file_idx < dir.files.len() {
            let file = dir.files[handle.file_idx].borrow();
            let entry = DirEntry {
                name: file.name.clone(),
                size: file.size(),
                attr: ATTR_FILE,
                mtime: 0,
            };
            handle.file_idx += 1;
            return Ok(entry);
        }
        if handle.subdir_idx < dir.subdirs.len() {
            let sub = dir.subdirs[handle.subdir_idx].borrow();
            let entry = DirEntry {
                name: sub.name.clone(),
                size: 0,
                attr: ATTR_DIR,
                mtime: 0,
            };
            handle.subdir_idx += 1;
            return Ok(entry);
        }
        Err(RamFsError::NotFound("<end of directory>".into()))
    }

    pub fn closedir(&self, _handle: DirHandle) -> Result<()> {
        self.check_valid()
    }

    // ---- name-space operations ---------------------------------------------

    pub fn stat(&self, path: &str) -> Result<DirEntry> {
        self.check_valid()?;
        let pathname: PathName = path.into();
        if pathname.is_root() {
            return Ok(DirEntry {
                name: "/".to_owned(),
                size: 0,
                attr: ATTR_DIR,
                mtime: 0,
            });
        }
        let segments = pathname.segments();
        if let Some(file) = resolve::find_file(&self.root, &segments) {
            let f = file.borrow();
            return Ok(DirEntry {
                name: f.name.clone(),
                size: f.size(),
                attr: ATTR_FILE,
                mtime: 0,
            });
        }
        if let Some(dir) = resolve::find_dir(&self.root, &segments) {
            let d = dir.borrow();
            return Ok(DirEntry {
                name: d.name.clone(),
                size: 0,
                attr: ATTR_DIR,
                mtime: 0,
            });
        }
        Err(RamFsError::NotFound(pathname))
    }

    pub fn unlink(&mut self, path: &str) -> Result<()> {
        self.check_valid()?;
        let pathname: PathName = path.into();
        if pathname.is_root() {
            return Err(RamFsError::RootRemovalForbidden);
        }
        let segments = pathname.segments();
        let (&name, parent_segments) = segments
            .split_last()
            .ok_or_else(|| RamFsError::InvalidPath(pathname.clone()))?;
        let parent = resolve::find_dir(&self.root, parent_segments)
            .ok_or_else(|| RamFsError::NotFound(pathname.clone()))?;
        let file = parent
            .borrow()
            .find_file(name)
            .ok_or_else(|| RamFsError::NotFound(pathname.clone()))?;
        if !file.borrow().handles.is_empty() {
            warn!("unlink '{}' refused: file still has open handles", pathname);
            return Err(RamFsError::InUse(pathname));
        }
        parent.borrow_mut().files.retain(|f| !Rc::ptr_eq(f, &file));
        Ok(())
    }

    /// Renames the file in place. Does *not* move it to a different parent
    /// directory and does not support renaming directories — a documented
    /// limitation preserved from the original implementation.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<()> {
        self.check_valid()?;
        let old: PathName = old_path.into();
        let new: PathName = new_path.into();
        let old_segments = old.segments();
        let file = resolve::find_file(&self.root, &old_segments)
            .ok_or_else(|| RamFsError::NotFound(old.clone()))?;
        let new_segments = new.segments();
        let (&new_name, _) = new_segments
            .split_last()
            .ok_or_else(|| RamFsError::InvalidPath(new.clone()))?;
        file.borrow_mut().name = new_name.to_owned();
        Ok(())
    }

    pub fn mkdir(&mut self, path: &str, _mode: u32) -> Result<()> {
        self.check_valid()?;
        let pathname: PathName = path.into();
        let segments = pathname.segments();
        if segments.is_empty() {
            return Err(RamFsError::InvalidPath(pathname));
        }
        if resolve::find_dir(&self.root, &segments).is_some() {
            return Ok(());
        }
        resolve::create_dir(&self.root, &segments)?;
        Ok(())
    }

    pub fn chmod(&mut self, path: &str, _mode: u32) -> Result<()> {
        self.check_valid()?;
        self.resolve_any(path)
    }

    pub fn utime(&mut self, path: &str, _mtime: u64) -> Result<()> {
        self.check_valid()?;
        self.resolve_any(path)
    }

    fn resolve_any(&self, path: &str) -> Result<()> {
        let pathname: PathName = path.into();
        let segments = pathname.segments();
        if resolve::find_file(&self.root, &segments).is_some()
            || resolve::find_dir(&self.root, &segments).is_some()
        {
            Ok(())
        } else {
            Err(RamFsError::NotFound(pathname))
        }
    }

    pub fn direxists(&self, path: &str) -> bool {
        if !self.context_is_valid() {
            return false;
        }
        let pathname: PathName = path.into();
        resolve::find_dir(&self.root, &pathname.segments()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;

    fn ctx() -> Context {
        Context::init(RamFsConfig::default())
    }

    #[test]
    fn invalid_context_is_rejected_uniformly() {
        let mut bad = ctx();
        bad.magic = 0xDEAD_BEEF;
        let err = bad.mkdir("/d", 0).unwrap_err();
        assert_eq!(err.status(), Status::Invalid);
        assert!(!bad.direxists("/"));
    }

    // S1 — create, write, read.
    #[test]
    fn scenario_create_write_read() {
        let mut fs = ctx();
        let mut h1 = fs
            .fopen("/hello.txt", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        let written = fs.fwrite(&mut h1, b"abc").unwrap();
        assert_eq!(written, 3);
        fs.fclose(h1).unwrap();

        let mut h2 = fs.fopen("/hello.txt", OpenFlags::O_RDONLY, 0).unwrap();
        let mut buf = [0u8; 4];
        let n = fs.fread(&mut h2, &mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..3], b"abc");
        fs.fclose(h2).unwrap();
        fs.deinit();
    }

    // S2 — sparse write.
    #[test]
    fn scenario_sparse_write() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/s", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        assert_eq!(fs.lseek(&mut h, SeekFrom::Start(5)).unwrap(), 5);
        assert_eq!(fs.fwrite(&mut h, b"X").unwrap(), 1);
        fs.lseek(&mut h, SeekFrom::Start(0)).unwrap();
        let mut buf = [0u8; 6];
        let n = fs.fread(&mut h, &mut buf).unwrap();
        assert_eq!(n, 6);
        assert_eq!(buf, [0, 0, 0, 0, 0, b'X']);
    }

    // S3 — unlink-in-use.
    #[test]
    fn scenario_unlink_in_use() {
        let mut fs = ctx();
        let h = fs
            .fopen("/a", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        let err = fs.unlink("/a").unwrap_err();
        assert_eq!(err, RamFsError::InUse("/a".into()));
        fs.fclose(h).unwrap();
        fs.unlink("/a").unwrap();
        let err = fs.stat("/a").unwrap_err();
        assert_eq!(err.status(), Status::NotFound);
    }

    // S4 — mkdir-p and readdir.
    #[test]
    fn scenario_mkdir_p_and_readdir() {
        let mut fs = ctx();
        fs.mkdir("/d1/d2", 0).unwrap();
        assert!(fs.direxists("/d1"));
        assert!(fs.direxists("/d1/d2"));

        let mut h = fs
            .fopen("/d1/f.txt", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.fwrite(&mut h, b"x").unwrap();
        fs.fclose(h).unwrap();

        let mut dh = fs.opendir("/d1").unwrap();
        let first = fs.readdir(&mut dh).unwrap();
        assert_eq!(first.name, "f.txt");
        assert_eq!(first.size, 1);
        assert_eq!(first.attr, ATTR_FILE);

        let second = fs.readdir(&mut dh).unwrap();
        assert_eq!(second.name, "d2");
        assert_eq!(second.size, 0);
        assert_eq!(second.attr, ATTR_DIR);

        let third = fs.readdir(&mut dh);
        assert!(third.is_err());
        fs.closedir(dh).unwrap();
    }

    // S5 — rename.
    #[test]
    fn scenario_rename() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/a.txt", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.fwrite(&mut h, b"hi").unwrap();
        fs.fclose(h).unwrap();

        fs.rename("/a.txt", "/b.txt").unwrap();
        assert!(fs.stat("/a.txt").is_err());
        let entry = fs.stat("/b.txt").unwrap();
        assert_eq!(entry.size, 2);
    }

    // S6 — truncate on reopen.
    #[test]
    fn scenario_truncate_on_reopen() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/t", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.fwrite(&mut h, b"abcdef").unwrap();
        fs.fclose(h).unwrap();

        let mut h = fs
            .fopen(
                "/t",
                OpenFlags::O_CREAT | OpenFlags::O_WRONLY | OpenFlags::O_TRUNC,
                0,
            )
            .unwrap();
        assert_eq!(fs.fsize(&h).unwrap(), 0);
        fs.fwrite(&mut h, b"yy").unwrap();
        fs.fclose(h).unwrap();

        let mut h = fs.fopen("/t", OpenFlags::O_RDONLY, 0).unwrap();
        let mut buf = [0u8; 2];
        let n = fs.fread(&mut h, &mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf, b"yy");
    }

    #[test]
    fn fread_at_eof_yields_zero() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/e", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.fwrite(&mut h, b"abc").unwrap();
        let mut buf = [0u8; 4];
        let n = fs.fread(&mut h, &mut buf).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn lseek_set_then_tell_and_seek_end() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/k", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.fwrite(&mut h, b"0123456789").unwrap();
        fs.lseek(&mut h, SeekFrom::Start(3)).unwrap();
        assert_eq!(fs.tell(&h), 3);
        fs.lseek(&mut h, SeekFrom::End(0)).unwrap();
        assert_eq!(fs.tell(&h), 10);
    }

    #[test]
    fn lseek_negative_offset_is_rejected() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/n", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.lseek(&mut h, SeekFrom::Start(0)).unwrap();
        let err = fs.lseek(&mut h, SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err, RamFsError::NegativeSeek);
    }

    #[test]
    fn mkdir_is_idempotent() {
        let mut fs = ctx();
        assert!(fs.mkdir("/p", 0).is_ok());
        assert!(fs.mkdir("/p", 0).is_ok());
        assert!(fs.direxists("/p"));
    }

    #[test]
    fn mkdir_rejects_root() {
        let mut fs = ctx();
        assert!(fs.mkdir("/", 0).is_err());
    }

    #[test]
    fn getc_returns_none_at_eof() {
        let mut fs = ctx();
        let mut h = fs
            .fopen("/g", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.putc(&mut h, b'Z').unwrap();
        fs.lseek(&mut h, SeekFrom::Start(0)).unwrap();
        assert_eq!(fs.getc(&mut h).unwrap(), Some(b'Z'));
        assert_eq!(fs.getc(&mut h).unwrap(), None);
    }

    #[test]
    fn chmod_and_utime_require_existing_path() {
        let mut fs = ctx();
        assert!(fs.chmod("/missing", 0).is_err());
        fs.mkdir("/present", 0).unwrap();
        assert!(fs.chmod("/present", 0).is_ok());
        assert!(fs.utime("/present", 0).is_ok());
    }

    #[test]
    fn readdir_exhaustion_reports_not_found() {
        let fs = ctx();
        let mut dh = fs.opendir("/").unwrap();
        assert!(fs.readdir(&mut dh).is_err());
    }

    #[test]
    fn fopen_on_a_directory_is_not_a_file() {
        let mut fs = ctx();
        fs.mkdir("/d", 0).unwrap();
        let err = fs
            .fopen("/d", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap_err();
        assert_eq!(err, RamFsError::NotAFile("/d".into()));
    }

    #[test]
    fn opendir_on_a_file_is_not_a_dir() {
        let mut fs = ctx();
        let h = fs
            .fopen("/f", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, 0)
            .unwrap();
        fs.fclose(h).unwrap();
        let err = fs.opendir("/f").unwrap_err();
        assert_eq!(err, RamFsError::NotADir("/f".into()));
    }
}
