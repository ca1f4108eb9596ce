// Copyright 2026. The Dagchain Core Contributors
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Append-only `blk`/`vtx` file families, grouped into epochs, each file
//! CRC32-checksummed in its first four bytes.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crc32fast::Hasher as Crc32;

use crate::error::StoreError;

pub const DEFAULT_FILE_CAPACITY: u64 = 256 * 1024 * 1024;
pub const DEFAULT_EPOCH_CAPACITY: u32 = 64;
const CHECKSUM_PLACEHOLDER: [u8; 4] = [0u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePosition {
    pub epoch: u32,
    pub file_index: u32,
    pub offset: u64,
}

/// One family (`blk` or `vtx`) of append-only files rooted at `<root>/<family>/`.
pub struct FileFamily {
    root: PathBuf,
    family: &'static str,
    file_capacity: u64,
    epoch_capacity: u32,
    epoch: u32,
    file_index: u32,
    current: File,
    current_len: u64,
}

impl FileFamily {
    pub fn open(root: &Path, family: &'static str, file_capacity: u64, epoch_capacity: u32) -> Result<FileFamily, StoreError> {
        let dir = root.join(family).join("0");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("0.dat");
        let current = Self::open_or_create(&path)?;
        let current_len = current.metadata()?.len();
        Ok(FileFamily {
            root: root.to_path_buf(),
            family,
            file_capacity,
            epoch_capacity,
            epoch: 0,
            file_index: 0,
            current,
            current_len,
        })
    }

    fn open_or_create(path: &Path) -> Result<File, StoreError> {
        let is_new = !path.exists();
        let file = OpenOptions::new().read(true).append(true).create(true).open(path)?;
        if is_new {
            let mut file = file;
            file.write_all(&CHECKSUM_PLACEHOLDER)?;
            return Ok(file);
        }
        Ok(file)
    }

    fn path_for(&self, epoch: u32, file_index: u32) -> PathBuf {
        self.root.join(self.family).join(epoch.to_string()).join(format!("{}.dat", file_index))
    }

    /// Appends `bytes`, rolling to a new file (and epoch, if the file index
    /// wraps) when doing so would exceed `file_capacity`. Returns the
    /// position the bytes were written at.
    pub fn append(&mut self, bytes: &[u8]) -> Result<FilePosition, StoreError> {
        if self.current_len + bytes.len() as u64 > self.file_capacity && self.current_len > 4 {
            self.roll()?;
        }
        let offset = self.current_len;
        self.current.write_all(bytes)?;
        self.current_len += bytes.len() as u64;
        Ok(FilePosition {
            epoch: self.epoch,
            file_index: self.file_index,
            offset,
        })
    }

    fn roll(&mut self) -> Result<(), StoreError> {
        self.seal_current()?;
        self.file_index += 1;
        if self.file_index >= self.epoch_capacity {
            self.file_index = 0;
            self.epoch += 1;
        }
        let path = self.path_for(self.epoch, self.file_index);
        std::fs::create_dir_all(path.parent().expect("file path always has a parent"))?;
        self.current = Self::open_or_create(&path)?;
        self.current_len = self.current.metadata()?.len();
        Ok(())
    }

    /// Computes and writes the CRC32 of everything after the checksum
    /// placeholder. Left as a blocking call here; the DAG Manager's storage
    /// pool is expected to run it via `spawn_blocking`.
    fn seal_current(&mut self) -> Result<(), StoreError> {
        let path = self.path_for(self.epoch, self.file_index);
        write_checksum(&path)
    }

    /// Seals the currently-open file; called on graceful shutdown.
    pub fn seal(&mut self) -> Result<(), StoreError> {
        self.current.flush()?;
        self.seal_current()
    }

    /// Recomputes and rewrites the checksum of `(epoch, file_index)` against
    /// its bytes as they stand right now. Used by [`super::BlockStore::check_file_sanity`]
    /// after a pruning recovery: once the KV index has been rolled back to a
    /// height the file is believed consistent up to, the file's own checksum
    /// is re-accepted against its current (possibly still partially torn)
    /// trailing bytes so that a second sanity pass doesn't keep sliding the
    /// head back indefinitely.
    pub fn reseal(&self, epoch: u32, file_index: u32) -> Result<(), StoreError> {
        let path = self.path_for(epoch, file_index);
        if path.exists() {
            write_checksum(&path)?;
        }
        Ok(())
    }

    pub fn read_at(&self, pos: FilePosition, len: usize) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(pos.epoch, pos.file_index);
        let mut file = File::open(&path)?;
        file.seek(SeekFrom::Start(pos.offset))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads from `pos` to the end of the file it names. Used when the exact
    /// record length isn't tracked by the index and the decoder can tell for
    /// itself how many of the returned bytes it actually needed.
    pub fn read_to_end(&self, pos: FilePosition) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(pos.epoch, pos.file_index);
        let mut file = File::open(&path)?;
        file.seek(SeekFrom::Start(pos.offset))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Reads the concatenated bytes of files `[start, start + max_files)` in
    /// the same epoch, skipping each file's 4-byte checksum prefix.
    pub fn read_concatenated(&self, epoch: u32, start_file: u32, max_files: u32) -> Result<Vec<u8>, StoreError> {
        let mut out = Vec::new();
        for idx in start_file..start_file.saturating_add(max_files) {
            let path = self.path_for(epoch, idx);
            if !path.exists() {
                break;
            }
            let mut file = File::open(&path)?;
            file.seek(SeekFrom::Start(4))?;
            file.read_to_end(&mut out)?;
        }
        Ok(out)
    }
}

fn write_checksum(path: &Path) -> Result<(), StoreError> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.seek(SeekFrom::Start(4))?;
    let mut hasher = Crc32::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let checksum = hasher.finalize();
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&checksum.to_le_bytes())?;
    Ok(())
}

/// Verifies a file's stored CRC32 against its actual contents.
pub fn verify_checksum(path: &Path) -> Result<bool, StoreError> {
    let mut file = File::open(path)?;
    let mut stored = [0u8; 4];
    if file.read_exact(&mut stored).is_err() {
        return Ok(false);
    }
    let stored = u32::from_le_bytes(stored);
    let mut hasher = Crc32::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize() == stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_read_at_recovers_the_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut family = FileFamily::open(dir.path(), "blk", DEFAULT_FILE_CAPACITY, DEFAULT_EPOCH_CAPACITY).unwrap();
        let pos = family.append(b"hello level set").unwrap();
        let read_back = family.read_at(pos, b"hello level set".len()).unwrap();
        assert_eq!(read_back, b"hello level set");
    }

    #[test]
    fn seal_writes_a_verifiable_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let mut family = FileFamily::open(dir.path(), "blk", DEFAULT_FILE_CAPACITY, DEFAULT_EPOCH_CAPACITY).unwrap();
        family.append(b"some bytes").unwrap();
        family.seal().unwrap();
        let path = dir.path().join("blk").join("0").join("0.dat");
        assert!(verify_checksum(&path).unwrap());
    }

    #[test]
    fn writing_past_file_capacity_rolls_to_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut family = FileFamily::open(dir.path(), "blk", 16, DEFAULT_EPOCH_CAPACITY).unwrap();
        family.append(b"0123456789").unwrap();
        let second = family.append(b"abcdefghij").unwrap();
        assert_eq!(second.file_index, 1);
    }
}
