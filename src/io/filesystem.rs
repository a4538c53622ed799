//! File-system port implementations: one over `std::fs` for the driver and
//! an in-memory one for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read as _, Seek, SeekFrom, Write as _};
use std::rc::Rc;

use super::{FileHandle, FileMode, FileSystem};

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path))
}

/// File system over `std::fs`.
pub struct DiskFileSystem;

impl DiskFileSystem {
    pub fn new() -> DiskFileSystem {
        DiskFileSystem
    }
}

impl Default for DiskFileSystem {
    fn default() -> DiskFileSystem {
        DiskFileSystem::new()
    }
}

impl FileSystem for DiskFileSystem {
    fn open(
        &mut self,
        path: &str,
        mode: FileMode,
        _record_len: usize,
    ) -> io::Result<Box<dyn FileHandle>> {
        let file = match mode {
            FileMode::Input => OpenOptions::new().read(true).open(path)?,
            FileMode::Output => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
            FileMode::Append => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)?,
            FileMode::Random => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)?,
        };
        let mut handle = DiskFile { file };
        if mode == FileMode::Append {
            handle.file.seek(SeekFrom::End(0))?;
        }
        Ok(Box::new(handle))
    }

    fn exists(&self, path: &str) -> bool {
        std::path::Path::new(path).exists()
    }

    fn remove(&mut self, path: &str) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn rename(&mut self, old: &str, new: &str) -> io::Result<()> {
        std::fs::rename(old, new)
    }
}

struct DiskFile {
    file: File,
}

impl FileHandle for DiskFile {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        // Unbuffered byte-at-a-time read keeps the seek position honest for
        // handles that mix line and record access.
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.file.read(&mut byte)? {
                0 => {
                    if line.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                _ => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    if byte[0] != b'\r' {
                        line.push(byte[0]);
                    }
                }
            }
        }
        Ok(Some(line.iter().map(|&b| char::from(b)).collect()))
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    fn read_chars(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let count = self.file.read(&mut buf[filled..])?;
            if count == 0 {
                break;
            }
            filled += count;
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn eof(&mut self) -> bool {
        self.position() >= self.length()
    }

    fn position(&mut self) -> u64 {
        self.file.seek(SeekFrom::Current(0)).unwrap_or(0)
    }

    fn length(&mut self) -> u64 {
        self.file.metadata().map(|m| m.len()).unwrap_or(0)
    }

    fn seek_record(&mut self, record: usize, record_len: usize) -> io::Result<()> {
        let offset = (record.saturating_sub(1) * record_len) as u64;
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let count = self.file.read(&mut buf[filled..])?;
            if count == 0 {
                break;
            }
            filled += count;
        }
        Ok(filled)
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

type SharedFiles = Rc<RefCell<HashMap<String, Vec<u8>>>>;

/// In-memory file system. Cloning shares the backing store, so tests keep a
/// handle to inspect files after the interpreter is done with them.
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    files: SharedFiles,
}

impl MemoryFileSystem {
    pub fn new() -> MemoryFileSystem {
        MemoryFileSystem::default()
    }

    pub fn write_file(&self, path: &str, contents: &[u8]) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_vec());
    }

    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(
        &mut self,
        path: &str,
        mode: FileMode,
        _record_len: usize,
    ) -> io::Result<Box<dyn FileHandle>> {
        let mut files = self.files.borrow_mut();
        let exists = files.contains_key(path);
        match mode {
            FileMode::Input if !exists => return Err(not_found(path)),
            FileMode::Output => {
                files.insert(path.to_string(), Vec::new());
            }
            _ if !exists => {
                files.insert(path.to_string(), Vec::new());
            }
            _ => {}
        }
        let pos = if mode == FileMode::Append {
            files.get(path).map(|f| f.len()).unwrap_or(0)
        } else {
            0
        };
        drop(files);
        Ok(Box::new(MemoryFile {
            files: Rc::clone(&self.files),
            path: path.to_string(),
            pos,
        }))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn remove(&mut self, path: &str) -> io::Result<()> {
        match self.files.borrow_mut().remove(path) {
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }

    fn rename(&mut self, old: &str, new: &str) -> io::Result<()> {
        let mut files = self.files.borrow_mut();
        match files.remove(old) {
            Some(contents) => {
                files.insert(new.to_string(), contents);
                Ok(())
            }
            None => Err(not_found(old)),
        }
    }
}

struct MemoryFile {
    files: SharedFiles,
    path: String,
    pos: usize,
}

impl MemoryFile {
    fn with_contents<R>(&self, op: impl FnOnce(&Vec<u8>) -> R) -> R {
        let files = self.files.borrow();
        let empty = Vec::new();
        op(files.get(&self.path).unwrap_or(&empty))
    }
}

impl FileHandle for MemoryFile {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let (line, new_pos) = self.with_contents(|data| {
            if self.pos >= data.len() {
                return (None, self.pos);
            }
            let mut line = Vec::new();
            let mut pos = self.pos;
            while pos < data.len() {
                let b = data[pos];
                pos += 1;
                if b == b'\n' {
                    break;
                }
                if b != b'\r' {
                    line.push(b);
                }
            }
            (Some(line.iter().map(|&b| char::from(b)).collect()), pos)
        });
        self.pos = new_pos;
        Ok(line)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_record(data)
    }

    fn read_chars(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let (bytes, new_pos) = self.with_contents(|data| {
            let end = (self.pos + n).min(data.len());
            let start = self.pos.min(data.len());
            (data[start..end].to_vec(), end)
        });
        self.pos = new_pos;
        Ok(bytes)
    }

    fn eof(&mut self) -> bool {
        self.position() >= self.length()
    }

    fn position(&mut self) -> u64 {
        self.pos as u64
    }

    fn length(&mut self) -> u64 {
        self.with_contents(|data| data.len() as u64)
    }

    fn seek_record(&mut self, record: usize, record_len: usize) -> io::Result<()> {
        self.pos = record.saturating_sub(1) * record_len;
        Ok(())
    }

    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (count, new_pos) = self.with_contents(|data| {
            let start = self.pos.min(data.len());
            let end = (start + buf.len()).min(data.len());
            buf[..end - start].copy_from_slice(&data[start..end]);
            (end - start, end)
        });
        self.pos = new_pos;
        Ok(count)
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut files = self.files.borrow_mut();
        let data = files.entry(self.path.clone()).or_insert_with(Vec::new);
        if data.len() < self.pos {
            data.resize(self.pos, 0);
        }
        let overlap = (data.len() - self.pos).min(buf.len());
        data[self.pos..self.pos + overlap].copy_from_slice(&buf[..overlap]);
        data.extend_from_slice(&buf[overlap..]);
        self.pos += buf.len();
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
