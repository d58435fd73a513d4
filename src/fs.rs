//! A read-only host over an on-disk file. Addressing, searching, and
//! printing work; composing a non-empty change log is rejected, so edit
//! commands fail cleanly instead of corrupting the file.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::delta::Delta;
use crate::error::{Error, Result};
use crate::traits::{File, ReadSeek};

pub struct FsFile {
    file: fs::File,
    q0: usize,
    q1: usize,
}

impl FsFile {
    pub fn new(file: fs::File) -> Self {
        FsFile { file, q0: 0, q1: 0 }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(fs::File::open(path)?))
    }
}

impl File for FsFile {
    fn select(&mut self, q0: usize, q1: usize) {
        self.q0 = q0;
        self.q1 = q1;
    }

    fn dot(&self) -> (usize, usize) {
        (self.q0, self.q1)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.file.metadata()?.len() as usize)
    }

    fn reader(&self, q0: usize, q1: usize) -> Box<dyn ReadSeek + '_> {
        Box::new(FsReader {
            file: &self.file,
            start: q0 as u64,
            end: q1.max(q0) as u64,
            offset: 0,
        })
    }

    fn compose(&mut self, log: Delta) -> Result<()> {
        if !log.is_empty() {
            return Err(Error::host("file host is read-only"));
        }
        Ok(())
    }
}

/// Windowed reader over the backing file. Seeks are window-relative; reads
/// never cross the window's end.
struct FsReader<'a> {
    file: &'a fs::File,
    start: u64,
    end: u64,
    offset: u64,
}

impl Read for FsReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.start + self.offset;
        if pos >= self.end {
            return Ok(0);
        }
        let want = buf.len().min((self.end - pos) as usize);
        let mut file = self.file;
        file.seek(SeekFrom::Start(pos))?;
        let got = file.read(&mut buf[..want])?;
        self.offset += got as u64;
        Ok(got)
    }
}

impl Seek for FsReader<'_> {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let window = (self.end - self.start) as i64;
        let target = match from {
            SeekFrom::Start(o) => o as i64,
            SeekFrom::Current(o) => self.offset as i64 + o,
            SeekFrom::End(o) => window + o,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before window start",
            ));
        }
        self.offset = target as u64;
        Ok(self.offset)
    }
}
