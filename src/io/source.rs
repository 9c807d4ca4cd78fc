//! Byte source abstraction backing the reader.
//!
//! The reader is written against any `Read + Seek` source; the concrete
//! backing store (local file, HTTP range reader, in-memory buffer) is a
//! concern of the caller, not of this crate. [`PrefetchReader`] wraps such
//! a source with the prefetch-buffer discipline COGs are designed around:
//! fetch a prefix of the file up front (default 65536 bytes, enough for the
//! header and directory metadata of a well-formed COG), and only fall back
//! to additional reads against the underlying source if something reaches
//! past that prefix.

use std::io::{self, Read, Seek, SeekFrom};

/// Default prefetch size: large enough to hold the header, IFD chain, and
/// out-of-line tag values of a typical COG in one request.
pub const DEFAULT_PREFETCH_SIZE: usize = 65536;

/// Wraps a `Read + Seek` source with a growable prefetch buffer.
///
/// The buffer is filled with the first `prefetch_size` bytes of the
/// underlying source on construction. Reads that stay within the buffer are
/// served from memory; a read that reaches past the buffer's current end
/// transparently pulls more bytes from the underlying source and grows the
/// buffer to cover it.
pub struct PrefetchReader<R> {
    inner: R,
    buffer: Vec<u8>,
    position: u64,
}

impl<R: Read + Seek> PrefetchReader<R> {
    /// Wraps `inner`, eagerly reading up to `prefetch_size` bytes from its
    /// current position.
    pub fn new(mut inner: R, prefetch_size: usize) -> io::Result<Self> {
        let mut buffer = vec![0u8; prefetch_size];
        let read = read_best_effort(&mut inner, &mut buffer)?;
        buffer.truncate(read);
        Ok(Self {
            inner,
            buffer,
            position: 0,
        })
    }

    /// Wraps `inner` using the default prefetch size.
    pub fn with_default_prefetch(inner: R) -> io::Result<Self> {
        Self::new(inner, DEFAULT_PREFETCH_SIZE)
    }

    /// Grows the buffer so it covers at least `len` bytes, reading the
    /// shortfall from the underlying source.
    fn ensure_buffered(&mut self, len: u64) -> io::Result<()> {
        if len <= self.buffer.len() as u64 {
            return Ok(());
        }
        let have = self.buffer.len() as u64;
        self.inner.seek(SeekFrom::Start(have))?;
        let want = (len - have) as usize;
        let mut extra = vec![0u8; want];
        let read = read_best_effort(&mut self.inner, &mut extra)?;
        extra.truncate(read);
        self.buffer.extend_from_slice(&extra);
        Ok(())
    }
}

/// Reads as much as is available into `buf`, returning the number of bytes
/// actually read (short of EOF, this is `buf.len()`).
fn read_best_effort<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

impl<R: Read + Seek> Read for PrefetchReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want_end = self.position + buf.len() as u64;
        self.ensure_buffered(want_end)?;

        if self.position >= self.buffer.len() as u64 {
            return Ok(0);
        }

        let start = self.position as usize;
        let end = (want_end as usize).min(self.buffer.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.buffer[start..end]);
        self.position += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for PrefetchReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(delta) => {
                (self.position as i64)
                    .checked_add(delta)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek overflow"))?
                    as u64
            }
            SeekFrom::End(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "seeking from the end requires a known source length",
                ))
            }
        };
        Ok(self.position)
    }
}

unsafe impl<R: Send> Send for PrefetchReader<R> {}
unsafe impl<R: Sync> Sync for PrefetchReader<R> {}
