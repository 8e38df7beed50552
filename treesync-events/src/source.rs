//! The inotify event source.
//!
//! Owns the inotify fd and the growable read buffer, driving the kernel
//! interface directly: `inotify_add_watch` hands back the integer watch
//! descriptor that gets round-tripped through the runner, and `read(2)`
//! fills the buffer with variable-length records. Draining is pull-based:
//! the master loop polls the fd (with the runner's alarm as timeout), then
//! reads batches of raw records until a zero-timeout poll reports the queue
//! empty.

use std::ffi::{CString, OsStr};
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;
use std::ptr;

use crate::error::EventError;
use crate::normalize::RawRecord;

/// Initial size of the raw read buffer. Grown by doubling whenever the
/// kernel reports it too small for the next record.
pub const INITIAL_BUFFER_SIZE: usize = 2048;

/// Fixed registration mask: attribute changes, close-after-write, creation,
/// deletion (entry and self), both rename halves, symlinks untraversed,
/// directories only.
const STANDARD_MASK: u32 = libc::IN_ATTRIB
    | libc::IN_CLOSE_WRITE
    | libc::IN_CREATE
    | libc::IN_DELETE
    | libc::IN_DELETE_SELF
    | libc::IN_MOVED_FROM
    | libc::IN_MOVED_TO
    | libc::IN_DONT_FOLLOW
    | libc::IN_ONLYDIR;

const HEADER_SIZE: usize = mem::size_of::<libc::inotify_event>();

pub struct EventSource {
    fd: RawFd,
    buffer: Vec<u8>,
}

impl EventSource {
    pub fn new() -> Result<Self, EventError> {
        Self::with_buffer_size(INITIAL_BUFFER_SIZE)
    }

    /// Source with a non-default initial buffer; the buffer still grows on
    /// demand, so any positive size works.
    pub fn with_buffer_size(bytes: usize) -> Result<Self, EventError> {
        let fd = unsafe { libc::inotify_init1(libc::IN_NONBLOCK | libc::IN_CLOEXEC) };
        if fd < 0 {
            return Err(EventError::Init(io::Error::last_os_error()));
        }
        Ok(Self {
            fd,
            buffer: vec![0; bytes.max(1)],
        })
    }

    /// Register `path` for the standard directory mask and return the
    /// kernel's watch descriptor.
    pub fn add_watch(&mut self, path: &Path) -> Result<i32, EventError> {
        let c_path =
            CString::new(path.as_os_str().as_bytes()).map_err(|_| EventError::Watch {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::InvalidInput),
            })?;
        let wd = unsafe { libc::inotify_add_watch(self.fd, c_path.as_ptr(), STANDARD_MASK) };
        if wd < 0 {
            return Err(EventError::Watch {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(wd)
    }

    /// Wait for the fd to become readable.
    ///
    /// `timeout_ms` of `None` blocks indefinitely. Returns `Ok(true)` when
    /// data is available, `Ok(false)` on timeout or on a signal-interrupted
    /// wait (the caller re-enters its loop and re-queries its alarm).
    pub fn wait(&self, timeout_ms: Option<i64>) -> Result<bool, EventError> {
        let mut pollfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout = match timeout_ms {
            Some(ms) => ms.clamp(0, i32::MAX as i64) as libc::c_int,
            None => -1,
        };
        let rc = unsafe { libc::poll(&mut pollfd, 1, timeout) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(EventError::Poll(err));
        }
        Ok(rc > 0)
    }

    /// Read one batch of raw records.
    ///
    /// Returns an empty batch when nothing is pending. A read rejected with
    /// "invalid argument" means the next record does not fit; the buffer is
    /// doubled and the read retried.
    pub fn read_batch(&mut self) -> Result<Vec<RawRecord>, EventError> {
        loop {
            let count = unsafe {
                libc::read(
                    self.fd,
                    self.buffer.as_mut_ptr() as *mut libc::c_void,
                    self.buffer.len(),
                )
            };
            if count >= 0 {
                return Ok(parse_records(&self.buffer[..count as usize]));
            }

            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EAGAIN) => return Ok(Vec::new()),
                Some(libc::EINTR) => continue,
                Some(libc::EINVAL) => {
                    let grown = self.buffer.len() * 2;
                    self.buffer.resize(grown, 0);
                }
                _ => return Err(EventError::Read(err)),
            }
        }
    }

    /// Current size of the raw read buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

/// Walk a read's worth of variable-length records: a fixed header, then
/// `len` bytes of name, NUL-padded up to the record boundary.
fn parse_records(buffer: &[u8]) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset + HEADER_SIZE <= buffer.len() {
        let header = unsafe {
            ptr::read_unaligned(buffer[offset..].as_ptr() as *const libc::inotify_event)
        };
        let name_start = offset + HEADER_SIZE;
        let name_end = name_start + header.len as usize;
        if name_end > buffer.len() {
            break;
        }

        let padded = &buffer[name_start..name_end];
        let name = match padded.iter().position(|&byte| byte == 0) {
            Some(end) => &padded[..end],
            None => padded,
        };

        records.push(RawRecord {
            watch: header.wd,
            mask: header.mask,
            cookie: header.cookie,
            name: OsStr::from_bytes(name).to_os_string(),
        });
        offset = name_end;
    }

    records
}
