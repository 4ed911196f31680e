//! Named pipe the launcher scripts write events into.
//!
//! The reader end is opened non-blocking, and the daemon also holds a write
//! end for its whole lifetime so the reader never sees end-of-stream when no
//! external writer is connected.

use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, ErrorKind, Read, Write};
use std::os::fd::AsFd;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::stat::Mode;
use tracing::{debug, info, warn};

pub const DEFAULT_FIFO_PATH: &str = "/tmp/pm.fifo";

/// Anyone on the box may post events.
const FIFO_MODE: u32 = 0o666;

const READ_CHUNK: usize = 4096;

/// Make sure `path` is a FIFO with open permissions.
///
/// A regular file or other non-FIFO occupying the path is removed first.
pub fn ensure_fifo(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => {}
        Ok(_) => {
            warn!("{} exists but is not a FIFO, replacing", path.display());
            fs::remove_file(path)?;
            make_fifo(path)?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => make_fifo(path)?,
        Err(e) => return Err(e),
    }
    // mkfifo honours the umask
    fs::set_permissions(path, Permissions::from_mode(FIFO_MODE))
}

fn make_fifo(path: &Path) -> io::Result<()> {
    nix::unistd::mkfifo(path, Mode::from_bits_truncate(FIFO_MODE))?;
    info!("Created FIFO {}", path.display());
    Ok(())
}

/// Accumulates raw bytes and hands out complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete, non-blank line, trimmed. Partial lines stay buffered.
    pub fn pop_line(&mut self) -> Option<String> {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    pub fn has_line(&self) -> bool {
        self.pending.contains(&b'\n')
    }
}

/// Open event pipe. Restores the FIFO's permissions when dropped.
pub struct EventPipe {
    path: PathBuf,
    reader: File,
    _keepalive: File,
    lines: LineBuffer,
}

impl EventPipe {
    /// Create the FIFO if needed and open both ends.
    pub fn open(path: &Path) -> io::Result<Self> {
        ensure_fifo(path)?;
        let reader = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        // Cannot block: a reader is already open.
        let keepalive = OpenOptions::new().write(true).open(path)?;
        debug!("Opened FIFO {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            _keepalive: keepalive,
            lines: LineBuffer::default(),
        })
    }

    /// Wait up to `timeout` for a line.
    ///
    /// Returns at most one line per call; lines that arrived together are
    /// handed out on later calls without waiting.
    pub fn next_line(&mut self, timeout: Duration) -> io::Result<Option<String>> {
        if let Some(line) = self.lines.pop_line() {
            return Ok(Some(line));
        }
        if self.wait_readable(timeout)? {
            self.drain()?;
        }
        Ok(self.lines.pop_line())
    }

    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let ms = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.reader.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(ms)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(fds[0]
                .revents()
                .is_some_and(|r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP))),
            // A signal arrived; the caller's loop checks the stop flag.
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn drain(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => self.lines.push(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl Drop for EventPipe {
    fn drop(&mut self) {
        if let Err(e) = fs::set_permissions(&self.path, Permissions::from_mode(FIFO_MODE)) {
            debug!("Could not restore permissions on {}: {e}", self.path.display());
        }
    }
}

/// Write one event line into the pipe from the client side.
///
/// Fails with `ENXIO` when no daemon has the pipe open for reading.
pub fn post_line(path: &Path, line: &str) -> io::Result<()> {
    let mut fifo = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)?;
    let mut payload = line.trim_end().as_bytes().to_vec();
    payload.push(b'\n');
    fifo.write_all(&payload)
}
