//! The machine's window on the outside world.
//!
//! The runtime never touches stdin, stdout, or the disk directly; it
//! goes through this trait so a hosted environment can substitute a
//! queued byte source or an in-memory disk without changing the
//! instruction semantics. Input reads are blocking, opaque calls.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

pub trait Host {
    /// Blocks until a byte is available. `None` means end of input.
    fn read_input(&mut self) -> io::Result<Option<u8>>;

    /// Fire-and-forget byte output.
    fn write_output(&mut self, byte: u8) -> io::Result<()>;

    /// Repositions the disk to an absolute byte offset.
    fn disk_seek(&mut self, offset: u64) -> io::Result<()>;

    /// Current byte offset from the start of the disk.
    fn disk_position(&mut self) -> io::Result<u64>;

    /// Reads the byte at the current position, advancing past it.
    /// `None` means the position is at or past the end of the disk.
    fn disk_read(&mut self) -> io::Result<Option<u8>>;

    /// Writes a byte at the current position, advancing past it.
    fn disk_write(&mut self, byte: u8) -> io::Result<()>;
}

/// The standard hosted environment: stdin, stdout, and a disk file
/// opened for read and write.
pub struct StdHost {
    stdin: io::Stdin,
    stdout: io::Stdout,
    disk: File,
}

impl StdHost {
    #[must_use]
    pub fn new(disk: File) -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
            disk,
        }
    }
}

impl Host for StdHost {
    fn read_input(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.stdin.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn write_output(&mut self, byte: u8) -> io::Result<()> {
        self.stdout.write_all(&[byte])?;
        self.stdout.flush()
    }

    fn disk_seek(&mut self, offset: u64) -> io::Result<()> {
        self.disk.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn disk_position(&mut self) -> io::Result<u64> {
        self.disk.stream_position()
    }

    fn disk_read(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.disk.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn disk_write(&mut self, byte: u8) -> io::Result<()> {
        self.disk.write_all(&[byte])
    }
}
