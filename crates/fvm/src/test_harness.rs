//! Test harness for the toolchain.
//!
//! Provides an in-memory [`Host`] and assemble/run helpers so tests can
//! drive whole programs without touching the real standard streams or a
//! disk file.
//!
//! # Example
//!
//! ```rust
//! use fvm::test_harness::run_program;
//!
//! let vm = run_program("pl [1]d mch ld pl [2]d mch st fi", b"X");
//! assert_eq!(vm.host().output, b"X");
//! ```

use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::asm::assemble;
use crate::isa::Word;
use crate::vm::{Host, Vm};

/// A host whose input is a queue of bytes, whose output is captured,
/// and whose disk is an in-memory buffer.
#[derive(Debug, Default)]
pub struct MemHost {
    input: VecDeque<u8>,
    pub output: Vec<u8>,
    disk: Cursor<Vec<u8>>,
}

impl MemHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_disk(mut self, disk: Vec<u8>) -> Self {
        self.disk = Cursor::new(disk);
        self
    }

    #[must_use]
    pub fn disk_contents(&self) -> &[u8] {
        self.disk.get_ref()
    }
}

impl Host for MemHost {
    fn read_input(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn write_output(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
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

/// Assembles source text, failing the test on any diagnostic.
#[must_use]
pub fn assemble_clean(source: &str) -> Vec<Word> {
    let assembly = assemble(source);
    assert!(
        assembly.is_clean(),
        "unexpected diagnostics: {:?}",
        assembly.diagnostics
    );
    assembly.rom
}

/// Assembles and runs a program to a clean halt with the given input
/// bytes queued on the input channel. Returns the halted machine so
/// callers can inspect registers, memory, and captured output.
#[must_use]
pub fn run_program(source: &str, input: &[u8]) -> Vm<MemHost> {
    run_program_with_host(source, MemHost::with_input(input))
}

/// Like [`run_program`] but with a caller-built host.
#[must_use]
pub fn run_program_with_host(source: &str, host: MemHost) -> Vm<MemHost> {
    let rom = assemble_clean(source);
    let mut vm = Vm::new(rom, host);
    vm.run().expect("program faulted");
    vm
}
