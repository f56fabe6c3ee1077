//! The runtime: a fetch/decode/execute loop over 64-bit memory cells.
//!
//! All machine state lives in one [`Vm`] context: the register file,
//! main memory, the callstack, and the host adapter. Arithmetic wraps
//! at 64 bits throughout; there is no signed interpretation anywhere.

mod host;
mod memory;
mod traceback;

pub use host::{Host, StdHost};
pub use memory::WordFile;
pub use traceback::traceback;

use crate::error::{Result, RunError};
use crate::isa::{Channel, Opcode, Register, Word, REGISTER_COUNT};

/// Initial callstack capacity; it grows past this on demand.
const CALLSTACK_PREALLOC: usize = 50;

/// What a single fetch/execute cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted,
}

pub struct Vm<H> {
    registers: [Word; REGISTER_COUNT],
    mem: WordFile,
    cst: WordFile,
    host: H,
}

impl<H> Vm<H> {
    /// Boots a machine with the ROM loaded into main memory, all
    /// registers zeroed, and an empty callstack (CSP all-bits-set).
    pub fn new(rom: Vec<Word>, host: H) -> Self {
        let mut registers = [0; REGISTER_COUNT];
        registers[Register::Csp as usize] = Word::MAX;
        Self {
            registers,
            mem: WordFile::from_words(rom),
            cst: WordFile::with_capacity(CALLSTACK_PREALLOC),
            host,
        }
    }

    #[must_use]
    pub fn register(&self, register: Register) -> Word {
        self.registers[register as usize]
    }

    #[must_use]
    pub fn registers(&self) -> &[Word; REGISTER_COUNT] {
        &self.registers
    }

    #[must_use]
    pub fn memory(&self) -> &WordFile {
        &self.mem
    }

    #[must_use]
    pub fn callstack(&self) -> &WordFile {
        &self.cst
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    fn set(&mut self, register: Register, value: Word) {
        self.registers[register as usize] = value;
    }

    fn advance(&mut self, words: Word) {
        let cea = self.register(Register::Cea).wrapping_add(words);
        self.set(Register::Cea, cea);
    }
}

impl<H: Host> Vm<H> {
    /// Runs until the machine halts or faults.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? == Step::Continue {}
        Ok(())
    }

    /// One fetch/execute cycle. CEA advances past the instruction after
    /// a successful handler; jump handlers pre-compensate for that.
    pub fn step(&mut self) -> Result<Step> {
        let cea = self.register(Register::Cea);
        let word = self.mem.load(cea)?;
        let op = Opcode::from_word(word).ok_or(RunError::UnknownOpcode {
            opcode: word,
            address: cea,
        })?;
        if op == Opcode::Fi {
            return Ok(Step::Halted);
        }
        self.execute(op)?;
        self.advance(1);
        Ok(Step::Continue)
    }

    /// Reads the operand word `slot` places past the current opcode.
    fn operand(&mut self, slot: Word) -> Result<Word> {
        let address = self.register(Register::Cea).wrapping_add(slot);
        self.mem.load(address)
    }

    fn execute(&mut self, op: Opcode) -> Result<()> {
        match op {
            Opcode::Pl => {
                let value = self.operand(1)?;
                let target = self.operand(2)?;
                let register =
                    Register::from_word(target).ok_or(RunError::UnknownRegister { index: target })?;
                self.set(register, value);
                self.advance(2);
            }
            Opcode::Mv => {
                let source = self.operand(1)?;
                let target = self.operand(2)?;
                let source =
                    Register::from_word(source).ok_or(RunError::UnknownRegister { index: source })?;
                let target =
                    Register::from_word(target).ok_or(RunError::UnknownRegister { index: target })?;
                self.set(target, self.register(source));
                self.advance(2);
            }
            Opcode::St => self.store()?,
            Opcode::Ld => self.load()?,
            Opcode::Jm => {
                let target = self.operand(1)?;
                self.set(Register::Cea, target.wrapping_sub(1));
            }
            Opcode::Js => {
                if self.register(Register::Acc) != 0 {
                    let target = self.operand(1)?;
                    self.set(Register::Cea, target.wrapping_sub(1));
                } else {
                    self.advance(1);
                }
            }
            Opcode::Jc => {
                if self.register(Register::Acc) == 0 {
                    let target = self.operand(1)?;
                    self.set(Register::Cea, target.wrapping_sub(1));
                } else {
                    self.advance(1);
                }
            }
            Opcode::Add => self.accumulate(Word::wrapping_add),
            Opcode::Sub => self.accumulate(Word::wrapping_sub),
            Opcode::Mul => self.accumulate(Word::wrapping_mul),
            Opcode::Div => {
                let dat = self.register(Register::Dat);
                if dat == 0 {
                    return Err(RunError::DivideByZero);
                }
                self.accumulate(|acc, dat| acc / dat);
            }
            Opcode::Not => {
                let acc = self.register(Register::Acc);
                self.set(Register::Acc, !acc);
            }
            Opcode::Inc => {
                let acc = self.register(Register::Acc);
                self.set(Register::Acc, acc.wrapping_add(1));
            }
            Opcode::Dec => {
                let acc = self.register(Register::Acc);
                self.set(Register::Acc, acc.wrapping_sub(1));
            }
            Opcode::And => self.accumulate(|acc, dat| acc & dat),
            Opcode::Or => self.accumulate(|acc, dat| acc | dat),
            Opcode::Xor => self.accumulate(|acc, dat| acc ^ dat),
            Opcode::Shl => self.accumulate(|acc, dat| acc.wrapping_shl(dat as u32)),
            Opcode::Shr => self.accumulate(|acc, dat| acc.wrapping_shr(dat as u32)),
            Opcode::Gt => self.compare(|acc, dat| acc > dat),
            Opcode::Lt => self.compare(|acc, dat| acc < dat),
            Opcode::Ge => self.compare(|acc, dat| acc >= dat),
            Opcode::Le => self.compare(|acc, dat| acc <= dat),
            Opcode::Eq => self.compare(|acc, dat| acc == dat),
            Opcode::Ne => self.compare(|acc, dat| acc != dat),
            Opcode::Cl => {
                let target = self.operand(1)?;
                let return_address = self.register(Register::Cea);
                let top = self.cst.len() as Word;
                self.cst.store(top, return_address)?;
                self.set(Register::Csp, top);
                self.set(Register::Cea, target.wrapping_sub(1));
            }
            Opcode::Rt => {
                let csp = self.register(Register::Csp);
                if csp == Word::MAX {
                    return Err(RunError::CallstackUnderflow);
                }
                let return_address = self.cst.load(csp)?;
                // Truncating to the old CSP keeps length == CSP + 1
                // whenever frames remain live.
                self.cst.truncate(csp);
                self.set(Register::Csp, csp.wrapping_sub(1));
                // Skip the call's operand word on resumption.
                self.set(Register::Cea, return_address.wrapping_add(1));
            }
            // `fi` halts in `step` before dispatch reaches here.
            Opcode::Fi => {}
        }
        Ok(())
    }

    fn accumulate(&mut self, op: impl FnOnce(Word, Word) -> Word) {
        let acc = self.register(Register::Acc);
        let dat = self.register(Register::Dat);
        self.set(Register::Acc, op(acc, dat));
    }

    fn compare(&mut self, predicate: impl FnOnce(Word, Word) -> bool) {
        self.accumulate(|acc, dat| Word::from(predicate(acc, dat)));
    }

    fn store(&mut self) -> Result<()> {
        let mch = self.register(Register::Mch);
        let mar = self.register(Register::Mar);
        let mdr = self.register(Register::Mdr);
        let channel =
            Channel::from_word(mch).ok_or(RunError::UnknownChannel { channel: mch })?;
        match channel {
            Channel::Mem => self.mem.store(mar, mdr)?,
            Channel::Cst => self.cst.store(mar, mdr)?,
            Channel::Inp => match mar {
                0 => {
                    // The input stream cannot be written to.
                    tracing::debug!("ignoring write of byte {:#04x} to the input stream", mdr & 0xFF);
                }
                1 => self.host.disk_seek(mdr)?,
                _ => {
                    tracing::warn!("write to unimplemented address {mar} on the input channel");
                }
            },
            Channel::Out => match mar {
                0 => self.host.write_output((mdr & 0xFF) as u8)?,
                1 => self.host.disk_write((mdr & 0xFF) as u8)?,
                _ => {
                    tracing::warn!("write to unimplemented address {mar} on the output channel");
                }
            },
        }
        Ok(())
    }

    fn load(&mut self) -> Result<()> {
        let mch = self.register(Register::Mch);
        let mar = self.register(Register::Mar);
        let channel =
            Channel::from_word(mch).ok_or(RunError::UnknownChannel { channel: mch })?;
        let value = match channel {
            Channel::Mem => self.mem.load(mar)?,
            Channel::Cst => self.cst.load(mar)?,
            Channel::Inp => match mar {
                0 => match self.host.read_input()? {
                    Some(byte) => Word::from(byte),
                    None => Word::MAX,
                },
                1 => self.host.disk_position()?,
                _ => {
                    tracing::warn!("read from unimplemented address {mar} on the input channel");
                    return Ok(());
                }
            },
            Channel::Out => match mar {
                0 => {
                    // The output stream has nothing to read back.
                    tracing::warn!("read from the output stream yields zero");
                    0
                }
                1 => match self.host.disk_read()? {
                    Some(byte) => Word::from(byte),
                    None => Word::MAX,
                },
                _ => {
                    tracing::warn!("read from unimplemented address {mar} on the output channel");
                    return Ok(());
                }
            },
        };
        self.set(Register::Mdr, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::MemHost;

    fn vm(rom: Vec<Word>) -> Vm<MemHost> {
        Vm::new(rom, MemHost::new())
    }

    #[test]
    fn boot_state() {
        let vm = vm(vec![27]);
        assert_eq!(vm.register(Register::Cea), 0);
        assert_eq!(vm.register(Register::Csp), Word::MAX);
        assert_eq!(vm.register(Register::Acc), 0);
        assert!(vm.callstack().is_empty());
    }

    #[test]
    fn place_validates_the_register_operand() {
        let mut machine = vm(vec![0, 42, 3, 27]);
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Acc), 42);

        let mut machine = vm(vec![0, 42, 7, 27]);
        assert!(matches!(
            machine.run(),
            Err(RunError::UnknownRegister { index: 7 })
        ));
    }

    #[test]
    fn move_copies_between_registers() {
        // pl 9 acc; mv acc dat; fi
        let mut machine = vm(vec![0, 9, 3, 1, 3, 4, 27]);
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Dat), 9);
    }

    #[test]
    fn jumps_cancel_the_post_increment() {
        // jm 3; fi (unreached); fi
        let mut machine = vm(vec![4, 3, 27, 27]);
        assert_eq!(machine.step().expect("step"), Step::Continue);
        assert_eq!(machine.register(Register::Cea), 3);
    }

    #[test]
    fn conditional_jumps_test_the_accumulator() {
        // ACC = 0: js falls through to its operand's successor.
        let mut machine = vm(vec![5, 9, 27]);
        machine.step().expect("step");
        assert_eq!(machine.register(Register::Cea), 2);

        // ACC = 0: jc takes the jump.
        let mut machine = vm(vec![6, 9, 27]);
        machine.step().expect("step");
        assert_eq!(machine.register(Register::Cea), 9);
    }

    #[test]
    fn accumulator_arithmetic_wraps() {
        // pl MAX acc; pl 1 dat; a+; fi
        let mut machine = vm(vec![0, Word::MAX, 3, 0, 1, 4, 7, 27]);
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Acc), 0);
    }

    #[test]
    fn division_by_zero_faults() {
        // pl 1 acc; a/ with DAT = 0
        let mut machine = vm(vec![0, 1, 3, 13, 27]);
        assert!(matches!(machine.run(), Err(RunError::DivideByZero)));
    }

    #[test]
    fn comparisons_yield_zero_or_one() {
        // pl 5 acc; pl 5 dat; eq; fi
        let mut machine = vm(vec![0, 5, 3, 0, 5, 4, 23, 27]);
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Acc), 1);
    }

    #[test]
    fn call_and_return_balance() {
        // cl 3; fi; sub: pl 42 acc; rt
        let rom = vec![25, 3, 27, 0, 42, 3, 26];
        let mut machine = vm(rom);
        machine.step().expect("cl");
        assert_eq!(machine.register(Register::Csp), 0);
        assert_eq!(machine.callstack().as_slice(), &[0]);
        machine.run().expect("run to halt");
        assert_eq!(machine.register(Register::Acc), 42);
        assert_eq!(machine.register(Register::Csp), Word::MAX);
        assert!(machine.callstack().is_empty());
    }

    #[test]
    fn return_without_call_underflows() {
        let mut machine = vm(vec![26, 27]);
        assert!(matches!(machine.run(), Err(RunError::CallstackUnderflow)));
    }

    #[test]
    fn nested_calls_keep_length_one_past_csp() {
        // cl 3; fi; a: cl 6; rt; b: rt
        let rom = vec![25, 3, 27, 25, 6, 26, 26];
        let mut machine = vm(rom);
        machine.step().expect("outer cl");
        machine.step().expect("inner cl");
        assert_eq!(machine.register(Register::Csp), 1);
        assert_eq!(machine.callstack().len(), 2);
        machine.step().expect("inner rt");
        assert_eq!(machine.register(Register::Csp), 0);
        assert_eq!(machine.callstack().len(), 1);
        machine.run().expect("run to halt");
        assert_eq!(machine.register(Register::Csp), Word::MAX);
    }

    #[test]
    fn memory_channel_stores_and_loads_past_the_rom() {
        // pl 50 mar; pl 5 mdr; st; pl 0 mdr; ld; fi
        let rom = vec![0, 50, 1, 0, 5, 2, 2, 0, 0, 2, 3, 27];
        let mut machine = vm(rom);
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Mdr), 5);
        assert_eq!(machine.memory().get(50), Some(5));
        assert_eq!(machine.memory().len(), 51);
    }

    #[test]
    fn callstack_channel_allows_raw_access() {
        // pl 3 mch; pl 2 mar; pl 77 mdr; st; fi
        let rom = vec![0, 3, 0, 0, 2, 1, 0, 77, 2, 2, 27];
        let mut machine = vm(rom);
        machine.run().expect("run");
        assert_eq!(machine.callstack().get(2), Some(77));
        assert_eq!(machine.callstack().len(), 3);
    }

    #[test]
    fn input_channel_reads_bytes_then_all_bits_set_at_eof() {
        // pl 1 mch; ld; ld; fi
        let rom = vec![0, 1, 0, 3, 3, 27];
        let mut machine = Vm::new(rom, MemHost::with_input(b"X"));
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Mdr), Word::MAX);
    }

    #[test]
    fn output_channel_write_uses_the_low_byte() {
        // pl 2 mch; pl 0x141 mdr; st; fi
        let rom = vec![0, 2, 0, 0, 0x141, 2, 2, 27];
        let mut machine = vm(rom);
        machine.run().expect("run");
        assert_eq!(machine.host().output, vec![0x41]);
    }

    #[test]
    fn load_from_output_stream_yields_zero() {
        // pl 2 mch; pl 9 mdr; ld; fi
        let rom = vec![0, 2, 0, 0, 9, 2, 3, 27];
        let mut machine = vm(rom);
        machine.run().expect("run");
        assert_eq!(machine.register(Register::Mdr), 0);
    }

    #[test]
    fn unimplemented_addresses_warn_but_do_not_fault() {
        // pl 1 mch; pl 4 mar; pl 9 mdr; ld; st; fi
        let rom = vec![0, 1, 0, 0, 4, 1, 0, 9, 2, 3, 2, 27];
        let mut machine = vm(rom);
        machine.run().expect("run");
        // MDR untouched by the unimplemented read.
        assert_eq!(machine.register(Register::Mdr), 9);
    }

    #[test]
    fn unknown_channel_faults() {
        // pl 4 mch; st
        let mut machine = vm(vec![0, 4, 0, 2, 27]);
        assert!(matches!(
            machine.run(),
            Err(RunError::UnknownChannel { channel: 4 })
        ));
    }

    #[test]
    fn unknown_opcode_faults_with_its_address() {
        let mut machine = vm(vec![99]);
        assert!(matches!(
            machine.run(),
            Err(RunError::UnknownOpcode {
                opcode: 99,
                address: 0
            })
        ));
    }
}
