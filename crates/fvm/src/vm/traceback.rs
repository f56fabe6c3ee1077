//! Human-readable dump of the machine state, produced when the runtime
//! faults: the register file, the callstack top-first with the CSP row
//! marked, and main memory with CEA (and MAR, when main memory is the
//! selected channel) marked.

use std::fmt;

use super::Vm;
use crate::isa::{Channel, Register, Word};

struct Traceback<'a, H>(&'a Vm<H>);

impl<H> fmt::Display for Traceback<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vm = self.0;

        writeln!(f, "Traceback:")?;
        writeln!(f, "\t--- Registers ---")?;
        writeln!(f, "\tNumber\tName                           \tCurrent Value")?;
        for register in Register::ALL {
            writeln!(
                f,
                "\t{}\t{:<31}\t{}",
                register as u8,
                register.description(),
                vm.register(register)
            )?;
        }

        let csp = vm.register(Register::Csp);
        writeln!(f, "\t--- Callstack ---")?;
        writeln!(f, "\tAddress\tValue")?;
        for address in (0..vm.callstack().len()).rev() {
            let marker = if address as Word == csp { "\t<- CSP" } else { "" };
            let value = vm.callstack().get(address).unwrap_or(0);
            writeln!(f, "\t{address}\t{value}{marker}")?;
        }

        let cea = vm.register(Register::Cea);
        let mar = vm.register(Register::Mar);
        let mar_in_mem = vm.register(Register::Mch) == Channel::Mem as Word;
        writeln!(f, "\t--- Main Memory ---")?;
        writeln!(f, "\tAddress\tValue")?;
        for address in 0..vm.memory().len() {
            let cea_marker = if address as Word == cea { "\t<- CEA" } else { "" };
            let mar_marker = if mar_in_mem && address as Word == mar {
                "\t<- MAR"
            } else {
                ""
            };
            let value = vm.memory().get(address).unwrap_or(0);
            writeln!(f, "\t{address}\t{value}{cea_marker}{mar_marker}")?;
        }

        Ok(())
    }
}

/// Renders the fault report for the machine's current state.
#[must_use]
pub fn traceback<H>(vm: &Vm<H>) -> String {
    Traceback(vm).to_string()
}
