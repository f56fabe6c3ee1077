//! Fatal faults and the traceback that accompanies them.

use fvm::test_harness::{assemble_clean, MemHost};
use fvm::{traceback, RunError, Vm};

#[test]
fn unknown_instruction_faults_at_its_address() {
    let rom = assemble_clean("[63]x fi");
    let mut vm = Vm::new(rom, MemHost::new());
    let err = vm.run().expect_err("99 is not an instruction");
    assert!(matches!(
        err,
        RunError::UnknownOpcode {
            opcode: 99,
            address: 0
        }
    ));
}

#[test]
fn callstack_underflow_on_unmatched_return() {
    let rom = assemble_clean("rt fi");
    let mut vm = Vm::new(rom, MemHost::new());
    let err = vm.run().expect_err("nothing to return to");
    assert!(matches!(err, RunError::CallstackUnderflow));
    assert_eq!(err.to_string(), "callstack underflow");
}

#[test]
fn division_by_zero_is_reported_not_trapped() {
    let rom = assemble_clean("pl [1]d acc pl [0]d dat a/ fi");
    let mut vm = Vm::new(rom, MemHost::new());
    assert!(matches!(vm.run(), Err(RunError::DivideByZero)));
}

#[test]
fn placing_into_an_unknown_register_faults() {
    let rom = assemble_clean("pl [1]d [9]d fi");
    let mut vm = Vm::new(rom, MemHost::new());
    assert!(matches!(
        vm.run(),
        Err(RunError::UnknownRegister { index: 9 })
    ));
}

#[test]
fn storing_through_an_unknown_channel_faults() {
    let rom = assemble_clean("pl [7]d mch st fi");
    let mut vm = Vm::new(rom, MemHost::new());
    assert!(matches!(
        vm.run(),
        Err(RunError::UnknownChannel { channel: 7 })
    ));
}

#[test]
fn traceback_marks_the_fault_site_and_live_frames() {
    // Call into a subroutine whose body is not an instruction.
    let rom = assemble_clean("cl sub fi sub: [63]x");
    let mut vm = Vm::new(rom, MemHost::new());
    vm.run().expect_err("fault inside the subroutine");

    let report = traceback(&vm);
    assert!(report.contains("--- Registers ---"));
    assert!(report.contains("--- Callstack ---"));
    assert!(report.contains("--- Main Memory ---"));
    // The return address (the call site, address 0) is the live frame.
    assert!(report.contains("\t0\t0\t<- CSP"));
    // The fetch that faulted is marked in memory.
    assert!(report.contains("\t3\t99\t<- CEA"));
}
