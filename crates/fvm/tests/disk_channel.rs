//! The disk behind the INP/OUT channels at MAR=1: seeking via stores on
//! the input side, byte traffic on the output side.

use fvm::test_harness::{run_program_with_host, MemHost};
use fvm::{Register, Word};

#[test]
fn disk_bytes_write_then_read_back() {
    let source = "
        pl [2]d mch     ; output channel
        pl [1]d mar     ; disk
        pl [41]x mdr
        st              ; disk[0] = 'A'
        pl [42]x mdr
        st              ; disk[1] = 'B'

        pl [1]d mch     ; input channel
        pl [0]d mdr
        st              ; seek back to offset 0

        pl [2]d mch
        ld              ; read disk[0] back
        fi
    ";
    let vm = run_program_with_host(source, MemHost::new());
    assert_eq!(vm.host().disk_contents(), b"AB");
    assert_eq!(vm.register(Register::Mdr), Word::from(b'A'));
}

#[test]
fn disk_position_reads_back_through_the_input_channel() {
    let source = "
        pl [2]d mch
        pl [1]d mar
        pl [58]x mdr
        st
        st              ; two bytes written, position is now 2

        pl [1]d mch
        ld              ; position into mdr
        fi
    ";
    let vm = run_program_with_host(source, MemHost::new());
    assert_eq!(vm.register(Register::Mdr), 2);
}

#[test]
fn seek_positions_an_overwrite() {
    let source = "
        pl [1]d mch
        pl [1]d mar
        pl [1]d mdr
        st              ; seek to offset 1

        pl [2]d mch
        pl [5a]x mdr
        st              ; overwrite the middle byte
        fi
    ";
    let host = MemHost::new().with_disk(b"xyz".to_vec());
    let vm = run_program_with_host(source, host);
    assert_eq!(vm.host().disk_contents(), b"xZz");
}

#[test]
fn reading_past_the_end_of_the_disk_yields_all_bits_set() {
    let source = "
        pl [2]d mch
        pl [1]d mar
        ld
        fi
    ";
    let vm = run_program_with_host(source, MemHost::new());
    assert_eq!(vm.register(Register::Mdr), Word::MAX);
}
