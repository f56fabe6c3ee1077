use crate::isa::Word;

/// Fatal runtime faults. Each one aborts execution and is reported to
/// the operator together with a traceback of the machine state.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("encountered unknown instruction '{opcode}' at address {address}")]
    UnknownOpcode { opcode: Word, address: Word },

    #[error("attempted to use unknown register '{index}'")]
    UnknownRegister { index: Word },

    #[error("attempted access through unknown memory channel '{channel}'")]
    UnknownChannel { channel: Word },

    #[error("callstack underflow")]
    CallstackUnderflow,

    #[error("accumulator division by zero")]
    DivideByZero,

    #[error("could not grow a memory channel to cover the requested address")]
    Allocation,

    #[error("host I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunError>;
