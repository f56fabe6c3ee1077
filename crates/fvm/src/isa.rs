//! The machine's vocabulary: words, instructions, registers, and memory
//! channels. Both the assembler and the runtime agree on the numbering
//! defined here.

/// The machine's universal unit. Main memory, the callstack, registers,
/// and the ROM image are all sequences of these.
pub type Word = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// `pl <value> <register>` — place a value into a register.
    Pl = 0,
    /// `mv <src> <dst>` — copy one register into another.
    Mv = 1,
    /// `st` — write MDR to the location selected by (MCH, MAR).
    St = 2,
    /// `ld` — read the location selected by (MCH, MAR) into MDR.
    Ld = 3,
    /// `jm <address>` — unconditional jump.
    Jm = 4,
    /// `js <address>` — jump if ACC is non-zero.
    Js = 5,
    /// `jc <address>` — jump if ACC is zero.
    Jc = 6,
    Add = 7,
    Sub = 8,
    Not = 9,
    Inc = 10,
    Dec = 11,
    Mul = 12,
    Div = 13,
    And = 14,
    Or = 15,
    Xor = 16,
    Shl = 17,
    Shr = 18,
    Gt = 19,
    Lt = 20,
    Ge = 21,
    Le = 22,
    Eq = 23,
    Ne = 24,
    /// `cl <address>` — push CEA onto the callstack and jump.
    Cl = 25,
    /// `rt` — pop the callstack and resume after the matching call.
    Rt = 26,
    /// `fi` — halt.
    Fi = 27,
}

impl Opcode {
    #[must_use]
    pub const fn from_word(word: Word) -> Option<Self> {
        Some(match word {
            0 => Self::Pl,
            1 => Self::Mv,
            2 => Self::St,
            3 => Self::Ld,
            4 => Self::Jm,
            5 => Self::Js,
            6 => Self::Jc,
            7 => Self::Add,
            8 => Self::Sub,
            9 => Self::Not,
            10 => Self::Inc,
            11 => Self::Dec,
            12 => Self::Mul,
            13 => Self::Div,
            14 => Self::And,
            15 => Self::Or,
            16 => Self::Xor,
            17 => Self::Shl,
            18 => Self::Shr,
            19 => Self::Gt,
            20 => Self::Lt,
            21 => Self::Ge,
            22 => Self::Le,
            23 => Self::Eq,
            24 => Self::Ne,
            25 => Self::Cl,
            26 => Self::Rt,
            27 => Self::Fi,
            _ => return None,
        })
    }

    #[must_use]
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Some(match text {
            "pl" => Self::Pl,
            "mv" => Self::Mv,
            "st" => Self::St,
            "ld" => Self::Ld,
            "jm" => Self::Jm,
            "js" => Self::Js,
            "jc" => Self::Jc,
            "a+" => Self::Add,
            "a-" => Self::Sub,
            "a!" => Self::Not,
            "ai" => Self::Inc,
            "ad" => Self::Dec,
            "a*" => Self::Mul,
            "a/" => Self::Div,
            "a&" => Self::And,
            "a|" => Self::Or,
            "a^" => Self::Xor,
            "al" => Self::Shl,
            "ar" => Self::Shr,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "ge" => Self::Ge,
            "le" => Self::Le,
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "cl" => Self::Cl,
            "rt" => Self::Rt,
            "fi" => Self::Fi,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Pl => "pl",
            Self::Mv => "mv",
            Self::St => "st",
            Self::Ld => "ld",
            Self::Jm => "jm",
            Self::Js => "js",
            Self::Jc => "jc",
            Self::Add => "a+",
            Self::Sub => "a-",
            Self::Not => "a!",
            Self::Inc => "ai",
            Self::Dec => "ad",
            Self::Mul => "a*",
            Self::Div => "a/",
            Self::And => "a&",
            Self::Or => "a|",
            Self::Xor => "a^",
            Self::Shl => "al",
            Self::Shr => "ar",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Ge => "ge",
            Self::Le => "le",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Cl => "cl",
            Self::Rt => "rt",
            Self::Fi => "fi",
        }
    }

    /// How many words follow the opcode in the instruction stream.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Pl | Self::Mv => 2,
            Self::Jm | Self::Js | Self::Jc | Self::Cl => 1,
            _ => 0,
        }
    }
}

impl TryFrom<Word> for Opcode {
    type Error = ();

    fn try_from(value: Word) -> std::result::Result<Self, Self::Error> {
        Self::from_word(value).ok_or(())
    }
}

/// The register file: seven words, all starting at zero except CSP,
/// which boots as all-bits-set to mark an empty callstack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Mch = 0,
    Mar = 1,
    Mdr = 2,
    Acc = 3,
    Dat = 4,
    Cea = 5,
    Csp = 6,
}

pub const REGISTER_COUNT: usize = 7;

impl Register {
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::Mch,
        Self::Mar,
        Self::Mdr,
        Self::Acc,
        Self::Dat,
        Self::Cea,
        Self::Csp,
    ];

    #[must_use]
    pub const fn from_word(word: Word) -> Option<Self> {
        Some(match word {
            0 => Self::Mch,
            1 => Self::Mar,
            2 => Self::Mdr,
            3 => Self::Acc,
            4 => Self::Dat,
            5 => Self::Cea,
            6 => Self::Csp,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Mch => "MCH (Memory Channel)",
            Self::Mar => "MAR (Memory Address Register)",
            Self::Mdr => "MDR (Memory Data Register)",
            Self::Acc => "ACC (Accumulator)",
            Self::Dat => "DAT (Data)",
            Self::Cea => "CEA (Current Execution Address)",
            Self::Csp => "CSP (Callstack Pointer)",
        }
    }
}

/// The four addressable namespaces selected by MCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    Mem = 0,
    Inp = 1,
    Out = 2,
    Cst = 3,
}

impl Channel {
    #[must_use]
    pub const fn from_word(word: Word) -> Option<Self> {
        Some(match word {
            0 => Self::Mem,
            1 => Self::Inp,
            2 => Self::Out,
            3 => Self::Cst,
            _ => return None,
        })
    }
}
