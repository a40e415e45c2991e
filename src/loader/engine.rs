use crate::isa::hw::Word;
use log::warn;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt::Display;

/*
    The engine sees three disjoint regions. Each slice stands for a start/end
    pointer pair:

        program     the program section, read-only
        memory      `memory_mb` MiB of zeroed memory, then the data section
        stack       a zeroed stack of `stack_size` bytes

    It returns one 32-bit result. Values at or above `EXIT_FLAG` carry an exit
    code supplied by the program in their low 15 bits; values below index the
    fault taxonomy.
*/

pub struct Regions<'a> {
    pub program: &'a [u8],
    pub memory: &'a mut [u8],
    pub stack: &'a mut [u8],
}

/// Host services a running program may ask for.
pub trait Callout {
    fn call(&mut self, which: Word, param1: Word, param2: Word) -> Word;
}

/// The callout table of the reference host. Index 0 requests permission and
/// is always granted; indices 1 and 2 are reserved.
#[derive(Debug, Default)]
pub struct HostCallout;

impl Callout for HostCallout {
    fn call(&mut self, which: Word, _param1: Word, _param2: Word) -> Word {
        match which {
            0 | 1 | 2 => 0,
            _ => {
                warn!("invalid callout {:08x} specified", which);
                0
            }
        }
    }
}

pub trait Engine {
    fn run(
        &mut self,
        regions: Regions,
        callout: &mut dyn Callout,
        data_base: Word,
        data_length: Word,
    ) -> Word;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum Fault {
    ProgramBounds = 1,
    MemoryBounds = 2,
    StackBounds = 3,
    StackUnderflow = 4,
    StackOverflow = 5,
    InvalidAllocaParam = 6,
    DivideByZero = 7,
    CalloutImpossible = 8,
}

impl Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Fault::ProgramBounds => "Program ran out of bounds.",
            Fault::MemoryBounds => "Memory access out of bounds.",
            Fault::StackBounds => "Stack overflow or underflow.",
            Fault::StackUnderflow => "Stack underflow.",
            Fault::StackOverflow => "Stack overflow.",
            Fault::InvalidAllocaParam => "Invalid alloc parameter.",
            Fault::DivideByZero => "Divide by zero.",
            Fault::CalloutImpossible => "Callout impossible.",
        };
        write!(f, "{}", msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Exit(u16),
    Fault(Fault),
    Unknown(Word),
}

impl Outcome {
    pub const EXIT_FLAG: Word = 0x8000;
    const EXIT_MASK: Word = 0x7FFF;

    pub fn from_code(code: Word) -> Self {
        if code >= Outcome::EXIT_FLAG {
            return Outcome::Exit((code & Outcome::EXIT_MASK) as u16);
        }

        match code {
            0 => Outcome::Ok,
            code => Fault::from_u32(code).map_or(Outcome::Unknown(code), Outcome::Fault),
        }
    }

    /// The status the host process should exit with.
    pub fn exit_status(self) -> i32 {
        match self {
            Outcome::Ok => 0,
            Outcome::Exit(code) => code as i32,
            Outcome::Fault(fault) => -(fault as i32),
            Outcome::Unknown(code) => -(code as i32),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ok => write!(f, "OK."),
            Outcome::Exit(code) => write!(f, "Exit code {}.", code),
            Outcome::Fault(fault) => write!(f, "{}", fault),
            Outcome::Unknown(code) => write!(f, "Unknown error {}.", code),
        }
    }
}
