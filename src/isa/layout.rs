use super::hw::{sign_extend_byte, sign_extend_half, Byte, Word, WORD_BYTES};
use std::fmt::Display;

/// The range of values an immediate operand accepts. Immediates are carried
/// as the 32-bit pattern the source text denoted, so signed ranges are tested
/// against that pattern reinterpreted as an `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmRange {
    Unsigned8,
    Signed8,
    Unsigned16,
    Signed16,
    Bit,
    Any,
}

impl ImmRange {
    pub const BIT_COUNT: Word = 32;

    pub fn contains(self, val: Word) -> bool {
        let signed = val as i32;
        match self {
            ImmRange::Unsigned8 => val <= Byte::MAX as Word,
            ImmRange::Signed8 => (i8::MIN as i32..=i8::MAX as i32).contains(&signed),
            ImmRange::Unsigned16 => val <= u16::MAX as Word,
            ImmRange::Signed16 => (i16::MIN as i32..=i16::MAX as i32).contains(&signed),
            ImmRange::Bit => val < ImmRange::BIT_COUNT,
            ImmRange::Any => true,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, ImmRange::Signed8 | ImmRange::Signed16)
    }

    /// Undoes the truncation performed when the value was packed into a field.
    pub fn widen(self, field: Word) -> Word {
        match self {
            ImmRange::Signed8 => sign_extend_byte(field as Byte),
            ImmRange::Signed16 => sign_extend_half(field as u16),
            _ => field,
        }
    }

    pub fn format(self, val: Word) -> String {
        match self {
            ImmRange::Any => format!("{:#x}", val),
            range if range.is_signed() => format!("{}", val as i32),
            _ => format!("{}", val),
        }
    }
}

impl Display for ImmRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImmRange::Unsigned8 => write!(f, "0..=255"),
            ImmRange::Signed8 => write!(f, "-128..=127"),
            ImmRange::Unsigned16 => write!(f, "0..=65535"),
            ImmRange::Signed16 => write!(f, "-32768..=32767"),
            ImmRange::Bit => write!(f, "bit index 0..=31"),
            ImmRange::Any => write!(f, "any 32-bit value"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachError {
    WrongDirection(Direction),
    OutOfRange,
}

/// How far, and in which direction, a branch encoding can reach. The
/// displacement is always measured from the end of the whole instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Far,
    Near,
    NearForward,
    NearBackward,
}

impl Reach {
    const BACKWARD_SPAN: i32 = 256;

    pub fn is_near(self) -> bool {
        self != Reach::Far
    }

    pub fn pack(self, disp: i32) -> Result<Word, ReachError> {
        match self {
            Reach::Far => Ok(disp as Word),
            Reach::Near => {
                if (i8::MIN as i32..=i8::MAX as i32).contains(&disp) {
                    Ok(disp as i8 as Byte as Word)
                } else {
                    Err(ReachError::OutOfRange)
                }
            }
            Reach::NearForward => match disp {
                d if d < 0 => Err(ReachError::WrongDirection(Direction::Forward)),
                d if d > 0 && d <= i8::MAX as i32 => Ok(d as Word),
                _ => Err(ReachError::OutOfRange),
            },
            Reach::NearBackward => match disp {
                d if d >= 0 => Err(ReachError::WrongDirection(Direction::Backward)),
                d if d >= -Reach::BACKWARD_SPAN => {
                    Ok(((Reach::BACKWARD_SPAN + d) as Word) & Byte::MAX as Word)
                }
                _ => Err(ReachError::OutOfRange),
            },
        }
    }

    pub fn unpack(self, field: Word) -> i32 {
        match self {
            Reach::Far => field as i32,
            Reach::Near => field as Byte as i8 as i32,
            Reach::NearForward => field as i32,
            Reach::NearBackward => (field as Byte) as i32 - Reach::BACKWARD_SPAN,
        }
    }
}

impl Display for Reach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reach::Far => write!(f, "32-bit"),
            Reach::Near => write!(f, "-128..=127 bytes"),
            Reach::NearForward => write!(f, "1..=127 bytes forward"),
            Reach::NearBackward => write!(f, "1..=256 bytes backward"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Reg,
    Imm(ImmRange),
    Target(Reach),
}

/// Where in the encoded instruction an operand lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Dest,
    Src,
    Aux,
    Wide,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: Kind,
    pub slot: Slot,
}

impl Operand {
    pub const fn new(kind: Kind, slot: Slot) -> Self {
        Operand { kind, slot }
    }
}

/// The operands of an opcode in source order.
pub type Layout = &'static [Operand];

pub fn trailing_words(layout: Layout) -> usize {
    layout
        .iter()
        .filter(|op| op.slot == Slot::Trailing)
        .count()
}

pub fn width(layout: Layout) -> Word {
    WORD_BYTES * (1 + trailing_words(layout) as Word)
}
