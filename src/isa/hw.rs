use super::opcode::OpCode;
use num_traits::FromPrimitive;
use static_assertions::const_assert_eq;
use std::convert::TryInto;

pub type Byte = u8;
pub type Word = u32;

pub const BYTE_WIDTH: u32 = 8;
pub const WORD_BYTES: Word = 4;

const_assert_eq!(WORD_BYTES as usize, std::mem::size_of::<Word>());

/// All multi-byte quantities in an image are little-endian, whatever the host.
pub fn words_to_bytes(words: &[Word]) -> Vec<Byte> {
    words.iter().flat_map(|w| w.to_le_bytes().to_vec()).collect()
}

// Returns none if the data is not a whole number of words.
pub fn bytes_to_words(bytes: &[Byte]) -> Option<Vec<Word>> {
    if bytes.len() % WORD_BYTES as usize != 0 {
        return None;
    }

    bytes
        .chunks(WORD_BYTES as usize)
        .map(|ch| ch.try_into().ok().map(Word::from_le_bytes))
        .collect()
}

pub fn sign_extend_byte(b: Byte) -> Word {
    b as i8 as i32 as Word
}

pub fn sign_extend_half(h: u16) -> Word {
    h as i16 as i32 as Word
}

/*
    Instruction words are laid out as follows (each character is a bit):

        OOOOOOOO AAAAAAAA SSSSSSSS DDDDDDDD

    From right-to-left we have (D) the destination register or low operand,
    (S) the source register, immediate or near displacement, (A) the auxiliary
    byte (a callout function index, or the displacement of a near conditional
    branch), and finally (O) the opcode.

    16-bit immediates occupy both (S) and (A), so that (D) can still name the
    destination register. Some opcodes are followed by one or two further
    words holding wide immediates, memory addresses or branch displacements;
    those are not part of the `Inst`.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inst {
    pub opcode: OpCode,
    pub dest: Byte,
    pub src: Byte,
    pub aux: Byte,
}

impl Inst {
    pub const DEST_SHIFT: u32 = 0;
    pub const SRC_SHIFT: u32 = BYTE_WIDTH;
    pub const AUX_SHIFT: u32 = 2 * BYTE_WIDTH;
    pub const OPCODE_SHIFT: u32 = 3 * BYTE_WIDTH;

    const BYTE_MASK: Word = 0xFF;

    pub const fn new(opcode: OpCode) -> Inst {
        Inst {
            opcode,
            dest: 0,
            src: 0,
            aux: 0,
        }
    }

    pub fn wide(&self) -> u16 {
        u16::from_le_bytes([self.src, self.aux])
    }

    pub fn set_wide(&mut self, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.src = lo;
        self.aux = hi;
    }

    pub fn encode(&self) -> Word {
        ((self.opcode as Word) << Inst::OPCODE_SHIFT)
            | ((self.aux as Word) << Inst::AUX_SHIFT)
            | ((self.src as Word) << Inst::SRC_SHIFT)
            | ((self.dest as Word) << Inst::DEST_SHIFT)
    }

    pub fn decode_opcode(word: Word) -> Result<OpCode, Byte> {
        let raw = (word >> Inst::OPCODE_SHIFT) as Byte;
        OpCode::from_u8(raw).ok_or(raw)
    }

    /// Fails with the raw opcode byte if it names no known operation.
    pub fn decode(word: Word) -> Result<Inst, Byte> {
        Ok(Inst {
            opcode: Inst::decode_opcode(word)?,
            dest: ((word >> Inst::DEST_SHIFT) & Inst::BYTE_MASK) as Byte,
            src: ((word >> Inst::SRC_SHIFT) & Inst::BYTE_MASK) as Byte,
            aux: ((word >> Inst::AUX_SHIFT) & Inst::BYTE_MASK) as Byte,
        })
    }
}
