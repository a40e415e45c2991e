use super::layout::{ImmRange, Kind, Layout, Operand, Reach, Slot};
use num_derive::FromPrimitive;
use strum_macros::EnumIter;

/// Every operation the engine understands. The discriminant is the value of the
/// top byte of the instruction word; the numbering is part of the image format
/// and must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
#[repr(u8)]
pub enum OpCode {
    MainLoop = 0,
    Dump,
    Exit,
    Load16Signed,
    Load16Unsigned,
    Load32,
    Load8Signed,
    Load8Unsigned,
    Mov,
    MovImm16Signed,
    MovImm32,
    MovImm8Signed,
    Store16,
    Store32,
    Store8,
    WriteMemory16,
    WriteMemory32,
    WriteMemory8,
    Sar,
    SarImm8,
    Shl,
    ShlImm8,
    Shr,
    ShrImm8,
    Add,
    AddImm32,
    AddImm8,
    Div,
    DivImm8,
    Idiv,
    IdivImm8,
    Imod,
    ImodImm8,
    Imul,
    ImulImm8,
    Mod,
    ModImm8,
    Mul,
    Mul10,
    Mul100,
    MulImm8,
    Neg,
    Sub,
    SubImm8,
    LogicalAnd,
    LogicalNot,
    LogicalOr,
    And,
    AndImm8,
    ClearBitImm8,
    InvertBitImm8,
    Not,
    Or,
    OrImm8,
    SetBitImm8,
    Xor,
    XorImm8,
    Call,
    CallRegisterIndirect,
    CallRelativeNearBackward,
    CallRelativeNearForward,
    Ret,
    Alloca,
    Drop,
    GetStackRelative,
    Pop,
    Push,
    PutStackRelative,
    DecJnz,
    DecJnzNear,
    Ja,
    JaNear,
    Jae,
    JaeNear,
    Jb,
    JbNear,
    Jbe,
    JbeNear,
    Jclear,
    JclearNear,
    Je,
    JeNear,
    Jg,
    JgNear,
    Jge,
    JgeNear,
    Jl,
    JlNear,
    Jle,
    JleNear,
    Jne,
    JneNear,
    Jnz,
    JnzNear,
    Jset,
    JsetNear,
    Jump,
    JumpNear,
    JumpRelativeNear,
    Jz,
    JzNear,
    Loop,
    Repeat,
    Putchar,
    Callout,
    Print,
    PrintHex,
}

const fn reg(slot: Slot) -> Operand {
    Operand::new(Kind::Reg, slot)
}

const fn imm(range: ImmRange, slot: Slot) -> Operand {
    Operand::new(Kind::Imm(range), slot)
}

const fn target(reach: Reach, slot: Slot) -> Operand {
    Operand::new(Kind::Target(reach), slot)
}

const BARE: Layout = &[];
const REG: Layout = &[reg(Slot::Dest)];
const REG_REG: Layout = &[reg(Slot::Dest), reg(Slot::Src)];

const REG_IMM8: Layout = &[reg(Slot::Dest), imm(ImmRange::Unsigned8, Slot::Src)];
const REG_SIMM8: Layout = &[reg(Slot::Dest), imm(ImmRange::Signed8, Slot::Src)];
const REG_SIMM16: Layout = &[reg(Slot::Dest), imm(ImmRange::Signed16, Slot::Wide)];
const REG_IMM32: Layout = &[reg(Slot::Dest), imm(ImmRange::Any, Slot::Trailing)];
const REG_BIT: Layout = &[reg(Slot::Dest), imm(ImmRange::Bit, Slot::Src)];
const IMM8: Layout = &[imm(ImmRange::Unsigned8, Slot::Src)];

const CALLOUT: Layout = &[
    reg(Slot::Dest),
    reg(Slot::Src),
    imm(ImmRange::Unsigned8, Slot::Aux),
];

const WRITE8: Layout = &[
    imm(ImmRange::Any, Slot::Trailing),
    imm(ImmRange::Unsigned8, Slot::Src),
];
const WRITE16: Layout = &[
    imm(ImmRange::Any, Slot::Trailing),
    imm(ImmRange::Unsigned16, Slot::Trailing),
];
const WRITE32: Layout = &[
    imm(ImmRange::Any, Slot::Trailing),
    imm(ImmRange::Any, Slot::Trailing),
];

const FAR: Layout = &[target(Reach::Far, Slot::Trailing)];
const NEAR: Layout = &[target(Reach::Near, Slot::Src)];
const NEAR_FORWARD: Layout = &[target(Reach::NearForward, Slot::Src)];
const NEAR_BACKWARD: Layout = &[target(Reach::NearBackward, Slot::Src)];

const REG_FAR: Layout = &[reg(Slot::Dest), target(Reach::Far, Slot::Trailing)];
const REG_NEAR_BACKWARD: Layout = &[reg(Slot::Dest), target(Reach::NearBackward, Slot::Src)];

// Conditional branches keep their comparands in (D) and (S), so the near
// forms carry the displacement in the auxiliary byte.
const TEST_FAR: Layout = REG_FAR;
const TEST_NEAR: Layout = &[reg(Slot::Dest), target(Reach::Near, Slot::Aux)];
const COMPARE_FAR: Layout = &[
    reg(Slot::Dest),
    reg(Slot::Src),
    target(Reach::Far, Slot::Trailing),
];
const COMPARE_NEAR: Layout = &[
    reg(Slot::Dest),
    reg(Slot::Src),
    target(Reach::Near, Slot::Aux),
];
const BIT_FAR: Layout = &[
    reg(Slot::Dest),
    imm(ImmRange::Bit, Slot::Src),
    target(Reach::Far, Slot::Trailing),
];
const BIT_NEAR: Layout = &[
    reg(Slot::Dest),
    imm(ImmRange::Bit, Slot::Src),
    target(Reach::Near, Slot::Aux),
];

impl OpCode {
    pub fn layout(self) -> Layout {
        use OpCode::*;

        match self {
            MainLoop | Dump | Exit | Ret => BARE,

            Neg | Not | LogicalNot | Mul10 | Mul100 | Push | Pop | CallRegisterIndirect
            | Repeat | Putchar => REG,

            Load16Signed | Load16Unsigned | Load32 | Load8Signed | Load8Unsigned | Store16
            | Store32 | Store8 | Mov | Sar | Shl | Shr | Add | Div | Idiv | Imod | Imul | Mod
            | Mul | Sub | LogicalAnd | LogicalOr | And | Or | Xor | Loop => REG_REG,

            SarImm8 | ShlImm8 | ShrImm8 | AddImm8 | DivImm8 | ImulImm8 | ModImm8 | MulImm8
            | SubImm8 | AndImm8 | OrImm8 | XorImm8 | GetStackRelative | PutStackRelative
            | Print | PrintHex => REG_IMM8,

            MovImm8Signed | IdivImm8 | ImodImm8 => REG_SIMM8,
            MovImm16Signed => REG_SIMM16,
            MovImm32 | AddImm32 => REG_IMM32,
            ClearBitImm8 | InvertBitImm8 | SetBitImm8 => REG_BIT,
            Alloca | Drop => IMM8,
            Callout => CALLOUT,

            WriteMemory8 => WRITE8,
            WriteMemory16 => WRITE16,
            WriteMemory32 => WRITE32,

            Call | Jump => FAR,
            JumpNear | JumpRelativeNear => NEAR,
            CallRelativeNearForward => NEAR_FORWARD,
            CallRelativeNearBackward => NEAR_BACKWARD,
            DecJnz => REG_FAR,
            DecJnzNear => REG_NEAR_BACKWARD,

            Jz | Jnz => TEST_FAR,
            JzNear | JnzNear => TEST_NEAR,
            Ja | Jae | Jb | Jbe | Je | Jne | Jg | Jge | Jl | Jle => COMPARE_FAR,
            JaNear | JaeNear | JbNear | JbeNear | JeNear | JneNear | JgNear | JgeNear | JlNear
            | JleNear => COMPARE_NEAR,
            Jset | Jclear => BIT_FAR,
            JsetNear | JclearNear => BIT_NEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::layout;
    use num_traits::FromPrimitive;
    use strum::IntoEnumIterator;

    #[test]
    fn numbering_is_dense() {
        for (idx, op) in OpCode::iter().enumerate() {
            assert_eq!(op as usize, idx);
            assert_eq!(OpCode::from_usize(idx), Some(op));
        }
        assert_eq!(OpCode::PrintHex as u8, 106);
        assert_eq!(OpCode::from_u8(107), None);
    }

    #[test]
    fn fixed_numbering_spot_checks() {
        assert_eq!(OpCode::MovImm8Signed as u8, 11);
        assert_eq!(OpCode::Call as u8, 57);
        assert_eq!(OpCode::DecJnzNear as u8, 69);
        assert_eq!(OpCode::Jump as u8, 96);
        assert_eq!(OpCode::Callout as u8, 104);
    }

    fn field_bits(slot: Slot) -> u32 {
        match slot {
            Slot::Dest => 0b001,
            Slot::Src => 0b010,
            Slot::Aux => 0b100,
            Slot::Wide => 0b110,
            Slot::Trailing => 0,
        }
    }

    #[test]
    fn slots_are_not_shared() {
        for op in OpCode::iter() {
            let mut used = 0;
            for operand in op.layout() {
                let bits = field_bits(operand.slot);
                assert_eq!(used & bits, 0, "{:?} reuses a field", op);
                used |= bits;
            }
        }
    }

    #[test]
    fn widths() {
        assert_eq!(layout::width(OpCode::Exit.layout()), 4);
        assert_eq!(layout::width(OpCode::MovImm32.layout()), 8);
        assert_eq!(layout::width(OpCode::Jump.layout()), 8);
        assert_eq!(layout::width(OpCode::WriteMemory8.layout()), 8);
        assert_eq!(layout::width(OpCode::WriteMemory32.layout()), 12);
        assert_eq!(layout::width(OpCode::JlNear.layout()), 4);
    }
}
