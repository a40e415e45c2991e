use super::opcode::OpCode;
use strum_macros::{Display, EnumIter};

/// The condition tested by a conditional branch. Each condition has a far form
/// (32-bit displacement in a trailing word) and a near form (signed 8-bit
/// displacement in the auxiliary byte); the operands tested are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Cond {
    A,
    Ae,
    B,
    Be,
    E,
    Ne,
    G,
    Ge,
    L,
    Le,
    Z,
    Nz,
    Set,
    Clear,
}

impl Cond {
    pub fn far(self) -> OpCode {
        match self {
            Cond::A => OpCode::Ja,
            Cond::Ae => OpCode::Jae,
            Cond::B => OpCode::Jb,
            Cond::Be => OpCode::Jbe,
            Cond::E => OpCode::Je,
            Cond::Ne => OpCode::Jne,
            Cond::G => OpCode::Jg,
            Cond::Ge => OpCode::Jge,
            Cond::L => OpCode::Jl,
            Cond::Le => OpCode::Jle,
            Cond::Z => OpCode::Jz,
            Cond::Nz => OpCode::Jnz,
            Cond::Set => OpCode::Jset,
            Cond::Clear => OpCode::Jclear,
        }
    }

    pub fn near(self) -> OpCode {
        match self {
            Cond::A => OpCode::JaNear,
            Cond::Ae => OpCode::JaeNear,
            Cond::B => OpCode::JbNear,
            Cond::Be => OpCode::JbeNear,
            Cond::E => OpCode::JeNear,
            Cond::Ne => OpCode::JneNear,
            Cond::G => OpCode::JgNear,
            Cond::Ge => OpCode::JgeNear,
            Cond::L => OpCode::JlNear,
            Cond::Le => OpCode::JleNear,
            Cond::Z => OpCode::JzNear,
            Cond::Nz => OpCode::JnzNear,
            Cond::Set => OpCode::JsetNear,
            Cond::Clear => OpCode::JclearNear,
        }
    }

    pub fn far_mnemonic(self) -> String {
        format!("j{}", self)
    }

    pub fn near_mnemonic(self) -> String {
        format!("j{}near", self)
    }
}
