use crate::isa::{
    hw::{Byte, Word},
    layout::{Kind, Operand, Slot},
    OpCode,
};
use std::fmt::Display;

/*
    A mnemonic names a `Family`, an ordered list of `Variant`s. Each variant is
    one opcode, optionally with one of its fields fixed in advance (`inc r1` is
    `ADD_IMM8` with the source byte preset to 1). The operands a variant takes
    in source are the operands of its opcode's layout, minus the preset one.

    Choosing an encoding for a parsed line is two filters over the variants:
    first by operand shape (register, number, label), then by whether every
    immediate fits its field. The first survivor wins, so families list their
    narrowest encodings first.
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Reg(Byte),
    Imm(Word),
    Label(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Reg,
    Imm,
    Label,
}

impl Arg {
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Reg(_) => ArgKind::Reg,
            Arg::Imm(_) => ArgKind::Imm,
            Arg::Label(_) => ArgKind::Label,
        }
    }
}

impl From<Kind> for ArgKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Reg => ArgKind::Reg,
            Kind::Imm(_) => ArgKind::Imm,
            Kind::Target(_) => ArgKind::Label,
        }
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Reg(r) => write!(f, "r{}", r),
            Arg::Imm(val) => write!(f, "{}", val),
            Arg::Label(name) => write!(f, "{}", name),
        }
    }
}

impl Display for ArgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgKind::Reg => write!(f, "R"),
            ArgKind::Imm => write!(f, "I"),
            ArgKind::Label => write!(f, "L"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub opcode: OpCode,
    pub preset: Option<(Slot, Word)>,
}

impl Variant {
    pub fn new(opcode: OpCode) -> Self {
        Variant {
            opcode,
            preset: None,
        }
    }

    pub fn with_preset(opcode: OpCode, slot: Slot, val: Word) -> Self {
        debug_assert!(opcode.layout().iter().any(|op| op.slot == slot));
        Variant {
            opcode,
            preset: Some((slot, val)),
        }
    }

    /// The operands this variant expects in source, in order.
    pub fn operands(&self) -> impl Iterator<Item = &'static Operand> + '_ {
        self.opcode
            .layout()
            .iter()
            .filter(move |op| self.preset.map_or(true, |(slot, _)| op.slot != slot))
    }

    pub fn shape(&self) -> Vec<ArgKind> {
        self.operands().map(|op| ArgKind::from(op.kind)).collect()
    }

    pub fn accepts_shape(&self, args: &[ArgKind]) -> bool {
        self.shape() == args
    }
}

#[derive(Debug)]
pub struct Family {
    pub name: String,
    pub variants: Vec<Variant>,
}

impl Family {
    pub fn new(name: &str, variants: Vec<Variant>) -> Self {
        Family {
            name: name.to_owned(),
            variants,
        }
    }

    pub fn with(name: &str, opcodes: &[OpCode]) -> Self {
        Family::new(name, opcodes.iter().copied().map(Variant::new).collect())
    }

    pub fn single(name: &str, opcode: OpCode) -> Self {
        Family::with(name, &[opcode])
    }

    pub fn shapes(&self) -> Vec<Vec<ArgKind>> {
        let mut shapes: Vec<Vec<ArgKind>> = Vec::new();
        for shape in self.variants.iter().map(Variant::shape) {
            if !shapes.contains(&shape) {
                shapes.push(shape);
            }
        }
        shapes
    }
}
