use super::lang::Lang;
use crate::isa::{
    hw::{Byte, Inst, Word, WORD_BYTES},
    layout::{self, ImmRange, Kind, Slot},
};
use std::collections::BTreeSet;
use std::fmt::{Display, Write};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    InvalidOpcode { address: Word, raw: Byte },
    UnexpectedEndOfStream { address: Word },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidOpcode { address, raw } => {
                write!(f, "invalid opcode {:#04x} at {:#010x}", raw, address)
            }
            Error::UnexpectedEndOfStream { address } => write!(
                f,
                "program ends inside the instruction at {:#010x}",
                address
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A decoded operand. Branch targets are absolute addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Reg(Byte),
    Imm(Word, ImmRange),
    Target(Word),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembled {
    pub address: Word,
    pub inst: Inst,
    pub trailing: Vec<Word>,
    pub fields: Vec<Field>,
}

impl Disassembled {
    pub fn width(&self) -> Word {
        WORD_BYTES * (1 + self.trailing.len() as Word)
    }

    pub fn mnemonic(&self) -> Option<&'static str> {
        Lang::get().mnemonic_of(self.inst.opcode)
    }
}

fn field(inst: &Inst, trailing: &[Word], next_trailing: &mut usize, slot: Slot) -> Word {
    match slot {
        Slot::Dest => inst.dest as Word,
        Slot::Src => inst.src as Word,
        Slot::Aux => inst.aux as Word,
        Slot::Wide => inst.wide() as Word,
        Slot::Trailing => {
            let val = trailing[*next_trailing];
            *next_trailing += 1;
            val
        }
    }
}

/// Decodes the instruction at the start of `words`, which sits at `address`.
pub fn disassemble_one(words: &[Word], address: Word) -> Result<Disassembled, Error> {
    let (&first, rest) = words
        .split_first()
        .ok_or(Error::UnexpectedEndOfStream { address })?;
    let inst = Inst::decode(first).map_err(|raw| Error::InvalidOpcode { address, raw })?;

    let layout = inst.opcode.layout();
    let trailing = rest
        .get(..layout::trailing_words(layout))
        .ok_or(Error::UnexpectedEndOfStream { address })?
        .to_vec();
    let next = address.wrapping_add(layout::width(layout));

    let mut next_trailing = 0;
    let fields = layout
        .iter()
        .map(|op| {
            let raw = field(&inst, &trailing, &mut next_trailing, op.slot);
            match op.kind {
                Kind::Reg => Field::Reg(raw as Byte),
                Kind::Imm(range) => Field::Imm(range.widen(raw), range),
                Kind::Target(reach) => {
                    Field::Target(next.wrapping_add(reach.unpack(raw) as Word))
                }
            }
        })
        .collect();

    Ok(Disassembled {
        address,
        inst,
        trailing,
        fields,
    })
}

/// Decodes a whole program section.
pub fn disassemble(words: &[Word]) -> Result<Vec<Disassembled>, Error> {
    let mut insts = Vec::new();
    let mut idx = 0;
    while idx < words.len() {
        let address = idx as Word * WORD_BYTES;
        let inst = disassemble_one(&words[idx..], address)?;
        idx += 1 + inst.trailing.len();
        insts.push(inst);
    }
    Ok(insts)
}

pub fn label_name(address: Word) -> String {
    format!("L{:08x}", address)
}

fn format_field(field: &Field) -> String {
    match field {
        Field::Reg(r) => format!("r{}", r),
        Field::Imm(val, range) => range.format(*val),
        Field::Target(address) => label_name(*address),
    }
}

/// Renders decoded instructions as source text. Every branch target that
/// falls on an instruction boundary gets a label, so assembling the text again
/// gives back the same program.
pub fn render(insts: &[Disassembled]) -> String {
    let end = insts.last().map_or(0, |last| last.address + last.width());
    let boundaries = insts
        .iter()
        .map(|inst| inst.address)
        .chain(std::iter::once(end))
        .collect::<BTreeSet<_>>();
    let targets = insts
        .iter()
        .flat_map(|inst| inst.fields.iter())
        .filter_map(|field| match field {
            Field::Target(address) if boundaries.contains(address) => Some(*address),
            _ => None,
        })
        .collect::<BTreeSet<_>>();

    let mut out = String::new();
    for inst in insts {
        if targets.contains(&inst.address) {
            let _ = writeln!(out, "{}:", label_name(inst.address));
        }

        let text = match inst.mnemonic() {
            Some(mnemonic) => std::iter::once(mnemonic.to_owned())
                .chain(inst.fields.iter().map(format_field))
                .collect::<Vec<_>>()
                .join(" "),
            // Only reachable through hand-written images.
            None => format!(
                "; {:?} {}",
                inst.inst.opcode,
                inst.fields
                    .iter()
                    .map(format_field)
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
        };
        let _ = writeln!(out, "    {:<32}; {:08x}", text, inst.address);
    }

    if targets.contains(&end) {
        let _ = writeln!(out, "{}:", label_name(end));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::isa::OpCode;

    #[test]
    fn fields_are_widened() {
        let words = assemble("mov r3 -5\nadd r1 100000\njmp end\nend: exit").unwrap();
        let insts = disassemble(&words).unwrap();

        assert_eq!(insts.len(), 4);
        assert_eq!(insts[0].inst.opcode, OpCode::MovImm8Signed);
        assert_eq!(
            insts[0].fields,
            vec![Field::Reg(3), Field::Imm(-5i32 as Word, ImmRange::Signed8)]
        );
        assert_eq!(insts[1].width(), 8);
        assert_eq!(insts[2].address, 12);
        assert_eq!(insts[2].fields, vec![Field::Target(20)]);
    }

    #[test]
    fn render_places_labels() {
        let words = assemble("top: inc r1\njnznear r1 top\nret").unwrap();
        let text = render(&disassemble(&words).unwrap());
        let lines = text.lines().map(str::trim_end).collect::<Vec<_>>();

        assert_eq!(lines[0], "L00000000:");
        assert!(lines[1].starts_with("    add r1 1 "));
        assert!(lines[2].starts_with("    jnznear r1 L00000000 "));
        assert!(lines[3].starts_with("    ret "));
        assert!(lines[3].ends_with("; 00000008"));
    }

    #[test]
    fn rendered_text_reassembles() {
        let source = "start: mov r1 10\n\
                      mov r2 0x12345678\n\
                      loop: callf helper\n\
                      decjnznear r1 loop\n\
                      jset r2 3 start\n\
                      write16 0x100 65535\n\
                      exit\n\
                      helper: callout r1 r2 1\n\
                      ret\n";
        let words = assemble(source).unwrap();
        let text = render(&disassemble(&words).unwrap());
        assert_eq!(assemble(&text).unwrap(), words);
    }

    #[test]
    fn bad_streams() {
        assert_eq!(
            disassemble(&[0x0200_0000, 0xFF00_0000]),
            Err(Error::InvalidOpcode {
                address: 4,
                raw: 0xFF
            })
        );

        let mut words = assemble("mov r1 100000").unwrap();
        words.pop();
        assert_eq!(
            disassemble(&words),
            Err(Error::UnexpectedEndOfStream { address: 0 })
        );
    }
}
