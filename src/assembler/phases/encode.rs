use super::symbols::{self, SymbolTable, UNRESOLVED};
use super::types::{ErrorKind, Located};
use crate::assembler::{
    lang::Lang,
    model::{Arg, ArgKind, Family, Variant},
};
use crate::common;
use crate::isa::{
    hw::{Byte, Inst, Word, WORD_BYTES},
    layout::{self, ImmRange, Kind, Reach, ReachError, Slot},
};
use log::trace;
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnknownInstruction(String),
    Shape {
        mnemonic: String,
        found: Vec<ArgKind>,
        expected: Vec<Vec<ArgKind>>,
    },
    ImmediateOutOfRange {
        mnemonic: String,
        value: Word,
        range: ImmRange,
    },
    BranchRange {
        mnemonic: String,
        label: String,
        disp: i32,
        reach: Reach,
        err: ReachError,
    },
    Label(symbols::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownInstruction(_) => ErrorKind::UnknownInstruction,
            Error::Shape { .. } => ErrorKind::Syntax,
            Error::Label(symbols::Error::Unknown(_)) => ErrorKind::UnknownLabel,
            Error::ImmediateOutOfRange { .. } | Error::BranchRange { .. } | Error::Label(_) => {
                ErrorKind::Generic
            }
        }
    }
}

fn shape_to_string(shape: &[ArgKind]) -> String {
    if shape.is_empty() {
        "no operands".to_owned()
    } else {
        common::join_display(shape, " ")
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownInstruction(name) => write!(f, "unknown instruction '{}'", name),
            Error::Shape {
                mnemonic,
                found,
                expected,
            } => write!(
                f,
                "syntax error: '{}' takes {}, found {}",
                mnemonic,
                common::join_display(expected.iter().map(|s| shape_to_string(s)), " or "),
                shape_to_string(found)
            ),
            Error::ImmediateOutOfRange {
                mnemonic,
                value,
                range: ImmRange::Bit,
            } => write!(
                f,
                "bit number {} is too large for '{}' ({})",
                value,
                mnemonic,
                ImmRange::Bit
            ),
            Error::ImmediateOutOfRange {
                mnemonic,
                value,
                range,
            } => write!(
                f,
                "immediate value {} is too large for '{}' ({})",
                range.format(*value),
                mnemonic,
                range
            ),
            Error::BranchRange {
                mnemonic,
                label,
                disp,
                reach,
                err: ReachError::WrongDirection(dir),
            } => write!(
                f,
                "'{}' can only branch {}, but '{}' is {} bytes away ({})",
                mnemonic, dir, label, disp, reach
            ),
            Error::BranchRange {
                mnemonic,
                label,
                disp,
                reach,
                err: ReachError::OutOfRange,
            } => write!(
                f,
                "branch to '{}' is out of range for '{}': {} bytes, reach is {}",
                label, mnemonic, disp, reach
            ),
            Error::Label(err) => write!(f, "{}", err),
        }
    }
}

/// How the encoder learns label addresses.
pub trait Resolver {
    fn resolve(&self, label: &str) -> Result<Word, symbols::Error>;

    /// False while addresses are still placeholders. Branch range checks are
    /// only made against final addresses.
    fn is_final(&self) -> bool;
}

/// Resolves every label to `UNRESOLVED`, for sizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deferred;

impl Resolver for Deferred {
    fn resolve(&self, _: &str) -> Result<Word, symbols::Error> {
        Ok(UNRESOLVED)
    }

    fn is_final(&self) -> bool {
        false
    }
}

impl Resolver for SymbolTable {
    fn resolve(&self, label: &str) -> Result<Word, symbols::Error> {
        SymbolTable::resolve(self, label)
    }

    fn is_final(&self) -> bool {
        true
    }
}

/// The words one source line assembles to: the instruction word, then any
/// trailing words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    words: Vec<Word>,
}

impl Encoding {
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn byte_len(&self) -> Word {
        WORD_BYTES * self.words.len() as Word
    }

    pub fn inst(&self) -> Option<Inst> {
        self.words.first().and_then(|word| Inst::decode(*word).ok())
    }
}

fn place(inst: &mut Inst, trailing: &mut Vec<Word>, slot: Slot, val: Word) {
    match slot {
        Slot::Dest => inst.dest = val as Byte,
        Slot::Src => inst.src = val as Byte,
        Slot::Aux => inst.aux = val as Byte,
        Slot::Wide => inst.set_wide(val as u16),
        Slot::Trailing => trailing.push(val),
    }
}

// The first immediate of `args` the variant cannot hold, with the range it needed.
fn first_misfit<'a>(
    variant: &Variant,
    args: &'a [Located<Arg>],
) -> Option<(&'a Located<Arg>, Word, ImmRange)> {
    variant
        .operands()
        .zip(args)
        .find_map(|(op, arg)| match (op.kind, &**arg) {
            (Kind::Imm(range), Arg::Imm(val)) if !range.contains(*val) => Some((arg, *val, range)),
            _ => None,
        })
}

fn select<'f>(family: &'f Family, args: &[Located<Arg>]) -> Result<&'f Variant, Located<Error>> {
    let shape = args.iter().map(|arg| arg.kind()).collect::<Vec<_>>();

    let mut misfit = None;
    for variant in family.variants.iter().filter(|v| v.accepts_shape(&shape)) {
        match first_misfit(variant, args) {
            None => return Ok(variant),
            Some(miss) => misfit = Some(miss),
        }
    }

    Err(match misfit {
        Some((arg, value, range)) => arg.transfer(Error::ImmediateOutOfRange {
            mnemonic: family.name.clone(),
            value,
            range,
        }),
        None => Located::from(Error::Shape {
            mnemonic: family.name.clone(),
            found: shape,
            expected: family.shapes(),
        }),
    })
}

/// Encodes one instruction placed at `address`. Both passes call this, so the
/// size of the result never depends on what labels resolve to.
pub fn encode(
    family: &Family,
    args: &[Located<Arg>],
    address: Word,
    resolver: &dyn Resolver,
) -> Result<Encoding, Located<Error>> {
    let variant = select(family, args)?;
    let width = layout::width(variant.opcode.layout());
    let next = address.wrapping_add(width);

    let mut inst = Inst::new(variant.opcode);
    let mut trailing = Vec::new();
    if let Some((slot, val)) = variant.preset {
        place(&mut inst, &mut trailing, slot, val);
    }

    for (op, arg) in variant.operands().zip(args) {
        let val = match (op.kind, &**arg) {
            (Kind::Reg, Arg::Reg(r)) => *r as Word,
            (Kind::Imm(_), Arg::Imm(val)) => *val,
            (Kind::Target(reach), Arg::Label(label)) => {
                let target = resolver
                    .resolve(label)
                    .map_err(|err| arg.transfer(Error::Label(err)))?;
                let disp = target.wrapping_sub(next) as i32;

                if resolver.is_final() {
                    trace!("{} {} at {:#010x}: displacement {}", family.name, label, address, disp);
                    reach.pack(disp).map_err(|err| {
                        arg.transfer(Error::BranchRange {
                            mnemonic: family.name.clone(),
                            label: label.clone(),
                            disp,
                            reach,
                            err,
                        })
                    })?
                } else if reach.is_near() {
                    0
                } else {
                    disp as Word
                }
            }
            _ => unreachable!("operand shape was matched by `select`"),
        };

        place(&mut inst, &mut trailing, op.slot, val);
    }

    let mut words = vec![inst.encode()];
    words.extend(trailing);
    let encoding = Encoding { words };
    debug_assert_eq!(encoding.byte_len(), width);

    Ok(encoding)
}

/// Looks the mnemonic up without regard to case, then encodes.
pub fn encode_line(
    mnemonic: &Located<String>,
    args: &[Located<Arg>],
    address: Word,
    resolver: &dyn Resolver,
) -> Result<Encoding, Located<Error>> {
    let family = Lang::get()
        .lookup_family(mnemonic)
        .ok_or_else(|| mnemonic.transfer(Error::UnknownInstruction((**mnemonic).clone())))?;

    encode(family, args, address, resolver)
        .map_err(|err| err.proximate_to_option_loc(mnemonic.loc()))
}
