use super::encode::{self, Deferred, Encoding, Resolver};
use super::operand;
use super::symbols::SymbolTable;
use super::tokenize::{Line, LineReader};
use super::types::{Error as AsmError, ErrorKind, Located};
use crate::assembler::{model::Arg, writer::ImageWriter};
use crate::common;
use crate::isa::hw::Word;
use log::{trace, warn};
use std::fmt::Display;
use std::io::{BufRead, Write};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    TextAfterLabel(String),
    SectionArity(usize),
    UnknownSection(String),
    ProgramTooLong,
    LabelMoved {
        name: String,
        sized: Word,
        emitted: Word,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TextAfterLabel(_) | Error::SectionArity(_) => ErrorKind::Syntax,
            Error::UnknownSection(_) | Error::ProgramTooLong | Error::LabelMoved { .. } => {
                ErrorKind::Generic
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TextAfterLabel(token) => {
                write!(f, "syntax error: unexpected text after label in '{}'", token)
            }
            Error::SectionArity(count) => write!(
                f,
                "syntax error: 'section' takes one name, found {}",
                count
            ),
            Error::UnknownSection(name) => write!(f, "invalid section type '{}'", name),
            Error::ProgramTooLong => write!(f, "program does not fit in 32-bit addresses"),
            Error::LabelMoved {
                name,
                sized,
                emitted,
            } => write!(
                f,
                "label '{}' moved from {:#010x} to {:#010x} between passes",
                name, sized, emitted
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Text,
    Data,
}

impl Section {
    fn parse(name: &str) -> Option<Section> {
        if common::eq_ignore_case(name, "text") {
            Some(Section::Text)
        } else if common::eq_ignore_case(name, "data") {
            Some(Section::Data)
        } else {
            None
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Statement {
    Empty,
    Section(Section),
    Inst {
        mnemonic: Located<String>,
        operands: Vec<Located<String>>,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Parsed {
    label: Option<Located<String>>,
    statement: Statement,
}

const SECTION_DIRECTIVE: &str = "section";

fn parse_label(token: Located<String>) -> Result<Located<String>, Located<Error>> {
    token.map_result(|raw| match raw.find(':') {
        Some(colon) if colon + 1 == raw.len() => Ok(raw[..colon].to_owned()),
        _ => Err(Error::TextAfterLabel(raw)),
    })
}

fn parse_statement(line: Line) -> Result<Parsed, Located<Error>> {
    let mut tokens = line.tokens.into_iter().peekable();

    let label = if tokens.peek().map_or(false, |first| first.contains(':')) {
        tokens.next().map(parse_label).transpose()?
    } else {
        None
    };

    let mnemonic = match tokens.next() {
        None => {
            return Ok(Parsed {
                label,
                statement: Statement::Empty,
            })
        }
        Some(mnemonic) => mnemonic,
    };
    let operands = tokens.collect::<Vec<_>>();

    let statement = if common::eq_ignore_case(&mnemonic, SECTION_DIRECTIVE) {
        match operands.as_slice() {
            [name] => Statement::Section(
                Section::parse(name)
                    .ok_or_else(|| name.transfer(Error::UnknownSection((**name).clone())))?,
            ),
            _ => return Err(mnemonic.transfer(Error::SectionArity(operands.len()))),
        }
    } else {
        Statement::Inst { mnemonic, operands }
    };

    Ok(Parsed { label, statement })
}

/// What differs between the two passes over the source.
pub trait Pass {
    fn number(&self) -> u8;

    fn resolver(&self) -> &dyn Resolver;

    fn define(&mut self, label: Located<&str>, address: Word) -> Result<(), AsmError>;

    fn emit(&mut self, encoding: &Encoding) -> Result<(), AsmError>;
}

/// The first pass: records label addresses, writes nothing.
#[derive(Debug, Default)]
pub struct Sizing {
    symbols: SymbolTable,
}

impl Sizing {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }
}

impl Pass for Sizing {
    fn number(&self) -> u8 {
        1
    }

    fn resolver(&self) -> &dyn Resolver {
        &Deferred
    }

    fn define(&mut self, label: Located<&str>, address: Word) -> Result<(), AsmError> {
        Ok(self.symbols.define(label, address)?)
    }

    fn emit(&mut self, _: &Encoding) -> Result<(), AsmError> {
        Ok(())
    }
}

/// The second pass: resolves against the first pass's labels and writes words.
pub struct Emitting<'a, W: Write> {
    symbols: &'a SymbolTable,
    out: &'a mut ImageWriter<W>,
    target: &'a str,
}

impl<'a, W: Write> Emitting<'a, W> {
    pub fn new(symbols: &'a SymbolTable, out: &'a mut ImageWriter<W>, target: &'a str) -> Self {
        Emitting {
            symbols,
            out,
            target,
        }
    }
}

impl<'a, W: Write> Pass for Emitting<'a, W> {
    fn number(&self) -> u8 {
        2
    }

    fn resolver(&self) -> &dyn Resolver {
        self.symbols
    }

    fn define(&mut self, label: Located<&str>, address: Word) -> Result<(), AsmError> {
        let sized = self.symbols.resolve(&label);
        match sized {
            Ok(sized) if sized == address => Ok(()),
            Ok(sized) => Err(label
                .transfer(Error::LabelMoved {
                    name: (*label).to_owned(),
                    sized,
                    emitted: address,
                })
                .into()),
            Err(err) => Err(label.transfer(err).into()),
        }
    }

    fn emit(&mut self, encoding: &Encoding) -> Result<(), AsmError> {
        self.out
            .write_words(encoding.words())
            .map_err(|err| AsmError::OutputFile(self.target.to_owned(), err))
    }
}

/// Runs one pass over the whole source, returning the final address. The
/// address advances by exactly the length of each encoding handed to `emit`.
pub fn run_pass<R: BufRead>(reader: R, pass: &mut dyn Pass) -> Result<Word, AsmError> {
    let mut lines = LineReader::new(reader);
    let mut address: Word = 0;
    let mut section = Section::Text;

    while let Some(line) = lines.next_line()? {
        let number = line.number;
        let parsed = parse_statement(line)?;

        if let Some(label) = &parsed.label {
            pass.define(label.as_ref().map(String::as_str), address)?;
        }

        match parsed.statement {
            Statement::Empty => (),
            Statement::Section(next) => section = next,
            Statement::Inst { mnemonic, .. } if section == Section::Data => {
                if pass.number() == 1 {
                    warn!(
                        "line {}: data section is not supported, ignoring '{}'",
                        number, *mnemonic
                    );
                }
            }
            Statement::Inst { mnemonic, operands } => {
                trace!(
                    "pass {} @{:#010x} line {}: {} {}",
                    pass.number(),
                    address,
                    number,
                    *mnemonic,
                    common::join_display(operands.iter().map(|op| &**op), " ")
                );

                let args = operands
                    .into_iter()
                    .map(|op| op.map_result(|raw| operand::parse(&raw)))
                    .collect::<Result<Vec<Located<Arg>>, _>>()?;

                let encoding = encode::encode_line(&mnemonic, &args, address, pass.resolver())?;
                pass.emit(&encoding)?;

                address = address
                    .checked_add(encoding.byte_len())
                    .ok_or_else(|| mnemonic.transfer(Error::ProgramTooLong))?;
            }
        }
    }

    Ok(address)
}
