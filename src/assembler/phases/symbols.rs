use super::operand;
use super::types::{Loc, Located};
use crate::common;
use crate::isa::hw::Word;
use log::debug;
use std::collections::{hash_map::Entry, HashMap};
use std::fmt::Display;

/// What every label resolves to while the first pass is still sizing the
/// program. Far enough from any real address that it is easy to spot.
pub const UNRESOLVED: Word = 2_000_000_000;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    BadName(String, &'static str),
    Duplicate { name: String, first: Option<Loc> },
    Unknown(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadName(name, why) => write!(f, "bad label name '{}': {}", name, why),
            Error::Duplicate { name, first } => {
                write!(f, "label '{}' is already defined", name)?;
                if let Some(first) = first {
                    write!(f, " at {}", first)?;
                }
                Ok(())
            }
            Error::Unknown(name) => write!(f, "unknown label '{}'", name),
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::BadName(
            name.to_owned(),
            "label names must have nonzero length",
        ));
    }

    if operand::looks_like_register(name) {
        return Err(Error::BadName(name.to_owned(), "looks like a register"));
    }

    if operand::looks_like_number(name) {
        return Err(Error::BadName(name.to_owned(), "looks like a number"));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub address: Word,
    pub loc: Option<Loc>,
}

/// Label addresses, looked up without regard to case. Only the first pass
/// defines labels.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn define(&mut self, name: Located<&str>, address: Word) -> Result<(), Located<Error>> {
        let loc = name.loc();
        name.map_result(|name| -> Result<(), Error> {
            validate_name(name)?;

            match self.symbols.entry(common::sanitize_name(name)) {
                Entry::Occupied(prev) => Err(Error::Duplicate {
                    name: name.to_owned(),
                    first: prev.get().loc,
                }),
                Entry::Vacant(slot) => {
                    debug!("label {} = {:#010x}", name, address);
                    slot.insert(Symbol {
                        name: name.to_owned(),
                        address,
                        loc,
                    });
                    Ok(())
                }
            }
        })?;

        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&common::sanitize_name(name))
    }

    pub fn resolve(&self, name: &str) -> Result<Word, Error> {
        self.lookup(name)
            .map(|sym| sym.address)
            .ok_or_else(|| Error::Unknown(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Ordered by address, then by name.
    pub fn sorted(&self) -> Vec<&Symbol> {
        let mut syms = self.symbols.values().collect::<Vec<_>>();
        syms.sort_by(|a, b| (a.address, &a.name).cmp(&(b.address, &b.name)));
        syms
    }
}
