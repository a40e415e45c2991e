use crate::assembler::model::Arg;
use crate::isa::hw::{Byte, Word};
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    BadRegister(String),
    BadNumber(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadRegister(raw) => write!(f, "bad register '{}' (r0 to r255)", raw),
            Error::BadNumber(raw) => write!(f, "bad number expression '{}'", raw),
        }
    }
}

const MAX_REGISTER_DIGITS: usize = 3;

// `r` or `R` followed by nothing but decimal digits.
fn register_digits(raw: &str) -> Option<&str> {
    let digits = raw.strip_prefix('r').or_else(|| raw.strip_prefix('R'))?;
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

pub fn looks_like_register(raw: &str) -> bool {
    register_digits(raw).is_some()
}

pub fn looks_like_number(raw: &str) -> bool {
    raw.starts_with(|c: char| c.is_ascii_digit() || c == '-')
}

fn parse_register(raw: &str, digits: &str) -> Result<Byte, Error> {
    if digits.len() > MAX_REGISTER_DIGITS {
        return Err(Error::BadRegister(raw.to_owned()));
    }

    digits
        .parse::<Byte>()
        .map_err(|_| Error::BadRegister(raw.to_owned()))
}

/// Negative literals are stored as their twos-complement bit pattern.
fn parse_number(raw: &str) -> Result<Word, Error> {
    let bad = || Error::BadNumber(raw.to_owned());

    let hex = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"));
    if let Some(hex) = hex {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        return Word::from_str_radix(hex, 16).map_err(|_| bad());
    }

    if let Some(magnitude) = raw.strip_prefix('-') {
        if magnitude.is_empty() || !magnitude.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad());
        }
        return raw.parse::<i32>().map(|val| val as Word).map_err(|_| bad());
    }

    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad());
    }
    raw.parse::<Word>().map_err(|_| bad())
}

/// Classifies one operand token as a register, a number, or a label reference.
pub fn parse(raw: &str) -> Result<Arg, Error> {
    if let Some(digits) = register_digits(raw) {
        return Ok(Arg::Reg(parse_register(raw, digits)?));
    }

    if looks_like_number(raw) {
        return Ok(Arg::Imm(parse_number(raw)?));
    }

    Ok(Arg::Label(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers() {
        assert_eq!(parse("r0"), Ok(Arg::Reg(0)));
        assert_eq!(parse("R17"), Ok(Arg::Reg(17)));
        assert_eq!(parse("r255"), Ok(Arg::Reg(255)));
        assert_eq!(parse("r256"), Err(Error::BadRegister("r256".to_owned())));
        assert_eq!(parse("r0001"), Err(Error::BadRegister("r0001".to_owned())));
    }

    #[test]
    fn register_lookalikes_are_labels() {
        assert_eq!(parse("result"), Ok(Arg::Label("result".to_owned())));
        assert_eq!(parse("r1a"), Ok(Arg::Label("r1a".to_owned())));
        assert_eq!(parse("r"), Ok(Arg::Label("r".to_owned())));
    }

    #[test]
    fn numbers() {
        assert_eq!(parse("0"), Ok(Arg::Imm(0)));
        assert_eq!(parse("100000"), Ok(Arg::Imm(100_000)));
        assert_eq!(parse("0x10"), Ok(Arg::Imm(16)));
        assert_eq!(parse("0XfFfFfFfF"), Ok(Arg::Imm(0xFFFF_FFFF)));
        assert_eq!(parse("-1"), Ok(Arg::Imm(0xFFFF_FFFF)));
        assert_eq!(parse("-2147483648"), Ok(Arg::Imm(0x8000_0000)));
        assert_eq!(parse("4294967295"), Ok(Arg::Imm(u32::MAX)));
    }

    #[test]
    fn bad_numbers() {
        for raw in &["4294967296", "0x", "0x1g", "-", "-0x5", "12ab", "-2147483649", "0x+5"] {
            assert_eq!(parse(raw), Err(Error::BadNumber((*raw).to_owned())), "{}", raw);
        }
    }
}
