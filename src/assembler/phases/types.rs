use super::{driver, encode, operand, symbols, tokenize};
use derive_more::Constructor;
use std::fmt::Display;
use std::io;

/*
    The assembler reads its source twice, one line at a time:

        1.  Tokenization: comments, carriage returns and commas are stripped and
            the line is split at whitespace into located tokens.

        2.  Classification: a leading `name:` token is peeled off as a label
            definition, the next token names the instruction, and every further
            token is classified as a register, a number, or a label reference.

        3.  Encoding: the instruction family picks the first variant whose
            operand shape and immediate ranges fit, and packs the operands into
            an instruction word plus any trailing words. Branch displacements
            are measured from the end of the whole encoding.

    The first pass only sizes the encodings and records label addresses; the
    second pass encodes again with real label addresses and writes the words.
    Both passes run the same encoder, so the byte count the first pass advances
    by is, by construction, the byte count the second pass writes.
*/

#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, Constructor)]
pub struct Loc {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Located<T: Sized> {
    loc: Option<Loc>,
    val: T,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(line: {}, col: {})", self.line, self.col)
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            None => write!(f, "@<unknown location>: {}", self.val),
            Some(loc) => write!(f, "@{}: {}", loc, self.val),
        }
    }
}

impl<T> Located<T> {
    fn new(loc: Option<Loc>, val: T) -> Self {
        Located { loc, val }
    }

    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located::new(Some(loc), val)
    }

    pub fn loc(&self) -> Option<Loc> {
        self.loc
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn as_ref(&self) -> Located<&T> {
        Located::new(self.loc, &self.val)
    }

    pub fn proximate_to_option_loc(self, loc: Option<Loc>) -> Self {
        match self.loc {
            None => Self { loc, ..self },
            Some(_) => self,
        }
    }

    pub fn proximate_to_loc(self, loc: Loc) -> Self {
        self.proximate_to_option_loc(Some(loc))
    }

    pub fn map<S, F>(self, f: F) -> Located<S>
    where
        F: FnOnce(T) -> S,
    {
        Located::new(self.loc, f(self.val))
    }

    pub fn map_result<S, E, F>(self, f: F) -> Result<Located<S>, Located<E>>
    where
        F: FnOnce(T) -> Result<S, E>,
    {
        match f(self.val) {
            Ok(s) => Ok(Located::new(self.loc, s)),
            Err(err) => Err(Located::new(self.loc, err)),
        }
    }

    pub fn transfer<S>(&self, s: S) -> Located<S> {
        Located::new(self.loc, s)
    }
}

impl<T> std::ops::Deref for Located<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> From<T> for Located<T> {
    fn from(val: T) -> Self {
        Located { loc: None, val }
    }
}

/// The class of an assembly failure; each class has its own process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Generic,
    Syntax,
    InputFile,
    OutputFile,
    UnknownInstruction,
    UnknownLabel,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Usage => 1,
            ErrorKind::Generic => 2,
            ErrorKind::Syntax => 3,
            ErrorKind::InputFile => 4,
            ErrorKind::OutputFile => 5,
            ErrorKind::UnknownInstruction => 6,
            ErrorKind::UnknownLabel => 7,
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Tokenize(Located<tokenize::Error>),
    Operand(Located<operand::Error>),
    Symbol(Located<symbols::Error>),
    Encode(Located<encode::Error>),
    Driver(Located<driver::Error>),
    InputFile(String, io::Error),
    OutputFile(String, io::Error),
    Internal(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Tokenize(err) => match **err {
                tokenize::Error::Read(_) => ErrorKind::InputFile,
                _ => ErrorKind::Generic,
            },
            Error::Symbol(err) => match **err {
                symbols::Error::Unknown(_) => ErrorKind::UnknownLabel,
                _ => ErrorKind::Generic,
            },
            Error::Operand(_) => ErrorKind::Generic,
            Error::Encode(err) => err.kind(),
            Error::Driver(err) => err.kind(),
            Error::InputFile(..) => ErrorKind::InputFile,
            Error::OutputFile(..) => ErrorKind::OutputFile,
            Error::Internal(_) => ErrorKind::Generic,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

impl From<Located<tokenize::Error>> for Error {
    fn from(err: Located<tokenize::Error>) -> Self {
        Error::Tokenize(err)
    }
}

impl From<Located<operand::Error>> for Error {
    fn from(err: Located<operand::Error>) -> Self {
        Error::Operand(err)
    }
}

impl From<Located<symbols::Error>> for Error {
    fn from(err: Located<symbols::Error>) -> Self {
        Error::Symbol(err)
    }
}

impl From<Located<encode::Error>> for Error {
    fn from(err: Located<encode::Error>) -> Self {
        Error::Encode(err)
    }
}

impl From<Located<driver::Error>> for Error {
    fn from(err: Located<driver::Error>) -> Self {
        Error::Driver(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assembly Error (in ")?;
        match self {
            Error::Tokenize(_) => write!(f, "Tokenizer"),
            Error::Operand(_) => write!(f, "Operand Parser"),
            Error::Symbol(_) => write!(f, "Symbol Table"),
            Error::Encode(_) => write!(f, "Encoder"),
            Error::Driver(_) => write!(f, "Driver"),
            Error::InputFile(..) => write!(f, "Input"),
            Error::OutputFile(..) => write!(f, "Output"),
            Error::Internal(_) => write!(f, "Writer"),
        }?;
        write!(f, "): ")?;
        match self {
            Error::Tokenize(err) => write!(f, "{}", err),
            Error::Operand(err) => write!(f, "{}", err),
            Error::Symbol(err) => write!(f, "{}", err),
            Error::Encode(err) => write!(f, "{}", err),
            Error::Driver(err) => write!(f, "{}", err),
            Error::InputFile(path, err) => write!(f, "cannot read '{}': {}", path, err),
            Error::OutputFile(path, err) => write!(f, "cannot write '{}': {}", path, err),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
