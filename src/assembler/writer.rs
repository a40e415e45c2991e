use crate::image::Header;
use crate::isa::hw::{self, Word, WORD_BYTES};
use std::fmt::Display;
use std::io::{self, Write};

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    LengthMismatch { declared: Word, written: u64 },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
            Error::LengthMismatch { declared, written } => write!(
                f,
                "header declares {} program bytes but {} were written",
                declared, written
            ),
        }
    }
}

/// Writes an image: the header up front, then program words as they are
/// produced.
pub struct ImageWriter<W: Write> {
    out: W,
    header: Header,
    written: u64,
}

impl<W: Write> ImageWriter<W> {
    pub fn new(mut out: W, header: Header) -> io::Result<Self> {
        header.write(&mut out)?;
        Ok(ImageWriter {
            out,
            header,
            written: 0,
        })
    }

    pub fn write_words(&mut self, words: &[Word]) -> io::Result<()> {
        self.out.write_all(&hw::words_to_bytes(words))?;
        self.written += (words.len() * WORD_BYTES as usize) as u64;
        Ok(())
    }

    /// Program bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Fails if the program section does not have the length the header declared.
    pub fn finish(mut self) -> Result<W, Error> {
        self.out.flush()?;
        if self.written != self.header.program_length as u64 {
            return Err(Error::LengthMismatch {
                declared: self.header.program_length,
                written: self.written,
            });
        }

        Ok(self.out)
    }
}
