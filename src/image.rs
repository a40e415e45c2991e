use crate::isa::hw::{self, Byte, Word, WORD_BYTES};
use static_assertions::const_assert_eq;
use std::convert::TryInto;
use std::fmt::Display;
use std::io::{self, Write};

pub const MAGIC: Word = 0xF174_71FE;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Truncated { needed: u64, found: u64 },
    BadMagic(Word),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Truncated { needed, found } => write!(
                f,
                "executable truncated (needed {} bytes, found {})",
                needed, found
            ),
            Error::BadMagic(magic) => {
                write!(f, "program has bad magic number {:#010x}", magic)
            }
        }
    }
}

impl std::error::Error for Error {}

/// The fixed preamble of every image: the magic word followed by the four
/// section lengths, all little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub program_length: Word,
    pub data_length: Word,
    pub reserved: [Word; 2],
}

const HEADER_WORDS: usize = 5;

impl Header {
    pub const SIZE: usize = HEADER_WORDS * WORD_BYTES as usize;

    pub fn new(program_length: Word, data_length: Word) -> Self {
        Header {
            program_length,
            data_length,
            reserved: [0; 2],
        }
    }

    fn to_words(&self) -> [Word; HEADER_WORDS] {
        [
            MAGIC,
            self.program_length,
            self.data_length,
            self.reserved[0],
            self.reserved[1],
        ]
    }

    pub fn to_bytes(&self) -> Vec<Byte> {
        hw::words_to_bytes(&self.to_words())
    }

    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.to_bytes())
    }

    pub fn read(bytes: &[Byte]) -> Result<Header, Error> {
        let word_at = |idx: usize| -> Result<Word, Error> {
            let start = idx * WORD_BYTES as usize;
            bytes
                .get(start..start + WORD_BYTES as usize)
                .and_then(|raw| raw.try_into().ok())
                .map(Word::from_le_bytes)
                .ok_or(Error::Truncated {
                    needed: Header::SIZE as u64,
                    found: bytes.len() as u64,
                })
        };

        let magic = word_at(0)?;
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }

        Ok(Header {
            program_length: word_at(1)?,
            data_length: word_at(2)?,
            reserved: [word_at(3)?, word_at(4)?],
        })
    }

    /// The number of bytes a complete image with this header occupies.
    pub fn image_size(&self) -> u64 {
        Header::SIZE as u64 + self.program_length as u64 + self.data_length as u64
    }
}

const_assert_eq!(Header::SIZE, 20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub header: Header,
    pub program: Vec<Byte>,
    pub data: Vec<Byte>,
}

impl Image {
    pub fn from_program(program: &[Word]) -> Self {
        let program = hw::words_to_bytes(program);
        Image {
            header: Header::new(program.len() as Word, 0),
            program,
            data: Vec::new(),
        }
    }

    /// Bytes beyond the declared sections are ignored.
    pub fn parse(bytes: &[Byte]) -> Result<Image, Error> {
        let header = Header::read(bytes)?;

        if (bytes.len() as u64) < header.image_size() {
            return Err(Error::Truncated {
                needed: header.image_size(),
                found: bytes.len() as u64,
            });
        }

        let program_end = Header::SIZE + header.program_length as usize;
        let data_end = program_end + header.data_length as usize;
        Ok(Image {
            header,
            program: bytes[Header::SIZE..program_end].to_vec(),
            data: bytes[program_end..data_end].to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<Byte> {
        let mut bytes = self.header.to_bytes();
        bytes.extend_from_slice(&self.program);
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Returns none if the program section is not a whole number of words.
    pub fn program_words(&self) -> Option<Vec<Word>> {
        hw::bytes_to_words(&self.program)
    }
}
