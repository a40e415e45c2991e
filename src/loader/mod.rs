pub mod engine;

pub use engine::{Callout, Engine, Fault, HostCallout, Outcome, Regions};

use crate::image::{self, Header, Image};
use crate::isa::hw::{Byte, Word};
use log::{debug, info};
use std::convert::TryFrom;
use std::fmt::Display;

pub const MIN_MEMORY_MB: u32 = 1;
pub const MAX_MEMORY_MB: u32 = 3800;
pub const DEFAULT_STACK_SIZE: usize = 1024;

pub const MAX_PROGRAM_LENGTH: u64 = 3 << 30;
pub const MAX_DATA_LENGTH: u64 = 400 << 20;

const MB_SHIFT: u32 = 20;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Image(image::Error),
    ProgramEmpty,
    ProgramTooLong(Word),
    DataTooLong(Word),
    TooMuchMemory(u32),
    AllocationFailed { bytes: u64 },
}

impl From<image::Error> for Error {
    fn from(err: image::Error) -> Self {
        Error::Image(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Image(err) => write!(f, "{}", err),
            Error::ProgramEmpty => write!(f, "program length is zero"),
            Error::ProgramTooLong(len) => write!(f, "program length {} is excessive", len),
            Error::DataTooLong(len) => write!(f, "data section length {} is excessive", len),
            Error::TooMuchMemory(mb) => write!(
                f,
                "too much memory specified: {} MB (at most {})",
                mb, MAX_MEMORY_MB
            ),
            Error::AllocationFailed { bytes } => {
                write!(f, "could not allocate {} bytes of VM memory", bytes)
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    memory_mb: u32,
    stack_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory_mb: MIN_MEMORY_MB,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl Config {
    /// Requests below the minimum are raised to it; requests above the
    /// maximum are refused.
    pub fn new(memory_mb: u32) -> Result<Self, Error> {
        if memory_mb > MAX_MEMORY_MB {
            return Err(Error::TooMuchMemory(memory_mb));
        }

        Ok(Config {
            memory_mb: memory_mb.max(MIN_MEMORY_MB),
            ..Default::default()
        })
    }

    pub fn with_stack_size(self, stack_size: usize) -> Self {
        Config { stack_size, ..self }
    }

    pub fn memory_mb(&self) -> u32 {
        self.memory_mb
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Where the data section sits in VM memory: just past the general memory.
    pub fn data_base(&self) -> Word {
        self.memory_mb << MB_SHIFT
    }
}

pub fn validate(header: &Header) -> Result<(), Error> {
    if header.program_length == 0 {
        return Err(Error::ProgramEmpty);
    }
    if header.program_length as u64 >= MAX_PROGRAM_LENGTH {
        return Err(Error::ProgramTooLong(header.program_length));
    }
    if header.data_length as u64 >= MAX_DATA_LENGTH {
        return Err(Error::DataTooLong(header.data_length));
    }
    Ok(())
}

fn zeroed(bytes: u64) -> Result<Vec<Byte>, Error> {
    let len = usize::try_from(bytes).map_err(|_| Error::AllocationFailed { bytes })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailed { bytes })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// An image laid out in memory, ready to hand to an engine.
#[derive(Debug)]
pub struct Loaded {
    program: Vec<Byte>,
    memory: Vec<Byte>,
    stack: Vec<Byte>,
    data_base: Word,
    data_length: Word,
}

impl Loaded {
    pub fn program(&self) -> &[Byte] {
        &self.program
    }

    pub fn memory(&self) -> &[Byte] {
        &self.memory
    }

    pub fn stack(&self) -> &[Byte] {
        &self.stack
    }

    pub fn data_base(&self) -> Word {
        self.data_base
    }

    pub fn data_length(&self) -> Word {
        self.data_length
    }

    pub fn regions(&mut self) -> Regions {
        Regions {
            program: &self.program,
            memory: &mut self.memory,
            stack: &mut self.stack,
        }
    }

    pub fn run(&mut self, engine: &mut dyn Engine, callout: &mut dyn Callout) -> Outcome {
        let (data_base, data_length) = (self.data_base, self.data_length);
        let code = engine.run(self.regions(), callout, data_base, data_length);
        debug!("engine returned {:#x}", code);
        Outcome::from_code(code)
    }
}

pub fn load(config: &Config, image: &Image) -> Result<Loaded, Error> {
    validate(&image.header)?;

    let data_base = config.data_base();
    let data_length = image.header.data_length;
    if image.data.len() as u64 != data_length as u64 {
        return Err(image::Error::Truncated {
            needed: data_length as u64,
            found: image.data.len() as u64,
        }
        .into());
    }

    let mut memory = zeroed(data_base as u64 + data_length as u64)?;
    memory[data_base as usize..].copy_from_slice(&image.data);
    let stack = zeroed(config.stack_size as u64)?;

    info!(
        "loaded {} program bytes, {} MiB memory, {} data bytes at {:#010x}, {} byte stack",
        image.program.len(),
        config.memory_mb,
        data_length,
        data_base,
        stack.len()
    );

    Ok(Loaded {
        program: image.program.clone(),
        memory,
        stack,
        data_base,
        data_length,
    })
}

/// Parses, validates and lays out a raw image file.
pub fn load_bytes(config: &Config, bytes: &[Byte]) -> Result<Loaded, Error> {
    let header = Header::read(bytes)?;
    validate(&header)?;
    load(config, &Image::parse(bytes)?)
}
