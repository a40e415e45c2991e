pub mod disasm;
pub mod lang;
pub mod listing;
pub mod model;
pub mod phases;
pub mod writer;

mod defs;

pub use phases::types::{Error, ErrorKind};

use crate::image::Header;
use crate::isa::hw::{self, Byte, Word};
use log::info;
use phases::{symbols::SymbolTable, Emitting, Sizing};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

/// Assembly input. Each pass opens the source afresh and reads it from the start.
pub trait Source {
    type Reader: BufRead;

    fn open(&self) -> io::Result<Self::Reader>;

    fn name(&self) -> String;
}

impl<'a> Source for &'a str {
    type Reader = Cursor<&'a [u8]>;

    fn open(&self) -> io::Result<Self::Reader> {
        Ok(Cursor::new((*self).as_bytes()))
    }

    fn name(&self) -> String {
        "<string>".to_owned()
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl Source for FileSource {
    type Reader = BufReader<File>;

    fn open(&self) -> io::Result<Self::Reader> {
        Ok(BufReader::new(File::open(&self.path)?))
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// The outcome of the first pass. Code can only be emitted against a plan.
#[derive(Debug)]
pub struct Plan {
    symbols: SymbolTable,
    program_length: Word,
}

impl Plan {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn program_length(&self) -> Word {
        self.program_length
    }

    pub fn header(&self) -> Header {
        // There is no syntax for the data section yet, so it is always empty.
        Header::new(self.program_length, 0)
    }
}

fn open<S: Source>(source: &S) -> Result<S::Reader, Error> {
    source
        .open()
        .map_err(|err| Error::InputFile(source.name(), err))
}

/// Pass 1: sizes every line and records label addresses.
pub fn plan<S: Source>(source: &S) -> Result<Plan, Error> {
    info!("pass 1");
    let mut pass = Sizing::new();
    let program_length = phases::run_pass(open(source)?, &mut pass)?;
    let symbols = pass.into_symbols();
    info!(
        "program length {} bytes, {} labels",
        program_length,
        symbols.len()
    );

    Ok(Plan {
        symbols,
        program_length,
    })
}

/// Pass 2: writes the image for `plan`, reading the same source again.
pub fn emit<R: BufRead, W: Write>(
    plan: &Plan,
    reader: R,
    out: W,
    target: &str,
) -> Result<W, Error> {
    info!("pass 2");
    let output_error = |err| Error::OutputFile(target.to_owned(), err);

    let mut writer = writer::ImageWriter::new(out, plan.header()).map_err(output_error)?;
    let end = phases::run_pass(
        reader,
        &mut Emitting::new(&plan.symbols, &mut writer, target),
    )?;

    if end != plan.program_length {
        return Err(Error::Internal(format!(
            "pass 1 sized the program at {} bytes, pass 2 ended at {}",
            plan.program_length, end
        )));
    }

    writer.finish().map_err(|err| match err {
        writer::Error::Io(err) => output_error(err),
        other => Error::Internal(other.to_string()),
    })
}

/// Assembles `source` into a complete image, header included.
pub fn assemble_image(source: &str) -> Result<Vec<Byte>, Error> {
    let plan = plan(&source)?;
    emit(&plan, open(&source)?, Vec::new(), "<memory>")
}

/// Assembles `source` into program words.
pub fn assemble(source: &str) -> Result<Vec<Word>, Error> {
    let image = assemble_image(source)?;
    hw::bytes_to_words(&image[Header::SIZE..])
        .ok_or_else(|| Error::Internal("program is not a whole number of words".to_owned()))
}

/// Assembles the file at `input` into an image at `output`. The output is only
/// created once the first pass has succeeded.
pub fn assemble_path(input: &Path, output: &Path) -> Result<Plan, Error> {
    let source = FileSource::new(input);
    let plan = plan(&source)?;
    let reader = open(&source)?;

    let target = output.display().to_string();
    let file = File::create(output).map_err(|err| Error::OutputFile(target.clone(), err))?;
    emit(&plan, reader, BufWriter::new(file), &target)?;

    Ok(plan)
}
