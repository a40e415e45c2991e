#![allow(dead_code)]

use ravm::assembler::{self, ErrorKind};
use ravm::isa::{Inst, Word};
use std::path::PathBuf;

pub fn words(source: &str) -> Vec<Word> {
    assembler::assemble(source).unwrap_or_else(|err| panic!("{}\nin:\n{}", err, source))
}

pub fn first_inst(source: &str) -> Inst {
    Inst::decode(words(source)[0]).unwrap()
}

pub fn error_kind(source: &str) -> ErrorKind {
    assembler::assemble(source).unwrap_err().kind()
}

pub fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("asm").join("demo")
}

pub fn demo_sources() -> Vec<PathBuf> {
    let mut paths = std::fs::read_dir(demo_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "ras"))
        .collect::<Vec<_>>();
    paths.sort();
    assert!(!paths.is_empty());
    paths
}
