pub(crate) mod common;

pub mod image;
pub mod isa;

pub mod assembler;
pub mod loader;

pub mod cli;
