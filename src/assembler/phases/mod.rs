pub mod types;

pub mod driver;
pub mod encode;
pub mod operand;
pub mod symbols;
pub mod tokenize;

pub use driver::{run_pass, Emitting, Pass, Sizing};
pub use encode::{encode, encode_line, Encoding};
pub use tokenize::tokenize_line;
