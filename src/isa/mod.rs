pub mod cond;
pub mod hw;
pub mod layout;
pub mod opcode;

pub use cond::Cond;
pub use hw::{Byte, Inst, Word};
pub use opcode::OpCode;
