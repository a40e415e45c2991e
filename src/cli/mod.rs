pub mod command;
pub mod hexdump;
