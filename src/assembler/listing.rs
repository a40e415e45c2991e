use super::phases::symbols::SymbolTable;
use std::io::{self, Write};

/// Writes one `address  name` line per label, in address order.
pub fn write_listing<W: Write>(symbols: &SymbolTable, out: &mut W) -> io::Result<()> {
    for sym in symbols.sorted() {
        writeln!(out, "{:08x}  {}", sym.address, sym.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{phases::types::Located, plan};

    #[test]
    fn sorted_by_address() {
        let plan = plan(&"main: nop\nmov r1 100000\nHelper: ret\nlate:").unwrap();
        let mut out = Vec::new();
        write_listing(plan.symbols(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "00000000  main\n0000000c  Helper\n00000010  late\n"
        );
    }

    #[test]
    fn empty_table() {
        let mut symbols = SymbolTable::new();
        let mut out = Vec::new();
        write_listing(&symbols, &mut out).unwrap();
        assert!(out.is_empty());

        symbols.define(Located::from("x"), 4).unwrap();
        write_listing(&symbols, &mut out).unwrap();
        assert_eq!(out, b"00000004  x\n");
    }
}
