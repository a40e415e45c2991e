use std::io::{self, Write};

const ROW: usize = 16;

/// Writes `bytes` sixteen to a row, each row prefixed with its offset.
pub fn write_hexdump<W: Write>(bytes: &[u8], out: &mut W) -> io::Result<()> {
    for (row, chunk) in bytes.chunks(ROW).enumerate() {
        write!(out, "{:08x}: ", row * ROW)?;
        for byte in chunk {
            write!(out, "{:02x} ", byte)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(bytes: &[u8]) -> String {
        let mut out = Vec::new();
        write_hexdump(bytes, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn rows() {
        assert_eq!(dump(&[]), "");
        assert_eq!(dump(&[0xfe, 0x71, 0x74, 0xf1]), "00000000: fe 71 74 f1 \n");

        let bytes = (0..18).collect::<Vec<u8>>();
        assert_eq!(
            dump(&bytes),
            "00000000: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f \n\
             00000010: 10 11 \n"
        );
    }

    #[test]
    fn full_row_has_no_blank_line() {
        assert_eq!(dump(&[0; 16]).lines().count(), 1);
    }
}
