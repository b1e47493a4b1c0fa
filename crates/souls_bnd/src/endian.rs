//! Runtime endianness selection for header fields.
//!
//! Binders declare their byte order in the header, so the endianness is only known once
//! the leading flag bytes have been read.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn read_u16<R: Read>(self, reader: &mut R) -> io::Result<u16> {
        match self {
            Endian::Little => reader.read_u16::<LittleEndian>(),
            Endian::Big => reader.read_u16::<BigEndian>(),
        }
    }

    pub fn read_u32<R: Read>(self, reader: &mut R) -> io::Result<u32> {
        match self {
            Endian::Little => reader.read_u32::<LittleEndian>(),
            Endian::Big => reader.read_u32::<BigEndian>(),
        }
    }

    pub fn read_i32<R: Read>(self, reader: &mut R) -> io::Result<i32> {
        match self {
            Endian::Little => reader.read_i32::<LittleEndian>(),
            Endian::Big => reader.read_i32::<BigEndian>(),
        }
    }

    pub fn read_u64<R: Read>(self, reader: &mut R) -> io::Result<u64> {
        match self {
            Endian::Little => reader.read_u64::<LittleEndian>(),
            Endian::Big => reader.read_u64::<BigEndian>(),
        }
    }

    pub fn write_u16<W: Write>(self, writer: &mut W, value: u16) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_u16::<LittleEndian>(value),
            Endian::Big => writer.write_u16::<BigEndian>(value),
        }
    }

    pub fn write_u32<W: Write>(self, writer: &mut W, value: u32) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_u32::<LittleEndian>(value),
            Endian::Big => writer.write_u32::<BigEndian>(value),
        }
    }

    pub fn write_i32<W: Write>(self, writer: &mut W, value: i32) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_i32::<LittleEndian>(value),
            Endian::Big => writer.write_i32::<BigEndian>(value),
        }
    }

    pub fn write_u64<W: Write>(self, writer: &mut W, value: u64) -> io::Result<()> {
        match self {
            Endian::Little => writer.write_u64::<LittleEndian>(value),
            Endian::Big => writer.write_u64::<BigEndian>(value),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::Endian;

    #[test]
    fn reads_match_declared_order() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(Endian::Little.read_u32(&mut Cursor::new(&bytes)).unwrap(), 0x04030201);
        assert_eq!(Endian::Big.read_u32(&mut Cursor::new(&bytes)).unwrap(), 0x01020304);
    }

    #[test]
    fn writes_match_declared_order() {
        let mut little = Vec::new();
        let mut big = Vec::new();
        Endian::Little.write_u32(&mut little, 0x01020304).unwrap();
        Endian::Big.write_u32(&mut big, 0x01020304).unwrap();
        assert_eq!(little, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(big, [0x01, 0x02, 0x03, 0x04]);
    }
}
