use std::io::{self, Read, Write};
use std::mem;

use crate::{ParseError, ParseErrorKind, ParseResult, WriteError, WriteResult};

/// Byte order used for every multi-byte field of one stream.
///
/// Java edition files and the network protocol are big-endian; Bedrock
/// edition stores little-endian data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

macro_rules! impl_byte_order_primitive {
    ($ty:ty, $decode:ident, $encode:ident, $read:ident, $write:ident) => {
        impl ByteOrder {
            pub(crate) fn $decode(self, bytes: [u8; mem::size_of::<$ty>()]) -> $ty {
                match self {
                    ByteOrder::BigEndian => <$ty>::from_be_bytes(bytes),
                    ByteOrder::LittleEndian => <$ty>::from_le_bytes(bytes),
                }
            }

            pub(crate) fn $encode(self, value: $ty) -> [u8; mem::size_of::<$ty>()] {
                match self {
                    ByteOrder::BigEndian => value.to_be_bytes(),
                    ByteOrder::LittleEndian => value.to_le_bytes(),
                }
            }

            pub(crate) fn $read<R: Read>(self, reader: &mut R) -> ParseResult<$ty> {
                let mut bytes = [0u8; mem::size_of::<$ty>()];
                read_exact(reader, &mut bytes)?;
                Ok(self.$decode(bytes))
            }

            pub(crate) fn $write<W: Write>(self, writer: &mut W, value: $ty) -> WriteResult<()> {
                write_all(writer, &self.$encode(value))
            }
        }
    };
}

impl_byte_order_primitive!(i16, decode_i16, encode_i16, read_i16, write_i16);
impl_byte_order_primitive!(u16, decode_u16, encode_u16, read_u16, write_u16);
impl_byte_order_primitive!(i32, decode_i32, encode_i32, read_i32, write_i32);
impl_byte_order_primitive!(u32, decode_u32, encode_u32, read_u32, write_u32);
impl_byte_order_primitive!(i64, decode_i64, encode_i64, read_i64, write_i64);
impl_byte_order_primitive!(f32, decode_f32, encode_f32, read_f32, write_f32);
impl_byte_order_primitive!(f64, decode_f64, encode_f64, read_f64, write_f64);

/// Upper bound on capacity reserved up front from a length read off the wire.
const PREALLOCATION_LIMIT: usize = 64 * 1024;

/// Fills `buf` completely, reporting how much was actually available on a
/// short read.
pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> ParseResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(ParseError::new(ParseErrorKind::TruncatedInput {
                    needed: buf.len(),
                    available: filled,
                }));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ParseError::io(&e)),
        }
    }
    Ok(())
}

pub(crate) fn read_byte<R: Read>(reader: &mut R) -> ParseResult<u8> {
    let mut byte = [0u8; 1];
    read_exact(reader, &mut byte)?;
    Ok(byte[0])
}

/// Reads one byte, returning `None` if the stream is already at its end.
pub(crate) fn read_byte_or_eof<R: Read>(reader: &mut R) -> ParseResult<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ParseError::io(&e)),
        }
    }
}

/// Reads exactly `len` bytes. Memory grows with the data actually received,
/// so a forged length cannot force a large allocation on its own.
pub(crate) fn read_vec<R: Read>(reader: &mut R, len: usize) -> ParseResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOCATION_LIMIT));
    reader
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| ParseError::io(&e))?;

    if buf.len() != len {
        return Err(ParseError::new(ParseErrorKind::TruncatedInput {
            needed: len,
            available: buf.len(),
        }));
    }
    Ok(buf)
}

pub(crate) fn write_all<W: Write>(writer: &mut W, buf: &[u8]) -> WriteResult<()> {
    writer.write_all(buf).map_err(|e| WriteError::io(&e))
}
