use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::parse::DEFAULT_MAX_DEPTH;
use crate::stream::write_all;
use crate::{
    ByteOrder, Compound, Context, List, Nbt, Tag, TypeId, Value, WriteError, WriteErrorKind,
    WriteResult,
};

/// Writes tags to a byte sink in a fixed byte order.
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
    order: ByteOrder,
    max_depth: usize,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W, order: ByteOrder) -> Self {
        Encoder {
            writer,
            order,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes one complete named tag. An End tag is written as the single
    /// byte 0x00 with no name.
    pub fn write_tag(&mut self, tag: &Tag) -> WriteResult<()> {
        self.write_named(tag.name(), tag.value(), 0)
    }

    fn write_named(&mut self, name: &str, value: &Value, depth: usize) -> WriteResult<()> {
        let id = value.id();
        write_all(&mut self.writer, &[u8::from(id)])?;
        if id == TypeId::End {
            return Ok(());
        }

        trace!(%id, name, depth, "writing tag");
        self.write_string(name)
            .and_then(|()| self.write_payload(value, depth))
            .map_err(|e| {
                e.with_context(Context::Tag {
                    id,
                    name: name.to_string(),
                })
            })
    }

    fn write_payload(&mut self, value: &Value, depth: usize) -> WriteResult<()> {
        let order = self.order;
        match value {
            Value::End => Ok(()),
            Value::Byte(v) => write_all(&mut self.writer, &[*v as u8]),
            Value::Short(v) => order.write_i16(&mut self.writer, *v),
            Value::Int(v) => order.write_i32(&mut self.writer, *v),
            Value::Long(v) => order.write_i64(&mut self.writer, *v),
            Value::Float(v) => order.write_f32(&mut self.writer, *v),
            Value::Double(v) => order.write_f64(&mut self.writer, *v),
            Value::ByteArray(v) => self.write_array(v, |b| [*b as u8]),
            Value::String(v) => self.write_string(v),
            Value::List(list) => self.write_list(list, depth + 1),
            Value::Compound(compound) => self.write_compound(compound, depth + 1),
            Value::IntArray(v) => self.write_array(v, |i| order.encode_i32(*i)),
            Value::LongArray(v) => self.write_array(v, |l| order.encode_i64(*l)),
        }
    }

    fn enter(&self, depth: usize) -> WriteResult<()> {
        if depth > self.max_depth {
            debug!(depth, max_depth = self.max_depth, "nesting too deep");
            return Err(WriteError::new(WriteErrorKind::DepthLimitExceeded(
                self.max_depth,
            )));
        }
        Ok(())
    }

    fn write_list(&mut self, list: &List, depth: usize) -> WriteResult<()> {
        self.enter(depth)?;

        let element_type = list.element_type();
        for (index, element) in list.iter().enumerate() {
            if element.id() != element_type {
                return Err(WriteError::new(WriteErrorKind::ListElementMismatch {
                    index,
                    expected: element_type,
                    actual: element.id(),
                }));
            }
        }
        if element_type == TypeId::End && !list.is_empty() {
            return Err(WriteError::new(WriteErrorKind::UnsupportedShape("End")));
        }

        write_all(&mut self.writer, &[u8::from(element_type)])?;
        self.write_len(list.len())?;
        for (index, element) in list.iter().enumerate() {
            self.write_payload(element, depth)
                .map_err(|e| e.with_context(Context::Index(index)))?;
        }
        Ok(())
    }

    fn write_compound(&mut self, compound: &Compound, depth: usize) -> WriteResult<()> {
        self.enter(depth)?;

        for (name, value) in compound.iter() {
            if let Value::End = value {
                return Err(WriteError::new(WriteErrorKind::UnsupportedShape("End"))
                    .with_context(Context::Tag {
                        id: TypeId::End,
                        name: name.to_string(),
                    }));
            }
            self.write_named(name, value, depth)?;
        }
        write_all(&mut self.writer, &[u8::from(TypeId::End)])
    }

    fn write_string(&mut self, s: &str) -> WriteResult<()> {
        let len =
            u16::try_from(s.len()).map_err(|_| WriteError::new(WriteErrorKind::StringTooLong(s.len())))?;
        self.order.write_u16(&mut self.writer, len)?;
        write_all(&mut self.writer, s.as_bytes())
    }

    fn write_len(&mut self, len: usize) -> WriteResult<()> {
        let len =
            u32::try_from(len).map_err(|_| WriteError::new(WriteErrorKind::ContentTooLarge(len)))?;
        self.order.write_u32(&mut self.writer, len)
    }

    fn write_array<T, const N: usize>(
        &mut self,
        items: &[T],
        encode: impl Fn(&T) -> [u8; N],
    ) -> WriteResult<()> {
        self.write_len(items.len())?;
        let mut buffer = Vec::with_capacity(items.len() * N);
        for item in items {
            buffer.extend_from_slice(&encode(item));
        }
        write_all(&mut self.writer, &buffer)
    }
}

/// Writes one tag to `writer`.
pub fn write_tag<W: Write>(writer: W, order: ByteOrder, tag: &Tag) -> WriteResult<()> {
    Encoder::new(writer, order).write_tag(tag)
}

/// Converts `value` to a tag and writes it as an unnamed root tag.
pub fn marshal<T: Nbt, W: Write>(writer: W, order: ByteOrder, value: &T) -> WriteResult<()> {
    let tag = Tag::new("", value.to_value()?);
    write_tag(writer, order, &tag)
}

/// Serializes `value` as an unnamed root tag into a new Vec<u8>.
pub fn to_vec<T: Nbt>(value: &T, order: ByteOrder) -> WriteResult<Vec<u8>> {
    let mut buffer = Vec::new();
    marshal(&mut buffer, order, value)?;
    Ok(buffer)
}

pub fn to_bytes<T: Nbt>(value: &T, order: ByteOrder) -> WriteResult<Bytes> {
    let mut writer = BytesMut::new().writer();
    marshal(&mut writer, order, value)?;
    Ok(writer.into_inner().freeze())
}
