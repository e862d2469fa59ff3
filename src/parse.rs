use std::io::Read;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::stream::{read_byte, read_byte_or_eof, read_vec};
use crate::{
    ByteOrder, Compound, Context, List, Nbt, ParseError, ParseErrorKind, ParseResult, Tag,
    TypeId, Value,
};

/// Container nesting allowed by a [`Decoder`] unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Reads tags from a byte stream.
///
/// Every multi-byte field is read in the byte order given at construction.
/// Nesting of Lists and Compounds is bounded by a depth limit, so malformed
/// or hostile input fails with an error instead of exhausting the stack.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    order: ByteOrder,
    max_depth: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R, order: ByteOrder) -> Self {
        Decoder {
            reader,
            order,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum container nesting depth. The root container counts
    /// as depth 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads one complete named tag.
    ///
    /// A root End tag is a single 0x00 byte with no name.
    pub fn read_tag(&mut self) -> ParseResult<Tag> {
        let type_byte = read_byte(&mut self.reader)?;
        self.read_named(type_byte, 0)
    }

    /// Reads the next root tag, or returns `None` if the stream ends cleanly
    /// before its first byte.
    pub fn next_tag(&mut self) -> ParseResult<Option<Tag>> {
        match read_byte_or_eof(&mut self.reader)? {
            Some(type_byte) => self.read_named(type_byte, 0).map(Some),
            None => Ok(None),
        }
    }

    fn read_named(&mut self, type_byte: u8, depth: usize) -> ParseResult<Tag> {
        let mut value = TypeId::construct(type_byte)?;
        if let Value::End = value {
            return Ok(Tag::end());
        }

        let id = value.id();
        let name = match self.read_string() {
            Ok(name) => name,
            Err(e) => {
                return Err(e.with_context(Context::Tag {
                    id,
                    name: String::new(),
                }));
            }
        };
        trace!(%id, name = %name, depth, "reading tag");

        match self.read_payload(&mut value, depth) {
            Ok(()) => Ok(Tag::new(name, value)),
            Err(e) => Err(e.with_context(Context::Tag { id, name })),
        }
    }

    /// Fills `value` with a payload of its own kind.
    fn read_payload(&mut self, value: &mut Value, depth: usize) -> ParseResult<()> {
        let order = self.order;
        match value {
            Value::End => {}
            Value::Byte(v) => *v = read_byte(&mut self.reader)? as i8,
            Value::Short(v) => *v = order.read_i16(&mut self.reader)?,
            Value::Int(v) => *v = order.read_i32(&mut self.reader)?,
            Value::Long(v) => *v = order.read_i64(&mut self.reader)?,
            Value::Float(v) => *v = order.read_f32(&mut self.reader)?,
            Value::Double(v) => *v = order.read_f64(&mut self.reader)?,
            Value::ByteArray(v) => *v = self.read_array(|b: [u8; 1]| b[0] as i8)?,
            Value::String(v) => *v = self.read_string()?,
            Value::List(list) => self.read_list(list, depth + 1)?,
            Value::Compound(compound) => self.read_compound(compound, depth + 1)?,
            Value::IntArray(v) => *v = self.read_array(|b: [u8; 4]| order.decode_i32(b))?,
            Value::LongArray(v) => *v = self.read_array(|b: [u8; 8]| order.decode_i64(b))?,
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> ParseResult<()> {
        if depth > self.max_depth {
            debug!(depth, max_depth = self.max_depth, "nesting too deep");
            return Err(ParseError::new(ParseErrorKind::DepthLimitExceeded(
                self.max_depth,
            )));
        }
        Ok(())
    }

    fn read_list(&mut self, list: &mut List, depth: usize) -> ParseResult<()> {
        self.enter(depth)?;

        let element_type = TypeId::from_code(read_byte(&mut self.reader)?)?;
        let count = self.order.read_u32(&mut self.reader)?;
        if element_type == TypeId::End && count > 0 {
            return Err(ParseError::new(ParseErrorKind::NonEmptyEndList(count)));
        }

        list.set_element_type(element_type);
        list.reserve((count as usize).min(1024));
        for index in 0..count as usize {
            let mut element = element_type.empty_value();
            self.read_payload(&mut element, depth)
                .map_err(|e| e.with_context(Context::Index(index)))?;
            list.push(element);
        }
        Ok(())
    }

    fn read_compound(&mut self, compound: &mut Compound, depth: usize) -> ParseResult<()> {
        self.enter(depth)?;

        loop {
            let type_byte = read_byte(&mut self.reader)?;
            if type_byte == u8::from(TypeId::End) {
                return Ok(());
            }
            let tag = self.read_named(type_byte, depth)?;
            compound.put(tag);
        }
    }

    fn read_string(&mut self) -> ParseResult<String> {
        let len = self.order.read_u16(&mut self.reader)? as usize;
        let bytes = read_vec(&mut self.reader, len)?;
        String::from_utf8(bytes).map_err(|_| ParseError::new(ParseErrorKind::InvalidUtf8))
    }

    /// Reads a u32 element count followed by that many fixed-width elements.
    fn read_array<T, const N: usize>(&mut self, decode: impl Fn([u8; N]) -> T) -> ParseResult<Vec<T>> {
        let count = self.order.read_u32(&mut self.reader)? as usize;
        let bytes = read_vec(&mut self.reader, count.saturating_mul(N)).map_err(|e| {
            let available = match e.kind() {
                ParseErrorKind::TruncatedInput { available, .. } => Some(*available),
                _ => None,
            };
            match available {
                Some(available) => e.with_context(Context::Index(available / N)),
                None => e,
            }
        })?;

        Ok(bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut buf = [0u8; N];
                buf.copy_from_slice(chunk);
                decode(buf)
            })
            .collect())
    }
}

/// Reads one tag from `reader`.
pub fn read_tag<R: Read>(reader: R, order: ByteOrder) -> ParseResult<Tag> {
    Decoder::new(reader, order).read_tag()
}

/// Reads one tag from `reader` and maps its payload onto `T`. The root
/// tag's name is ignored.
pub fn unmarshal<T: Nbt, R: Read>(reader: R, order: ByteOrder) -> ParseResult<T> {
    let tag = read_tag(reader, order)?;
    T::from_value(tag.into_value())
}

/// Like [`unmarshal`], but requires the root tag to span all of `data`.
pub fn from_slice<T: Nbt>(data: &[u8], order: ByteOrder) -> ParseResult<T> {
    let mut remaining = data;
    let tag = read_tag(&mut remaining, order)?;

    if !remaining.is_empty() {
        return Err(ParseError::new(ParseErrorKind::ExtraData {
            bytes_remaining: remaining.len(),
        }));
    }

    T::from_value(tag.into_value())
}

pub fn from_bytes<T: Nbt>(data: Bytes, order: ByteOrder) -> ParseResult<T> {
    from_slice(&data, order)
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::{
        ByteOrder, Compound, Context, List, ParseError, ParseErrorKind, Tag, TypeId, Value,
        from_slice, read_tag, write_tag,
    };

    #[test]
    fn test_read_byte_tag() {
        let data: &[u8] = &[0x01, 0x00, 0x01, 0x78, 0xFF];
        assert_eq!(
            read_tag(data, ByteOrder::BigEndian),
            Ok(Tag::new("x", -1i8))
        );
    }

    #[test]
    fn test_read_string_tag() {
        let data: &[u8] = &[0x08, 0x00, 0x00, 0x00, 0x02, 0x68, 0x69];
        assert_eq!(read_tag(data, ByteOrder::BigEndian), Ok(Tag::new("", "hi")));
    }

    #[test]
    fn test_read_empty_compound() {
        let data: &[u8] = &[0x0A, 0x00, 0x00, 0x00];
        assert_eq!(
            read_tag(data, ByteOrder::BigEndian),
            Ok(Tag::new("", Compound::new()))
        );
    }

    #[test]
    fn test_read_int_list() {
        let data: &[u8] = &[
            0x09, 0x00, 0x01, 0x4C, 0x03, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02,
        ];
        let expected = List::with_elements(
            TypeId::Int,
            vec![Value::Int(0), Value::Int(1), Value::Int(2)],
        );
        assert_eq!(
            read_tag(data, ByteOrder::BigEndian),
            Ok(Tag::new("L", expected))
        );
    }

    #[test]
    fn test_read_little_endian() {
        let data: &[u8] = &[
            0x03, 0x01, 0x00, 0x61, 0x01, 0x02, 0x03, 0x04, // Int "a"
        ];
        assert_eq!(
            read_tag(data, ByteOrder::LittleEndian),
            Ok(Tag::new("a", 0x0403_0201i32))
        );

        let data: &[u8] = &[0x0B, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            read_tag(data, ByteOrder::LittleEndian),
            Ok(Tag::new("", vec![1i32, -1]))
        );
    }

    #[test]
    fn test_read_nested_compound() {
        let data: &[u8] = &[
            0x0A, 0x00, 0x00, // root compound
            0x0A, 0x00, 0x01, 0x63, // compound "c"
            0x02, 0x00, 0x01, 0x73, 0x01, 0x00, // short "s" = 256
            0x00, // end of "c"
            0x07, 0x00, 0x01, 0x62, 0x00, 0x00, 0x00, 0x02, 0x01, 0xFE, // bytes "b"
            0x00, // end of root
        ];
        let tag = read_tag(data, ByteOrder::BigEndian).unwrap();
        let root = tag.as_compound().unwrap();
        let child = root.get("c").unwrap().as_compound().unwrap();
        assert_eq!(child.get("s"), Some(&Value::Short(256)));
        assert_eq!(root.get("b"), Some(&Value::ByteArray(vec![1, -2])));
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["c", "b"]);
    }

    #[test]
    fn test_root_end_tag() {
        let data: &[u8] = &[0x00];
        assert_eq!(read_tag(data, ByteOrder::BigEndian), Ok(Tag::end()));
    }

    #[test]
    fn test_empty_input() {
        let data: &[u8] = &[];
        assert_eq!(
            read_tag(data, ByteOrder::BigEndian),
            Err(ParseError::new(ParseErrorKind::TruncatedInput {
                needed: 1,
                available: 0
            }))
        );
    }

    #[test]
    fn test_next_tag_stream() {
        let data: &[u8] = &[0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x00, 0x00, 0x07];
        let mut decoder = Decoder::new(data, ByteOrder::BigEndian);
        assert_eq!(decoder.next_tag(), Ok(Some(Tag::new("", 5i8))));
        assert_eq!(decoder.next_tag(), Ok(Some(Tag::end())));
        assert_eq!(decoder.next_tag(), Ok(Some(Tag::new("", 7i8))));
        assert_eq!(decoder.next_tag(), Ok(None));
    }

    #[test]
    fn test_unknown_type_code_in_compound() {
        let data: &[u8] = &[0x0A, 0x00, 0x01, 0x72, 0x0D, 0x00, 0x00];
        let err = read_tag(data, ByteOrder::BigEndian).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::UnknownTypeCode(0x0D));
        assert_eq!(
            err.context(),
            &[Context::Tag {
                id: TypeId::Compound,
                name: "r".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_list_element_type() {
        let data: &[u8] = &[0x09, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00];
        let err = read_tag(data, ByteOrder::BigEndian).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::UnknownTypeCode(0x20));
    }

    #[test]
    fn test_non_empty_end_list() {
        let data: &[u8] = &[0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02];
        let err = read_tag(data, ByteOrder::BigEndian).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::NonEmptyEndList(2));

        let data: &[u8] = &[0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            read_tag(data, ByteOrder::BigEndian),
            Ok(Tag::new("", List::new(TypeId::End)))
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let data: &[u8] = &[0x08, 0x00, 0x00, 0x00, 0x02, 0xC3, 0x28];
        let err = read_tag(data, ByteOrder::BigEndian).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::InvalidUtf8);
    }

    #[test]
    fn test_truncated_array_context() {
        let data: &[u8] = &[
            0x09, 0x00, 0x03, 0x70, 0x6F, 0x73, // list "pos"
            0x03, 0x00, 0x00, 0x00, 0x03, // three ints
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00,
        ];
        let err = read_tag(data, ByteOrder::BigEndian).unwrap_err();
        assert_eq!(
            err,
            ParseError::new(ParseErrorKind::TruncatedInput {
                needed: 4,
                available: 1
            })
            .with_context(Context::Index(2))
            .with_context(Context::Tag {
                id: TypeId::List,
                name: "pos".to_string()
            })
        );

        let data: &[u8] = &[0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
        let err = read_tag(data, ByteOrder::BigEndian).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::TruncatedInput {
                needed: 16,
                available: 9
            }
        );
        assert_eq!(err.context()[0], Context::Index(1));
    }

    #[test]
    fn test_every_truncated_prefix_fails() {
        let data: &[u8] = &[
            0x0A, 0x00, 0x01, 0x72, // compound "r"
            0x09, 0x00, 0x01, 0x6C, 0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x61, // list of one string
            0x0B, 0x00, 0x01, 0x69, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x09, // int array
            0x06, 0x00, 0x01, 0x64, 0x3F, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // double
            0x00,
        ];
        assert!(read_tag(data, ByteOrder::BigEndian).is_ok());

        for len in 0..data.len() {
            let err = read_tag(&data[..len], ByteOrder::BigEndian).unwrap_err();
            assert!(
                matches!(err.kind(), ParseErrorKind::TruncatedInput { .. }),
                "prefix of {len} bytes: {err}"
            );
        }
    }

    /// Builds well-formed random streams rooted at a Compound.
    struct StreamGenerator {
        seed: u64,
        order: ByteOrder,
        out: Vec<u8>,
    }

    impl StreamGenerator {
        const MAX_NESTING: usize = 4;

        fn new(seed: u64) -> Self {
            StreamGenerator {
                seed,
                order: ByteOrder::BigEndian,
                out: Vec::new(),
            }
        }

        fn next(&mut self) -> u64 {
            self.seed ^= self.seed << 13;
            self.seed ^= self.seed >> 7;
            self.seed ^= self.seed << 17;
            self.seed
        }

        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }

        fn root(&mut self, order: ByteOrder) -> Vec<u8> {
            self.order = order;
            self.out.clear();
            self.out.push(0x0A);
            self.name();
            self.payload(0x0A, 1);
            std::mem::take(&mut self.out)
        }

        fn name(&mut self) {
            let len = self.below(4) as u16;
            self.out.extend(self.order.encode_u16(len));
            for _ in 0..len {
                let c = b'a' + self.below(26) as u8;
                self.out.push(c);
            }
        }

        fn element_code(&mut self, depth: usize) -> u8 {
            if depth >= Self::MAX_NESTING {
                [1, 2, 3, 4, 5, 6, 7, 8, 11, 12][self.below(10) as usize]
            } else {
                1 + self.below(12) as u8
            }
        }

        fn count(&mut self) -> u32 {
            let n = self.below(5) as u32;
            self.out.extend(self.order.encode_u32(n));
            n
        }

        fn payload(&mut self, code: u8, depth: usize) {
            let order = self.order;
            match code {
                1 => {
                    let b = self.next() as u8;
                    self.out.push(b);
                }
                2 => {
                    let v = self.next() as i16;
                    self.out.extend(order.encode_i16(v));
                }
                3 => {
                    let v = self.next() as i32;
                    self.out.extend(order.encode_i32(v));
                }
                4 => {
                    let v = self.next() as i64;
                    self.out.extend(order.encode_i64(v));
                }
                5 => {
                    let v = self.below(2000) as f32 - 1000.5;
                    self.out.extend(order.encode_f32(v));
                }
                6 => {
                    let v = self.below(2000) as f64 / 8.0 - 125.0;
                    self.out.extend(order.encode_f64(v));
                }
                7 => {
                    for _ in 0..self.count() {
                        let b = self.next() as u8;
                        self.out.push(b);
                    }
                }
                8 => self.name(),
                9 => {
                    let element = if self.below(8) == 0 {
                        0
                    } else {
                        self.element_code(depth)
                    };
                    self.out.push(element);
                    if element == 0 {
                        self.out.extend(order.encode_u32(0));
                    } else {
                        for _ in 0..self.count() {
                            self.payload(element, depth + 1);
                        }
                    }
                }
                10 => {
                    for _ in 0..self.below(5) {
                        let child = self.element_code(depth);
                        self.out.push(child);
                        self.name();
                        self.payload(child, depth + 1);
                    }
                    self.out.push(0x00);
                }
                11 => {
                    for _ in 0..self.count() {
                        let v = self.next() as i32;
                        self.out.extend(order.encode_i32(v));
                    }
                }
                12 => {
                    for _ in 0..self.count() {
                        let v = self.next() as i64;
                        self.out.extend(order.encode_i64(v));
                    }
                }
                _ => unreachable!("generator only emits known codes"),
            }
        }
    }

    fn encode(tag: &Tag, order: ByteOrder) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_tag(&mut buffer, order, tag).unwrap();
        buffer
    }

    #[test]
    fn test_generated_streams_reencode() {
        let mut generator = StreamGenerator::new(0x2545_F491_4F6C_DD1D);
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            for _ in 0..1000 {
                let data = generator.root(order);
                let tag = read_tag(data.as_slice(), order).unwrap();
                let encoded = encode(&tag, order);
                assert_eq!(read_tag(encoded.as_slice(), order), Ok(tag));
            }
        }
    }

    #[test]
    fn test_corrupted_streams_reencode_when_accepted() {
        let mut generator = StreamGenerator::new(0x9E37_79B9_7F4A_7C15);
        let mut accepted = 0;
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            for _ in 0..2000 {
                let mut data = generator.root(order);
                let position = generator.below(data.len() as u64) as usize;
                data[position] = generator.next() as u8;

                // Corruption may produce NaN floats, so compare bytes.
                if let Ok(tag) = read_tag(data.as_slice(), order) {
                    accepted += 1;
                    let encoded = encode(&tag, order);
                    let decoded = read_tag(encoded.as_slice(), order).unwrap();
                    assert_eq!(encode(&decoded, order), encoded);
                }
            }
        }
        assert!(accepted > 0);
    }

    #[test]
    fn test_arbitrary_bytes_do_not_panic() {
        let mut generator = StreamGenerator::new(0x2545_F491_4F6C_DD1D);
        for _ in 0..2000 {
            let len = generator.below(48);
            let data: Vec<u8> = (0..len).map(|_| generator.below(14) as u8).collect();
            for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
                if let Ok(tag) = read_tag(data.as_slice(), order) {
                    let encoded = encode(&tag, order);
                    assert!(read_tag(encoded.as_slice(), order).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_depth_limit() {
        // Three nested compounds.
        let data: &[u8] = &[
            0x0A, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert!(
            Decoder::new(data, ByteOrder::BigEndian)
                .with_max_depth(3)
                .read_tag()
                .is_ok()
        );

        let err = Decoder::new(data, ByteOrder::BigEndian)
            .with_max_depth(2)
            .read_tag()
            .unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::DepthLimitExceeded(2));
        assert_eq!(err.context().len(), 3);
    }

    #[test]
    fn test_deeply_nested_lists() {
        let mut data = vec![0x09, 0x00, 0x00];
        for _ in 0..100_000 {
            data.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x01]);
        }
        let err = read_tag(data.as_slice(), ByteOrder::BigEndian).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::DepthLimitExceeded(super::DEFAULT_MAX_DEPTH)
        );
    }

    #[test]
    fn test_from_slice_extra_data() {
        let data: &[u8] = &[0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2A, 0xFF, 0xEE];
        assert_eq!(
            from_slice::<i32>(data, ByteOrder::BigEndian),
            Err(ParseError::new(ParseErrorKind::ExtraData {
                bytes_remaining: 2
            }))
        );
        assert_eq!(from_slice::<i32>(&data[..7], ByteOrder::BigEndian), Ok(42));
    }
}
