use std::fmt;
use std::sync::Arc;

use crate::tag::kind_mismatch;
use crate::traits::vec_from_list;
use crate::{
    Compound, List, Nbt, ParseError, ParseErrorKind, ParseResult, Value, WriteErrorKind,
    WriteResult,
};

/// Type codes used on the wire, one per tag kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeId {
    End = 0x00,
    Byte = 0x01,
    Short = 0x02,
    Int = 0x03,
    Long = 0x04,
    Float = 0x05,
    Double = 0x06,
    ByteArray = 0x07,
    String = 0x08,
    List = 0x09,
    Compound = 0x0A,
    IntArray = 0x0B,
    LongArray = 0x0C,
}

impl TypeId {
    /// Number of known type codes; every valid code is below this.
    pub const COUNT: usize = 13;

    /// All type codes in wire order.
    pub const ALL: [TypeId; TypeId::COUNT] = [
        TypeId::End,
        TypeId::Byte,
        TypeId::Short,
        TypeId::Int,
        TypeId::Long,
        TypeId::Float,
        TypeId::Double,
        TypeId::ByteArray,
        TypeId::String,
        TypeId::List,
        TypeId::Compound,
        TypeId::IntArray,
        TypeId::LongArray,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        TypeId::ALL.get(byte as usize).copied()
    }

    /// Validates a type code read from the wire.
    pub(crate) fn from_code(code: u8) -> ParseResult<Self> {
        TypeId::from_byte(code)
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnknownTypeCode(code)))
    }

    /// Creates the empty value of the kind named by `code`.
    pub fn construct(code: u8) -> ParseResult<Value> {
        TypeId::from_code(code).map(TypeId::empty_value)
    }

    /// Returns the empty value of this kind.
    pub fn empty_value(self) -> Value {
        match self {
            TypeId::End => Value::End,
            TypeId::Byte => Value::Byte(0),
            TypeId::Short => Value::Short(0),
            TypeId::Int => Value::Int(0),
            TypeId::Long => Value::Long(0),
            TypeId::Float => Value::Float(0.0),
            TypeId::Double => Value::Double(0.0),
            TypeId::ByteArray => Value::ByteArray(Vec::new()),
            TypeId::String => Value::String(String::new()),
            TypeId::List => Value::List(List::default()),
            TypeId::Compound => Value::Compound(Compound::new()),
            TypeId::IntArray => Value::IntArray(Vec::new()),
            TypeId::LongArray => Value::LongArray(Vec::new()),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TypeId::End => "End",
            TypeId::Byte => "Byte",
            TypeId::Short => "Short",
            TypeId::Int => "Int",
            TypeId::Long => "Long",
            TypeId::Float => "Float",
            TypeId::Double => "Double",
            TypeId::ByteArray => "ByteArray",
            TypeId::String => "String",
            TypeId::List => "List",
            TypeId::Compound => "Compound",
            TypeId::IntArray => "IntArray",
            TypeId::LongArray => "LongArray",
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<TypeId> for u8 {
    fn from(type_id: TypeId) -> u8 {
        type_id as u8
    }
}

impl TryFrom<u8> for TypeId {
    type Error = ParseError;

    fn try_from(code: u8) -> ParseResult<Self> {
        TypeId::from_code(code)
    }
}

// Unsigned types are reinterpreted as the signed tag of the same width.
macro_rules! impl_nbt_number {
    ($ty:ty => $variant:ident($wire:ty) $(, $($extra:tt)*)?) => {
        impl Nbt for $ty {
            fn to_value(&self) -> WriteResult<Value> {
                Ok(Value::$variant(*self as $wire))
            }

            fn from_value(value: Value) -> ParseResult<Self> {
                match value {
                    Value::$variant(v) => Ok(v as $ty),
                    other => Err(kind_mismatch(TypeId::$variant, other.id())),
                }
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            $($($extra)*)?
        }
    };
}

impl_nbt_number!(i8 => Byte(i8),
    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        byte_array_from_value(value, |b| b)
    }
);
impl_nbt_number!(u8 => Byte(i8),
    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        byte_array_from_value(value, |b| b as u8)
    }
);
impl_nbt_number!(i16 => Short(i16));
impl_nbt_number!(u16 => Short(i16));
impl_nbt_number!(i32 => Int(i32),
    fn slice_to_value(items: &[Self]) -> WriteResult<Value> {
        Ok(Value::IntArray(items.to_vec()))
    }

    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        int_array_from_value(value, |v| v)
    }
);
impl_nbt_number!(u32 => Int(i32),
    fn slice_to_value(items: &[Self]) -> WriteResult<Value> {
        Ok(Value::IntArray(items.iter().map(|&v| v as i32).collect()))
    }

    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        int_array_from_value(value, |v| v as u32)
    }
);
impl_nbt_number!(i64 => Long(i64),
    fn slice_to_value(items: &[Self]) -> WriteResult<Value> {
        Ok(Value::LongArray(items.to_vec()))
    }

    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        long_array_from_value(value, |v| v)
    }
);
impl_nbt_number!(u64 => Long(i64),
    fn slice_to_value(items: &[Self]) -> WriteResult<Value> {
        Ok(Value::LongArray(items.iter().map(|&v| v as i64).collect()))
    }

    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        long_array_from_value(value, |v| v as u64)
    }
);

// Pointer-sized integers travel as Long and are narrowed with a check.
macro_rules! impl_nbt_pointer_width {
    ($($ty:ident),*) => {$(
        impl Nbt for $ty {
            fn to_value(&self) -> WriteResult<Value> {
                Ok(Value::Long(*self as i64))
            }

            fn from_value(value: Value) -> ParseResult<Self> {
                match value {
                    Value::Long(v) => $ty::try_from(v).map_err(|_| {
                        ParseError::new(ParseErrorKind::IntegerOutOfRange {
                            value: v,
                            target: stringify!($ty),
                        })
                    }),
                    other => Err(kind_mismatch(TypeId::Long, other.id())),
                }
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

impl_nbt_pointer_width!(isize, usize);

// Zero means all bits clear; `-0.0` is a value of its own.
macro_rules! impl_nbt_float {
    ($($ty:ident => $variant:ident),*) => {$(
        impl Nbt for $ty {
            fn to_value(&self) -> WriteResult<Value> {
                Ok(Value::$variant(*self))
            }

            fn from_value(value: Value) -> ParseResult<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(kind_mismatch(TypeId::$variant, other.id())),
                }
            }

            fn is_zero(&self) -> bool {
                self.to_bits() == 0
            }
        }
    )*};
}

impl_nbt_float!(f32 => Float, f64 => Double);

fn byte_array_from_value<T: Nbt>(value: Value, convert: fn(i8) -> T) -> ParseResult<Vec<T>> {
    match value {
        Value::ByteArray(bytes) => Ok(bytes.into_iter().map(convert).collect()),
        Value::List(list) => vec_from_list(list),
        other => Err(kind_mismatch(TypeId::ByteArray, other.id())),
    }
}

fn int_array_from_value<T: Nbt>(value: Value, convert: fn(i32) -> T) -> ParseResult<Vec<T>> {
    match value {
        Value::IntArray(ints) => Ok(ints.into_iter().map(convert).collect()),
        Value::List(list) => vec_from_list(list),
        other => Err(kind_mismatch(TypeId::IntArray, other.id())),
    }
}

fn long_array_from_value<T: Nbt>(value: Value, convert: fn(i64) -> T) -> ParseResult<Vec<T>> {
    match value {
        Value::LongArray(longs) => Ok(longs.into_iter().map(convert).collect()),
        Value::List(list) => vec_from_list(list),
        other => Err(kind_mismatch(TypeId::LongArray, other.id())),
    }
}

impl Nbt for bool {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::Byte(i8::from(*self)))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        match value {
            Value::Byte(b) => Ok(b != 0),
            other => Err(kind_mismatch(TypeId::Byte, other.id())),
        }
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Nbt for String {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(kind_mismatch(TypeId::String, other.id())),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Nbt for Arc<str> {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        String::from_value(value).map(Arc::from)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Nbt for Box<str> {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        String::from_value(value).map(String::into_boxed_str)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Nbt> Nbt for Vec<T> {
    fn to_value(&self) -> WriteResult<Value> {
        T::slice_to_value(self)
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        T::vec_from_value(value)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(feature = "smallvec")]
impl<A> Nbt for smallvec::SmallVec<A>
where
    A: smallvec::Array,
    A::Item: Nbt,
{
    fn to_value(&self) -> WriteResult<Value> {
        <A::Item as Nbt>::slice_to_value(self)
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        <A::Item as Nbt>::vec_from_value(value).map(smallvec::SmallVec::from_vec)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Nbt> Nbt for Box<T> {
    fn to_value(&self) -> WriteResult<Value> {
        (**self).to_value()
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        T::from_value(value).map(Box::new)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

impl Nbt for bytes::Bytes {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::ByteArray(self.iter().map(|&b| b as i8).collect()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        match value {
            Value::ByteArray(bytes) => Ok(bytes.into_iter().map(|b| b as u8).collect()),
            other => Err(kind_mismatch(TypeId::ByteArray, other.id())),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

/// Epoch milliseconds, the representation game saves use for timestamps.
#[cfg(feature = "chrono")]
impl Nbt for chrono::DateTime<chrono::Utc> {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::Long(self.timestamp_millis()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        match value {
            Value::Long(millis) => chrono::DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidTimestamp(millis))),
            other => Err(kind_mismatch(TypeId::Long, other.id())),
        }
    }

    fn is_zero(&self) -> bool {
        self.timestamp_millis() == 0
    }
}

impl Nbt for Value {
    fn to_value(&self) -> WriteResult<Value> {
        if let Value::End = self {
            return Err(WriteErrorKind::UnsupportedShape("End").into());
        }
        Ok(self.clone())
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        Ok(value)
    }

    fn is_zero(&self) -> bool {
        matches!(self, Value::End)
    }
}

impl Nbt for Compound {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::Compound(self.clone()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        match value {
            Value::Compound(compound) => Ok(compound),
            other => Err(kind_mismatch(TypeId::Compound, other.id())),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Nbt for List {
    fn to_value(&self) -> WriteResult<Value> {
        Ok(Value::List(self.clone()))
    }

    fn from_value(value: Value) -> ParseResult<Self> {
        match value {
            Value::List(list) => Ok(list),
            other => Err(kind_mismatch(TypeId::List, other.id())),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
