use indexmap::IndexMap;

use crate::{ParseError, ParseErrorKind, ParseResult, TypeId};

/// The payload of a tag: one variant per wire type code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    /// Returns the wire type code of this value.
    pub fn id(&self) -> TypeId {
        match self {
            Value::End => TypeId::End,
            Value::Byte(_) => TypeId::Byte,
            Value::Short(_) => TypeId::Short,
            Value::Int(_) => TypeId::Int,
            Value::Long(_) => TypeId::Long,
            Value::Float(_) => TypeId::Float,
            Value::Double(_) => TypeId::Double,
            Value::ByteArray(_) => TypeId::ByteArray,
            Value::String(_) => TypeId::String,
            Value::List(_) => TypeId::List,
            Value::Compound(_) => TypeId::Compound,
            Value::IntArray(_) => TypeId::IntArray,
            Value::LongArray(_) => TypeId::LongArray,
        }
    }

    /// Returns the string payload of a String value.
    pub fn as_str(&self) -> ParseResult<&str> {
        match self {
            Value::String(s) => Ok(s.as_str()),
            other => Err(kind_mismatch(TypeId::String, other.id())),
        }
    }

    /// Returns the string payload of a String value for modification.
    pub fn as_string_mut(&mut self) -> ParseResult<&mut String> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(kind_mismatch(TypeId::String, other.id())),
        }
    }
}

pub(crate) fn kind_mismatch(expected: TypeId, actual: TypeId) -> ParseError {
    ParseError::new(ParseErrorKind::KindMismatch { expected, actual })
}

macro_rules! scalar_accessors {
    ($($variant:ident: $ty:ty => $get:ident, $get_mut:ident;)*) => {
        impl Value {
            $(
                #[doc = concat!("Returns the payload of a ", stringify!($variant), " value.")]
                pub fn $get(&self) -> ParseResult<$ty> {
                    match self {
                        Value::$variant(v) => Ok(*v),
                        other => Err(kind_mismatch(TypeId::$variant, other.id())),
                    }
                }

                pub fn $get_mut(&mut self) -> ParseResult<&mut $ty> {
                    match self {
                        Value::$variant(v) => Ok(v),
                        other => Err(kind_mismatch(TypeId::$variant, other.id())),
                    }
                }
            )*
        }

        impl Tag {
            $(
                pub fn $get(&self) -> ParseResult<$ty> {
                    self.value.$get()
                }

                pub fn $get_mut(&mut self) -> ParseResult<&mut $ty> {
                    self.value.$get_mut()
                }
            )*
        }
    };
}

macro_rules! container_accessors {
    ($($variant:ident: $ty:ty, $slice:ty => $get:ident, $get_mut:ident;)*) => {
        impl Value {
            $(
                #[doc = concat!("Returns the payload of a ", stringify!($variant), " value.")]
                pub fn $get(&self) -> ParseResult<&$slice> {
                    match self {
                        Value::$variant(v) => {
                            let v: &$slice = v;
                            Ok(v)
                        }
                        other => Err(kind_mismatch(TypeId::$variant, other.id())),
                    }
                }

                pub fn $get_mut(&mut self) -> ParseResult<&mut $ty> {
                    match self {
                        Value::$variant(v) => Ok(v),
                        other => Err(kind_mismatch(TypeId::$variant, other.id())),
                    }
                }
            )*
        }

        impl Tag {
            $(
                pub fn $get(&self) -> ParseResult<&$slice> {
                    self.value.$get()
                }

                pub fn $get_mut(&mut self) -> ParseResult<&mut $ty> {
                    self.value.$get_mut()
                }
            )*
        }
    };
}

scalar_accessors! {
    Byte: i8 => as_byte, as_byte_mut;
    Short: i16 => as_short, as_short_mut;
    Int: i32 => as_int, as_int_mut;
    Long: i64 => as_long, as_long_mut;
    Float: f32 => as_float, as_float_mut;
    Double: f64 => as_double, as_double_mut;
}

container_accessors! {
    ByteArray: Vec<i8>, [i8] => as_byte_array, as_byte_array_mut;
    IntArray: Vec<i32>, [i32] => as_int_array, as_int_array_mut;
    LongArray: Vec<i64>, [i64] => as_long_array, as_long_array_mut;
    List: List, List => as_list, as_list_mut;
    Compound: Compound, Compound => as_compound, as_compound_mut;
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<i8> => ByteArray,
    String => String,
    List => List,
    Compound => Compound,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A named node of the tree.
///
/// The kind of a tag is fixed when it is constructed: the payload can be
/// modified through the kind-checked accessors but never swapped for a
/// payload of another kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    name: String,
    value: Value,
}

impl Tag {
    /// Creates a tag from a name and a payload.
    ///
    /// ```
    /// use nbt::{Tag, TypeId};
    ///
    /// let tag = Tag::new("x", -1i8);
    /// assert_eq!(tag.id(), TypeId::Byte);
    /// assert_eq!(tag.name(), "x");
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The End sentinel as a standalone tag.
    pub fn end() -> Self {
        Self::new("", Value::End)
    }

    pub fn id(&self) -> TypeId {
        self.value.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn into_parts(self) -> (String, Value) {
        (self.name, self.value)
    }

    pub fn as_str(&self) -> ParseResult<&str> {
        self.value.as_str()
    }

    pub fn as_string_mut(&mut self) -> ParseResult<&mut String> {
        self.value.as_string_mut()
    }
}

/// An ordered sequence of unnamed values sharing one declared kind.
///
/// Elements are not checked against the declared kind on insertion; the
/// encoder rejects a list whose elements disagree with it.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    element_type: TypeId,
    elements: Vec<Value>,
}

impl List {
    /// Creates an empty list declaring the given element kind.
    pub fn new(element_type: TypeId) -> Self {
        Self {
            element_type,
            elements: Vec::new(),
        }
    }

    pub fn with_elements(element_type: TypeId, elements: Vec<Value>) -> Self {
        Self {
            element_type,
            elements,
        }
    }

    pub fn element_type(&self) -> TypeId {
        self.element_type
    }

    pub fn set_element_type(&mut self, element_type: TypeId) {
        self.element_type = element_type;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.elements.get_mut(index)
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.elements.push(value.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.elements.iter_mut()
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.elements.reserve(additional);
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new(TypeId::End)
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// A mapping from names to values with unique keys.
///
/// Iteration and encoding follow insertion order. Equality ignores order:
/// two compounds are equal when they hold the same keys with equal values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    entries: IndexMap<String, Value>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.get_mut(name)
    }

    /// Inserts a named tag under its own name, returning the payload it
    /// replaced. A replaced entry keeps its position.
    pub fn put(&mut self, tag: Tag) -> Option<Value> {
        let (name, value) = tag.into_parts();
        self.entries.insert(name, value)
    }

    /// Inserts a payload under `name`, returning the payload it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Removes an entry, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    /// Removes an entry in constant time; the last entry takes its place.
    #[doc(hidden)]
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.entries.swap_remove(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<Tag> for Compound {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut compound = Compound::new();
        for tag in iter {
            compound.put(tag);
        }
        compound
    }
}

impl IntoIterator for Compound {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
