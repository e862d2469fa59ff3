use crate::tag::kind_mismatch;
use crate::{
    Context, List, ParseError, ParseErrorKind, ParseResult, TypeId, Value, WriteErrorKind,
    WriteResult,
};

/// Core trait for native types that map onto an NBT value.
///
/// Records get an implementation from `#[derive(Nbt)]`, which maps each
/// field to an entry of a Compound. Primitive and container types are
/// implemented in this crate.
pub trait Nbt: Sized {
    /// Converts the value into its tag payload.
    fn to_value(&self) -> WriteResult<Value>;

    /// Builds the native value from a tag payload of the matching kind.
    fn from_value(value: Value) -> ParseResult<Self>;

    /// Whether the value is the zero value of its type, for `omitempty`.
    fn is_zero(&self) -> bool {
        false
    }

    /// Converts a sequence of this type. Defaults to a List whose element
    /// type is that of the first element.
    #[doc(hidden)]
    fn slice_to_value(items: &[Self]) -> WriteResult<Value> {
        list_from_slice(items)
    }

    /// Builds a sequence of this type. Defaults to reading a List.
    #[doc(hidden)]
    fn vec_from_value(value: Value) -> ParseResult<Vec<Self>> {
        match value {
            Value::List(list) => vec_from_list(list),
            other => Err(kind_mismatch(TypeId::List, other.id())),
        }
    }
}

pub(crate) fn list_from_slice<T: Nbt>(items: &[T]) -> WriteResult<Value> {
    let elements = items
        .iter()
        .enumerate()
        .map(|(i, item)| item.to_value().map_err(|e| e.with_context(Context::Index(i))))
        .collect::<WriteResult<Vec<Value>>>()?;

    let element_type = elements
        .first()
        .map(Value::id)
        .ok_or(WriteErrorKind::EmptySequenceUnsupported)?;
    Ok(Value::List(List::with_elements(element_type, elements)))
}

pub(crate) fn vec_from_list<T: Nbt>(list: List) -> ParseResult<Vec<T>> {
    list.into_iter()
        .enumerate()
        .map(|(i, element)| T::from_value(element).map_err(|e| e.with_context(Context::Index(i))))
        .collect()
}

/// Adapts a record field to the presence rules of its type: a plain `T` must
/// be present on decode, an `Option<T>` may be absent and is skipped on
/// encode when `None`.
pub trait FieldValue: Sized {
    type T: Nbt;

    fn as_nbt(&self) -> Option<&Self::T>;
    fn is_zero(&self) -> bool;
    fn from_option(v: Option<Self::T>, name: &str) -> ParseResult<Self>;
}

impl<T: Nbt> FieldValue for T {
    type T = T;

    fn as_nbt(&self) -> Option<&Self::T> {
        Some(self)
    }

    fn is_zero(&self) -> bool {
        Nbt::is_zero(self)
    }

    fn from_option(v: Option<Self::T>, name: &str) -> ParseResult<Self> {
        v.ok_or_else(|| ParseError::new(ParseErrorKind::MissingField(name.to_string())))
    }
}

impl<T: Nbt> FieldValue for Option<T> {
    type T = T;

    fn as_nbt(&self) -> Option<&Self::T> {
        self.as_ref()
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn from_option(v: Option<Self::T>, _name: &str) -> ParseResult<Self> {
        Ok(v)
    }
}

/// Value for a `default` field whose entry is absent.
#[doc(hidden)]
pub fn absent_field_default<T: Default>(name: &str) -> T {
    tracing::debug!(field = name, "absent field, using default");
    T::default()
}

#[cfg(test)]
mod tests {
    use super::FieldValue;
    use crate::{ParseError, ParseErrorKind};

    #[test]
    fn test_field_value_trait() {
        let value: u32 = 42;
        assert_eq!(value.as_nbt(), Some(&42));
        let result: u32 = FieldValue::from_option(Some(42), "v").unwrap();
        assert_eq!(result, 42);

        let opt_value: Option<u32> = Some(42);
        assert_eq!(opt_value.as_nbt(), Some(&42));
        let result: Option<u32> = FieldValue::from_option(Some(42), "v").unwrap();
        assert_eq!(result, Some(42));

        let none_value: Option<u32> = None;
        assert_eq!(none_value.as_nbt(), None);
        assert!(FieldValue::is_zero(&none_value));
        let result: Option<u32> = FieldValue::from_option(None, "v").unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_missing_required_field() {
        let result: Result<u32, _> = FieldValue::from_option(None, "count");
        assert_eq!(
            result,
            Err(ParseError::new(ParseErrorKind::MissingField(
                "count".to_string()
            )))
        );
    }

    #[test]
    fn test_absent_field_default() {
        let value: Vec<i32> = super::absent_field_default("items");
        assert!(value.is_empty());
    }
}
