//! NBT (Named Binary Tag) is the binary tree format Minecraft uses for save
//! files, chunk data and network payloads.
//!
//! This crate decodes and encodes NBT streams in either byte order, models a
//! decoded tree as [`Tag`] and [`Value`], and maps native types onto tags
//! through the [`Nbt`] trait and its derive macro.
//!
//! # Examples
//!
//! ```
//! use nbt::{ByteOrder, Nbt, from_slice, to_vec};
//!
//! #[derive(Nbt, Debug, PartialEq)]
//! struct Player {
//!     #[nbt("Name")]
//!     name: String,
//!     #[nbt("Health,omitempty")]
//!     health: f32,
//!     inventory: Vec<i32>,
//! }
//!
//! let player = Player {
//!     name: "Steve".to_string(),
//!     health: 20.0,
//!     inventory: vec![1, 2, 3],
//! };
//! let bytes = to_vec(&player, ByteOrder::BigEndian).unwrap();
//! let decoded: Player = from_slice(&bytes, ByteOrder::BigEndian).unwrap();
//! assert_eq!(decoded, player);
//! ```
//!
//! Trees can also be built and inspected directly:
//!
//! ```
//! use nbt::{ByteOrder, Compound, Tag, read_tag, write_tag};
//!
//! let mut root = Compound::new();
//! root.insert("x", -1i8);
//! let tag = Tag::new("", root);
//!
//! let mut bytes = Vec::new();
//! write_tag(&mut bytes, ByteOrder::LittleEndian, &tag).unwrap();
//! let decoded = read_tag(bytes.as_slice(), ByteOrder::LittleEndian).unwrap();
//! assert_eq!(decoded.query("x").unwrap().as_byte(), Ok(-1));
//! ```

mod error;
mod parse;
mod query;
mod stream;
mod tag;
mod traits;
mod types;
mod write;

pub use crate::error::{
    Context, ParseError, ParseErrorKind, ParseResult, WriteError, WriteErrorKind, WriteResult,
};
pub use crate::parse::{DEFAULT_MAX_DEPTH, Decoder, from_bytes, from_slice, read_tag, unmarshal};
pub use crate::stream::ByteOrder;
pub use crate::tag::{Compound, List, Tag, Value};
pub use crate::traits::Nbt;
pub use crate::types::TypeId;
pub use crate::write::{Encoder, marshal, to_bytes, to_vec, write_tag};

#[doc(hidden)]
pub use crate::traits::{FieldValue, absent_field_default};

/// Derives [`Nbt`] for a struct with named fields, mapping it to a Compound.
///
/// Each field is stored under its own name unless a directive says
/// otherwise. Directives are given either as a comma-separated string or as
/// individual options:
///
/// - `#[nbt("-")]` or `#[nbt(skip)]` leaves the field out in both directions
///   and fills it with `Default::default()` when reading.
/// - `#[nbt("Key")]` or `#[nbt(rename = "Key")]` stores the field under `Key`.
/// - `#[nbt("Key,omitempty")]` or `#[nbt(omitempty)]` leaves the field out
///   when writing if it holds its zero value. Reading does not know the key
///   was left out, so a required field needs `default` as well to read back.
///   Floats count as zero only when every bit is clear, so `-0.0` is kept.
/// - `#[nbt(default)]` fills the field with `Default::default()` when its
///   entry is absent instead of failing with `MissingField`.
///
/// `Option<T>` fields are written only when `Some` and read as `None` when
/// absent.
///
/// # Example
///
/// ```
/// use nbt::Nbt;
///
/// #[derive(Nbt)]
/// struct Item {
///     #[nbt("id")]
///     kind: String,
///     #[nbt(rename = "Count", omitempty)]
///     count: u8,
///     #[nbt(skip)]
///     cached: Option<u64>,
/// }
/// ```
pub use nbt_derive::Nbt;
