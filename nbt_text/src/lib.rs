//! nbt_text renders NBT tag trees as indented, human-readable text.
//!
//! This crate is primarily used as a binary (`nbt2text`) for inspecting save
//! files and captured payloads. The notation follows the stringified NBT
//! used by Minecraft commands: `1b`, `2s`, `3L`, `[I; 1, 2]`, `{key: value}`.

mod format;

pub use crate::format::to_text;

use nbt::{ByteOrder, Decoder, ParseError};

/// Decodes every root tag in `data` and formats each one, separated by
/// newlines.
pub fn nbt2text(data: &[u8], order: ByteOrder) -> Result<String, ParseError> {
    let mut decoder = Decoder::new(data, order);
    let mut texts = Vec::new();
    while let Some(tag) = decoder.next_tag()? {
        texts.push(to_text(&tag));
    }
    Ok(texts.join("\n"))
}
