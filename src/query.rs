use crate::{ParseError, ParseErrorKind, ParseResult, Tag, Value};

impl Value {
    /// Looks up a nested value by a dot-separated path of Compound keys.
    ///
    /// An empty path returns the value itself.
    ///
    /// ```
    /// use nbt::{Compound, Value};
    ///
    /// let mut pos = Compound::new();
    /// pos.insert("x", 12i32);
    /// let mut root = Compound::new();
    /// root.insert("pos", pos);
    ///
    /// let root = Value::from(root);
    /// assert_eq!(root.query("pos.x").unwrap(), &Value::Int(12));
    /// assert!(root.query("pos.y").is_err());
    /// ```
    pub fn query(&self, path: &str) -> ParseResult<&Value> {
        if path.is_empty() {
            return Ok(self);
        }

        let mut current = self;
        let mut end = 0;
        for (i, segment) in path.split('.').enumerate() {
            let Value::Compound(compound) = current else {
                let parent = if i == 0 { "root" } else { &path[..end] };
                return Err(ParseError::new(ParseErrorKind::QueryNotCompound {
                    path: parent.to_string(),
                }));
            };
            end = if i == 0 { segment.len() } else { end + 1 + segment.len() };
            current = compound.get(segment).ok_or_else(|| {
                ParseError::new(ParseErrorKind::QueryNotFound {
                    path: path[..end].to_string(),
                })
            })?;
        }
        Ok(current)
    }
}

impl Tag {
    /// Looks up a nested value below this tag. See [`Value::query`].
    pub fn query(&self, path: &str) -> ParseResult<&Value> {
        self.value().query(path)
    }
}
