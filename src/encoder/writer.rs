use super::EncodingError;
use super::number::format_decimal;

/// Append-only JSON text buffer. Callers are responsible for structure;
/// the writer only takes care of separators, escaping and number layout.
#[derive(Debug)]
pub(crate) struct JsonWriter {
    buffer: String,
}

impl JsonWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    pub(crate) fn raw(&mut self, text: &str) -> &mut Self {
        self.buffer.push_str(text);
        self
    }

    pub(crate) fn comma(&mut self) -> &mut Self {
        self.raw(",")
    }

    /// Write `value` as an escaped JSON string literal.
    pub(crate) fn string(&mut self, value: &str) -> Result<&mut Self, EncodingError> {
        let literal = serde_json::to_string(value)?;
        self.buffer.push_str(&literal);
        Ok(self)
    }

    pub(crate) fn key(&mut self, key: &str) -> Result<&mut Self, EncodingError> {
        self.string(key)?;
        Ok(self.raw(":"))
    }

    pub(crate) fn key_string(&mut self, key: &str, value: &str) -> Result<&mut Self, EncodingError> {
        self.key(key)?.string(value)
    }

    pub(crate) fn key_integer(&mut self, key: &str, value: i64) -> Result<&mut Self, EncodingError> {
        self.key(key)?;
        Ok(self.raw(&value.to_string()))
    }

    pub(crate) fn key_unsigned(&mut self, key: &str, value: u64) -> Result<&mut Self, EncodingError> {
        self.key(key)?;
        Ok(self.raw(&value.to_string()))
    }

    /// Two decimal places; non-finite values become `null`.
    pub(crate) fn key_decimal(&mut self, key: &str, value: f64) -> Result<&mut Self, EncodingError> {
        self.key(key)?;
        match format_decimal(value) {
            Some(formatted) => Ok(self.raw(&formatted)),
            None => Ok(self.raw("null")),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.buffer
    }
}
