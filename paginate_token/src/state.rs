//! Pagination state and its length-prefixed wire form.

use crate::errors::TokenError;

/// Wire format version written ahead of the payload
const STATE_VERSION: u16 = 1;

/// Upper bound on any single length-prefixed field
const MAX_FIELD_LEN: usize = 2 * 1024;

/// Upper bound on the number of serialized conditions
const MAX_CONDITIONS: usize = 64;

/// Everything needed to reconstruct one page of one filtered query.
///
/// Conditions are carried as normalized single-condition strings
/// (`"status = 'active'"`), in the order the caller supplied them. The
/// serialization is order-preserving and deterministic: the same state
/// always produces the same plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub table: String,
    pub page_size: u64,
    pub conditions: Vec<String>,
}

impl PageState {
    pub fn new(table: impl Into<String>, page_size: u64, conditions: Vec<String>) -> Self {
        Self {
            table: table.into(),
            page_size,
            conditions,
        }
    }

    /// Serialize to the length-prefixed wire form.
    ///
    /// Layout: u16-LE version, then `table` and the decimal `page_size` as
    /// u32-LE length + bytes, then a u32-LE condition count followed by each
    /// condition as u32-LE length + bytes. Length prefixes mean no delimiter
    /// can collide with condition content.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32);
        buf.extend_from_slice(&STATE_VERSION.to_le_bytes());
        write_field(&mut buf, self.table.as_bytes());
        write_field(&mut buf, self.page_size.to_string().as_bytes());
        buf.extend_from_slice(&(self.conditions.len() as u32).to_le_bytes());
        for condition in &self.conditions {
            write_field(&mut buf, condition.as_bytes());
        }
        buf
    }

    /// Parse the wire form back into a state.
    ///
    /// Rejects unknown versions, truncated payloads, oversized fields, and
    /// trailing garbage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        let mut reader = Reader::new(bytes);

        let version = reader.read_u16()?;
        if version != STATE_VERSION {
            return Err(TokenError::Payload(format!(
                "unsupported state version {}",
                version
            )));
        }

        let table = reader.read_string()?;
        if table.is_empty() {
            return Err(TokenError::Payload("empty table name".to_string()));
        }

        let page_size: u64 = reader
            .read_string()?
            .parse()
            .map_err(|_| TokenError::Payload("page size is not a number".to_string()))?;
        if page_size == 0 {
            return Err(TokenError::Payload("page size must be positive".to_string()));
        }

        let count = reader.read_u32()? as usize;
        if count > MAX_CONDITIONS {
            return Err(TokenError::Payload(format!(
                "too many conditions ({})",
                count
            )));
        }

        let mut conditions = Vec::with_capacity(count);
        for _ in 0..count {
            conditions.push(reader.read_string()?);
        }

        reader.expect_end()?;

        Ok(Self {
            table,
            page_size,
            conditions,
        })
    }
}

fn write_field(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TokenError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| TokenError::Payload("truncated payload".to_string()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, TokenError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, TokenError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_string(&mut self) -> Result<String, TokenError> {
        let len = self.read_u32()? as usize;
        if len > MAX_FIELD_LEN {
            return Err(TokenError::Payload(format!("field too long ({} bytes)", len)));
        }
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| TokenError::Payload("field is not valid UTF-8".to_string()))
    }

    fn expect_end(&self) -> Result<(), TokenError> {
        if self.pos != self.bytes.len() {
            return Err(TokenError::Payload("trailing bytes after payload".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_plain() {
        let state = PageState::new("usuarios", 10, vec![]);
        let decoded = PageState::from_bytes(&state.to_bytes()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_round_trip_with_conditions() {
        let state = PageState::new(
            "public.usuarios",
            25,
            vec![
                "age > 18".to_string(),
                "status = 'active'".to_string(),
            ],
        );
        let decoded = PageState::from_bytes(&state.to_bytes()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_delimiter_sequences_round_trip() {
        // The legacy text format broke on `,,` and `::` inside a condition;
        // length prefixes must carry them through untouched.
        let state = PageState::new(
            "t",
            5,
            vec!["note = 'a,,b::c'".to_string()],
        );
        let decoded = PageState::from_bytes(&state.to_bytes()).unwrap();
        assert_eq!(decoded.conditions[0], "note = 'a,,b::c'");
    }

    #[test]
    fn test_deterministic_serialization() {
        let state = PageState::new("t", 10, vec!["a = 1".to_string()]);
        assert_eq!(state.to_bytes(), state.to_bytes());
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let state = PageState::new("usuarios", 10, vec!["a = 1".to_string()]);
        let mut bytes = state.to_bytes();
        bytes.truncate(bytes.len() - 3);
        assert!(PageState::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let state = PageState::new("usuarios", 10, vec![]);
        let mut bytes = state.to_bytes();
        bytes.push(0);
        assert!(PageState::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let state = PageState::new("usuarios", 10, vec![]);
        let mut bytes = state.to_bytes();
        bytes[0] = 9;
        assert!(PageState::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(b't');
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(b'0');
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert!(PageState::from_bytes(&buf).is_err());
    }
}
