//! Unknown-field storage.
//!
//! A decoded message stores every field its schema did not recognize as the
//! exact tag + value bytes it saw, so re-encoding reproduces them verbatim.

/// Verbatim bytes of fields a generated message's schema does not know
/// about, in the order they were seen on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    bytes: Vec<u8>,
}

impl UnknownFields {
    pub fn new() -> UnknownFields {
        UnknownFields::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Appends the raw `tag, value` wire bytes for one unknown field.
    pub fn push_raw(&mut self, raw: &[u8]) {
        self.bytes.extend_from_slice(raw);
    }

    /// Appends the (already written) unknown fields to `out`, used by
    /// generated `encode` methods after all known fields are written.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let u = UnknownFields::new();
        assert!(u.is_empty());
        assert_eq!(u.as_bytes(), &[][..]);
    }

    #[test]
    fn preserves_append_order() {
        let mut u = UnknownFields::new();
        u.push_raw(&[1, 2]);
        u.push_raw(&[3]);
        assert_eq!(u.as_bytes(), &[1, 2, 3][..]);
        let mut out = Vec::new();
        u.write_to(&mut out);
        assert_eq!(out, vec![1, 2, 3]);
    }
}
