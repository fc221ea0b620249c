//! Record - Opaque unit of telemetry data
//!
//! The pipeline treats records as schema-agnostic pass-through values.
//! The payload uses `bytes::Bytes` so cloning a record is O(1) and
//! multi-sink fan-out never copies payload data.

use bytes::Bytes;

/// An opaque unit of telemetry data flowing through the pipeline
///
/// The core never inspects the payload. Processors may decode it, but the
/// worker loop, buffer, and fan-out only move it around.
#[derive(Debug, Clone)]
pub struct Record {
    /// Raw payload - zero-copy via Bytes
    payload: Bytes,
}

impl Record {
    /// Create a record from any payload source
    #[inline]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Get the raw payload
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl From<Bytes> for Record {
    fn from(payload: Bytes) -> Self {
        Self { payload }
    }
}

impl From<Vec<u8>> for Record {
    fn from(payload: Vec<u8>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl From<&'static str> for Record {
    fn from(payload: &'static str) -> Self {
        Self {
            payload: Bytes::from_static(payload.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_vec() {
        let record = Record::new(vec![1u8, 2, 3]);
        assert_eq!(record.len(), 3);
        assert!(!record.is_empty());
        assert_eq!(record.payload().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn test_record_from_static_str() {
        let record = Record::from("hello");
        assert_eq!(record.payload().as_ref(), b"hello");
    }

    #[test]
    fn test_empty_record() {
        let record = Record::new(Vec::new());
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
    }

    #[test]
    fn test_clone_shares_payload() {
        let record = Record::new(vec![0u8; 64]);
        let clone = record.clone();
        // Bytes clones share the same backing buffer
        assert_eq!(record.payload().as_ptr(), clone.payload().as_ptr());
    }
}
