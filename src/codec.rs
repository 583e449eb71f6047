//! Record Codec Module
//!
//! Wraps application payloads into the single-bin record shape and back.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{AdapterError, Result};
use crate::store::{Bins, Record, Value};

/// Name of the bin holding the payload.
pub const VALUE_BIN: &str = "value";

// == Record Codec ==
/// Converts between a payload type and record bins.
pub trait RecordCodec {
    type Payload;

    fn encode(&self, payload: Self::Payload) -> Bins;

    /// Extracts the payload. No record, or a record without bins, is a miss.
    fn decode(&self, record: Option<Record>) -> Result<Option<Self::Payload>>;
}

/// Stores values as-is in the `value` bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl RecordCodec for ValueCodec {
    type Payload = Value;

    fn encode(&self, payload: Value) -> Bins {
        Bins::from([(VALUE_BIN.to_string(), payload)])
    }

    fn decode(&self, record: Option<Record>) -> Result<Option<Value>> {
        let Some(mut record) = record else {
            return Ok(None);
        };
        if record.bins.is_empty() {
            return Ok(None);
        }
        record.bins.remove(VALUE_BIN).map(Some).ok_or_else(|| {
            AdapterError::MalformedRecord(format!("record {} has no '{}' bin", record.key, VALUE_BIN))
        })
    }
}

/// Stores raw bytes base64-encoded in the `value` bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCodec;

impl RecordCodec for SessionCodec {
    type Payload = Vec<u8>;

    fn encode(&self, payload: Vec<u8>) -> Bins {
        ValueCodec.encode(Value::Str(STANDARD.encode(payload)))
    }

    fn decode(&self, record: Option<Record>) -> Result<Option<Vec<u8>>> {
        match ValueCodec.decode(record)? {
            None => Ok(None),
            Some(Value::Str(encoded)) => Ok(Some(STANDARD.decode(encoded)?)),
            Some(other) => Err(AdapterError::MalformedRecord(format!(
                "session payload must be a string, found {:?}",
                other
            ))),
        }
    }
}
