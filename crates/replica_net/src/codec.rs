//! MessagePack codec.
//!
//! Two layers use MessagePack, both positional. The envelope is
//! `[version, {tag: bin}]` with the version first so a peer can check it
//! before trusting anything else. Each component payload inside it is a
//! separate document carried as raw `bin`, so one malformed payload cannot
//! corrupt its neighbours.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{NetError, PayloadError};
use crate::packet::Payload;

/// Encode a packet envelope.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode_envelope<T: Serialize>(envelope: &T) -> Result<Vec<u8>, NetError> {
    Ok(rmp_serde::to_vec(envelope)?)
}

/// Decode a packet envelope.
///
/// # Errors
///
/// Returns [`NetError::Decode`] for bytes that are not a valid envelope.
pub fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, NetError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Encode one component's wire value.
///
/// # Errors
///
/// Returns [`PayloadError::Encode`] if serialisation fails.
pub fn encode_payload<W: Serialize>(wire: &W) -> Result<Payload, PayloadError> {
    Ok(rmp_serde::to_vec(wire)?.into())
}

/// Decode one component's wire value.
///
/// # Errors
///
/// Returns [`PayloadError::Malformed`] if the payload does not have the
/// shape `W` requires.
pub fn decode_payload<W: DeserializeOwned>(payload: &[u8]) -> Result<W, PayloadError> {
    Ok(rmp_serde::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_are_positional() {
        let bytes = encode_payload(&(1.0f32, 2.0f32, 1u8)).unwrap();
        // fixarray of three elements
        assert_eq!(bytes[0], 0x93);
        let back: (f32, f32, u8) = decode_payload(&bytes).unwrap();
        assert_eq!(back, (1.0, 2.0, 1));
    }

    #[test]
    fn test_nil_payload() {
        let bytes = encode_payload(&Option::<Vec<[f32; 2]>>::None).unwrap();
        assert_eq!(bytes, vec![0xc0]);
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let bytes = encode_payload(&"not a pair").unwrap();
        let result: Result<(f32, f32), _> = decode_payload(&bytes);
        assert!(matches!(result, Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn test_invalid_envelope_bytes() {
        let result: Result<(u16, u16), _> = decode_envelope(&[0xFF, 0xFF]);
        assert!(matches!(result, Err(NetError::Decode(_))));
    }
}
