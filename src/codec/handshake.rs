//! Capability-request handshake.

use crate::error::{Result, TrackingError};
use crate::types::{Category, CategorySet};

/// Marks a message as a handshake so the backend can tell it apart from
/// other traffic on the same socket.
pub const HANDSHAKE_SENTINEL: u8 = b':';

/// Sentinel plus one digit per category.
pub const HANDSHAKE_LEN: usize = 1 + 3;

/// Encode the handshake for a subscription set.
pub fn encode_handshake(categories: CategorySet) -> [u8; HANDSHAKE_LEN] {
    let mut code = [HANDSHAKE_SENTINEL; HANDSHAKE_LEN];
    for (slot, category) in code[1..].iter_mut().zip(Category::ALL) {
        *slot = if categories.contains(*category) { b'1' } else { b'0' };
    }
    code
}

/// Parse a handshake back into the subscription set it requests.
pub fn parse_handshake(bytes: &[u8]) -> Result<CategorySet> {
    if bytes.len() != HANDSHAKE_LEN {
        return Err(TrackingError::Decode(format!(
            "handshake must be {} bytes, got {}",
            HANDSHAKE_LEN,
            bytes.len()
        )));
    }
    if bytes[0] != HANDSHAKE_SENTINEL {
        return Err(TrackingError::Decode("handshake sentinel missing".to_string()));
    }

    let mut categories = CategorySet::empty();
    for (digit, category) in bytes[1..].iter().zip(Category::ALL) {
        match digit {
            b'1' => categories.insert(*category),
            b'0' => {}
            other => {
                return Err(TrackingError::Decode(format!(
                    "invalid handshake flag {:?}",
                    char::from(*other)
                )))
            }
        }
    }
    Ok(categories)
}
