//! Wire codec for the hand-tracking protocol.
//!
//! Two message shapes cross the wire:
//! - The client's one-time handshake: a sentinel byte followed by one
//!   `'0'`/`'1'` digit per category in canonical order.
//! - The backend's recurring telemetry frame: a JSON object keyed by hand
//!   side, each value an optional landmark map, gesture and orientation.
//!
//! # Example
//!
//! ```ignore
//! let request = encode_handshake([Category::Landmarks, Category::Gesture].into_iter().collect());
//! assert_eq!(&request, b":101");
//!
//! let (right, left) = decode_payload(br#"{"Right": {"Gesture": "Fist"}}"#)?;
//! assert_eq!(right.gesture, Some(Gesture::Fist));
//! assert!(left.is_empty());
//! ```

mod handshake;
mod payload;

pub use handshake::{encode_handshake, parse_handshake, HANDSHAKE_LEN, HANDSHAKE_SENTINEL};
pub use payload::decode_payload;
