//! Telemetry frame decoding.

use crate::error::{Result, TrackingError};
use crate::types::{HandRecord, HandSide};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// Top-level entries in document order. Repeated keys are kept, where a
/// `serde_json::Map` would silently keep only the last.
struct HandEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for HandEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = HandEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object keyed by hand side")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<HandEntries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(HandEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Decode one telemetry frame into `(right, left)` records.
///
/// A hand missing from the frame yields an empty record, and a hand with no
/// category fields yields a record with every field absent. Structural
/// problems (empty input, non-object root, unknown hand keys, bad values)
/// are errors.
pub fn decode_payload(bytes: &[u8]) -> Result<(HandRecord, HandRecord)> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(TrackingError::Decode("empty payload".to_string()));
    }

    let HandEntries(entries) = serde_json::from_slice(bytes)?;

    let mut right = None;
    let mut left = None;

    for (key, value) in entries {
        let side = HandSide::from_name(&key)
            .ok_or_else(|| TrackingError::Decode(format!("unknown hand side {:?}", key)))?;

        let record = match value {
            Value::Null => HandRecord::default(),
            value @ Value::Object(_) => serde_json::from_value(value)?,
            other => {
                return Err(TrackingError::Decode(format!(
                    "{} hand must be an object, got {}",
                    side,
                    kind(&other)
                )))
            }
        };

        let slot = match side {
            HandSide::Right => &mut right,
            HandSide::Left => &mut left,
        };
        if slot.replace(record).is_some() {
            return Err(TrackingError::Decode(format!("{} hand appears twice", side)));
        }
    }

    if right.is_none() && left.is_none() {
        return Err(TrackingError::Decode("payload describes no hand".to_string()));
    }

    Ok((right.unwrap_or_default(), left.unwrap_or_default()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gesture, Orientation, Vector3, LANDMARK_COUNT};
    use proptest::prelude::*;
    use serde_json::json;

    fn landmarks(offset: f32) -> Value {
        let points: serde_json::Map<String, Value> = (0..LANDMARK_COUNT)
            .map(|i| {
                let v = i as f32 + offset;
                (i.to_string(), json!({"x": v, "y": v * 0.5, "z": -v}))
            })
            .collect();
        Value::Object(points)
    }

    #[test]
    fn test_both_hands_full_landmarks() {
        let payload = json!({
            "Right": {"Landmarks": landmarks(0.0), "Gesture": "ThumbsUp", "Orientation": "Up"},
            "Left": {"Landmarks": landmarks(100.0), "Gesture": 0, "Orientation": "left"},
        });
        let (right, left) = decode_payload(payload.to_string().as_bytes()).unwrap();

        let right_points = right.landmarks.as_ref().unwrap();
        let left_points = left.landmarks.as_ref().unwrap();
        assert_eq!(right_points.len(), LANDMARK_COUNT);
        assert_eq!(left_points.len(), LANDMARK_COUNT);
        for i in 0..LANDMARK_COUNT {
            assert!(right_points.contains_key(&i.to_string()));
        }
        assert_eq!(right.landmark("2"), Some(Vector3::new(2.0, 1.0, -2.0)));
        assert_eq!(left.landmark("0"), Some(Vector3::new(100.0, 50.0, -100.0)));

        assert_eq!(right.gesture, Some(Gesture::ThumbsUp));
        assert_eq!(right.orientation, Some(Orientation::Up));
        assert_eq!(left.gesture, Some(Gesture::None));
        assert_eq!(left.orientation, Some(Orientation::Left));
    }

    #[test]
    fn test_single_hand_leaves_other_empty() {
        let payload = json!({"Left": {"Gesture": "Metal"}});
        let (right, left) = decode_payload(payload.to_string().as_bytes()).unwrap();
        assert!(right.is_empty());
        assert_eq!(left.gesture, Some(Gesture::Metal));
        assert!(left.landmarks.is_none());
    }

    #[test]
    fn test_hand_without_category_fields() {
        let payload = br#"{"Right": {"Landmarks": null}, "Left": {}}"#;
        let (right, left) = decode_payload(payload).unwrap();
        assert!(right.is_empty());
        assert!(left.is_empty());
    }

    #[test]
    fn test_malformed_payloads() {
        let cases: &[&[u8]] = &[
            b"",
            b"   ",
            b"not json",
            b"[1, 2, 3]",
            b"{}",
            br#"{"Middle": {}}"#,
            br#"{"Right": 5}"#,
            br#"{"Right": {}, "right": {}}"#,
            br#"{"Right": {"Gesture": "Fist"}, "Right": {"Gesture": "Ok"}}"#,
            br#"{"Left": null, "Left": null}"#,
            br#"{"Right": {"Landmarks": {"0": {"x": 1.0}}}}"#,
            br#"{"Right": {"Gesture": "Wave"}}"#,
            br#"{"Right": {"Orientation": 17}}"#,
        ];
        for case in cases {
            let result = decode_payload(case);
            assert!(
                matches!(result, Err(TrackingError::Decode(_))),
                "expected decode error for {:?}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_unknown_record_fields_ignored() {
        let payload = br#"{"right": {"gesture": "ok", "confidence": 0.9}}"#;
        let (right, _) = decode_payload(payload).unwrap();
        assert_eq!(right.gesture, Some(Gesture::Ok));
    }

    proptest! {
        #[test]
        fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode_payload(&bytes);
        }

        #[test]
        fn prop_landmark_coordinates_survive(x in -10.0f32..10.0, y in -10.0f32..10.0, z in -10.0f32..10.0) {
            let payload = json!({"Right": {"Landmarks": {"8": {"x": x, "y": y, "z": z}}}});
            let (right, left) = decode_payload(payload.to_string().as_bytes()).unwrap();
            prop_assert_eq!(right.landmark("8"), Some(Vector3::new(x, y, z)));
            prop_assert!(left.is_empty());
        }
    }
}
