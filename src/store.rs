//! Latest decoded hand records and validated accessors.

use crate::error::{Result, TrackingError};
use crate::types::{Category, CategorySet, Gesture, HandRecord, HandSide, Orientation, Vector3};
use parking_lot::RwLock;
use std::sync::Arc;

/// Both hands from one decoded frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandFrame {
    /// Sequence of the frame these records came from. Zero before the first frame.
    pub sequence: u64,
    pub right: HandRecord,
    pub left: HandRecord,
}

impl HandFrame {
    /// Record for one side.
    pub fn hand(&self, side: HandSide) -> &HandRecord {
        match side {
            HandSide::Right => &self.right,
            HandSide::Left => &self.left,
        }
    }
}

/// Holds the most recent frame.
///
/// The frame is swapped as a whole behind an `Arc`, so a reader never sees
/// one hand from one frame and the other hand (or a field) from another.
pub struct HandDataStore {
    current: RwLock<Arc<HandFrame>>,
}

impl HandDataStore {
    /// Create an empty store at sequence zero.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(HandFrame::default())),
        }
    }

    /// Replace both records with a newer frame.
    ///
    /// Returns false, leaving the store untouched, if `frame` is not newer
    /// than the frame already held.
    pub fn replace(&self, frame: HandFrame) -> bool {
        let mut current = self.current.write();
        if frame.sequence <= current.sequence {
            return false;
        }
        *current = Arc::new(frame);
        true
    }

    /// The current frame.
    pub fn frame(&self) -> Arc<HandFrame> {
        self.current.read().clone()
    }

    /// Copy of one hand's record from the current frame.
    pub fn snapshot(&self, hand: HandSide) -> HandRecord {
        self.frame().hand(hand).clone()
    }

    /// Landmark `key` of `hand`, validated against `subscribed`.
    pub fn landmark(&self, subscribed: CategorySet, hand: HandSide, key: &str) -> Result<Vector3> {
        let frame = self.validated(subscribed, hand, Category::Landmarks)?;
        frame
            .hand(hand)
            .landmark(key)
            .ok_or_else(|| TrackingError::MissingKey(key.to_string()))
    }

    /// Gesture of `hand`, validated against `subscribed`.
    pub fn gesture(&self, subscribed: CategorySet, hand: HandSide) -> Result<Gesture> {
        let frame = self.validated(subscribed, hand, Category::Gesture)?;
        frame.hand(hand).gesture.ok_or(TrackingError::Category {
            category: Category::Gesture,
            hand,
        })
    }

    /// Orientation of `hand`, validated against `subscribed`.
    pub fn orientation(&self, subscribed: CategorySet, hand: HandSide) -> Result<Orientation> {
        let frame = self.validated(subscribed, hand, Category::Orientation)?;
        frame.hand(hand).orientation.ok_or(TrackingError::Category {
            category: Category::Orientation,
            hand,
        })
    }

    /// Current frame, if `category` is subscribed and present for `hand`.
    fn validated(
        &self,
        subscribed: CategorySet,
        hand: HandSide,
        category: Category,
    ) -> Result<Arc<HandFrame>> {
        let frame = self.frame();
        if !(subscribed.contains(category) && frame.hand(hand).has(category)) {
            return Err(TrackingError::Category { category, hand });
        }
        Ok(frame)
    }
}

impl Default for HandDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn frame(sequence: u64, gesture: Gesture) -> HandFrame {
        let mut points = HashMap::new();
        points.insert("0".to_string(), Vector3::new(1.0, 2.0, 3.0));
        HandFrame {
            sequence,
            right: HandRecord {
                landmarks: Some(points),
                gesture: Some(gesture),
                orientation: None,
            },
            left: HandRecord::default(),
        }
    }

    #[test]
    fn test_starts_with_two_empty_records() {
        let store = HandDataStore::new();
        assert!(store.snapshot(HandSide::Right).is_empty());
        assert!(store.snapshot(HandSide::Left).is_empty());
    }

    #[test]
    fn test_accessors_validate_subscription_and_presence() {
        let store = HandDataStore::new();
        let all = CategorySet::all();
        store.replace(frame(1, Gesture::Fist));

        assert_eq!(store.gesture(all, HandSide::Right).unwrap(), Gesture::Fist);
        assert!(matches!(
            store.gesture(Category::Landmarks.into(), HandSide::Right),
            Err(TrackingError::Category { category: Category::Gesture, .. })
        ));
        assert!(matches!(
            store.orientation(all, HandSide::Right),
            Err(TrackingError::Category { .. })
        ));
        assert!(matches!(
            store.gesture(all, HandSide::Left),
            Err(TrackingError::Category { hand: HandSide::Left, .. })
        ));
    }

    #[test]
    fn test_landmark_missing_key() {
        let store = HandDataStore::new();
        store.replace(frame(1, Gesture::Ok));
        let all = CategorySet::all();

        assert_eq!(
            store.landmark(all, HandSide::Right, "0").unwrap(),
            Vector3::new(1.0, 2.0, 3.0)
        );
        assert!(matches!(
            store.landmark(all, HandSide::Right, "20"),
            Err(TrackingError::MissingKey(key)) if key == "20"
        ));
        assert!(matches!(
            store.landmark(all, HandSide::Left, "0"),
            Err(TrackingError::Category { .. })
        ));
    }

    #[test]
    fn test_none_gesture_is_a_value() {
        let store = HandDataStore::new();
        store.replace(frame(1, Gesture::None));
        assert_eq!(
            store.gesture(CategorySet::all(), HandSide::Right).unwrap(),
            Gesture::None
        );
    }

    #[test]
    fn test_stale_frame_discarded() {
        let store = HandDataStore::new();
        assert!(store.replace(frame(2, Gesture::Metal)));
        assert!(!store.replace(frame(1, Gesture::Fist)));
        assert_eq!(
            store.gesture(CategorySet::all(), HandSide::Right).unwrap(),
            Gesture::Metal
        );
    }

    #[test]
    fn test_readers_keep_their_frame_across_replace() {
        let store = HandDataStore::new();
        store.replace(frame(1, Gesture::Fist));
        let held = store.frame();
        store.replace(frame(2, Gesture::Ok));

        assert_eq!(held.right.gesture, Some(Gesture::Fist));
        assert_eq!(store.frame().right.gesture, Some(Gesture::Ok));
    }
}
