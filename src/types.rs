//! Core types for hand-tracking telemetry.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Number of landmark points the backend reports per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Identifier as it appears on the wire: either the variant name or its ordinal.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireIdent {
    Ordinal(u64),
    Name(String),
}

/// Declares a fixed enumeration that serializes by name and deserializes
/// from a case-insensitive name or an ordinal.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in wire ordinal order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }

            /// Case-insensitive lookup by variant name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(name))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                match WireIdent::deserialize(deserializer)? {
                    WireIdent::Ordinal(i) => usize::try_from(i)
                        .ok()
                        .and_then(|i| Self::ALL.get(i).copied())
                        .ok_or_else(|| {
                            de::Error::custom(format!("unknown {} ordinal {}", stringify!($name), i))
                        }),
                    WireIdent::Name(name) => Self::from_name(&name).ok_or_else(|| {
                        de::Error::custom(format!("unknown {} {:?}", stringify!($name), name))
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Which hand a record describes.
    pub enum HandSide {
        Right,
        Left,
    }
}

wire_enum! {
    /// A class of telemetry a session can opt into.
    ///
    /// Declaration order is the canonical handshake order.
    pub enum Category {
        Landmarks,
        Orientation,
        Gesture,
    }
}

wire_enum! {
    /// Gesture recognized by the backend. `None` means nothing was recognized.
    pub enum Gesture {
        None,
        MiddleFinger,
        ThumbsUp,
        Fist,
        OpenPalm,
        Ok,
        Metal,
        WebShooter,
        Number1,
        Number2,
        Number3,
    }
}

wire_enum! {
    /// Direction the palm is facing.
    pub enum Orientation {
        None,
        Up,
        Down,
        Left,
        Right,
    }
}

impl Category {
    fn bit(self) -> u8 {
        match self {
            Category::Landmarks => 0b001,
            Category::Orientation => 0b010,
            Category::Gesture => 0b100,
        }
    }
}

/// A set of subscribed categories.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategorySet(u8);

impl CategorySet {
    /// The empty set.
    pub const fn empty() -> Self {
        CategorySet(0)
    }

    /// Every category.
    pub fn all() -> Self {
        Category::ALL.iter().copied().collect()
    }

    /// Add one category.
    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    /// Members of either set.
    pub fn union(self, other: CategorySet) -> Self {
        CategorySet(self.0 | other.0)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.iter().copied().filter(move |c| self.contains(*c))
    }
}

impl From<Category> for CategorySet {
    fn from(category: Category) -> Self {
        CategorySet(category.bit())
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = CategorySet::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Debug for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A point in 3-D space.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Decoded state for one hand in one frame.
///
/// An absent field means the category was not sent this frame; that is
/// distinct from a present `Gesture::None` or `Orientation::None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    #[serde(rename = "Landmarks", alias = "landmarks", default)]
    pub landmarks: Option<HashMap<String, Vector3>>,

    #[serde(rename = "Gesture", alias = "gesture", default)]
    pub gesture: Option<Gesture>,

    #[serde(rename = "Orientation", alias = "orientation", default)]
    pub orientation: Option<Orientation>,
}

impl HandRecord {
    /// Whether this record holds a value for `category`.
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Landmarks => self.landmarks.is_some(),
            Category::Orientation => self.orientation.is_some(),
            Category::Gesture => self.gesture.is_some(),
        }
    }

    /// Whether any category in `categories` has a value.
    pub fn has_any(&self, categories: CategorySet) -> bool {
        categories.iter().any(|c| self.has(c))
    }

    /// Whether no category has a value.
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_none() && self.gesture.is_none() && self.orientation.is_none()
    }

    /// Point for landmark `key`, if landmarks are present and hold it.
    pub fn landmark(&self, key: &str) -> Option<Vector3> {
        self.landmarks.as_ref().and_then(|points| points.get(key).copied())
    }
}
