//! EXIF orientation states and the rotation each one calls for.
//!
//! Degrees are counter-clockwise. Only the three pure rotations are
//! corrected; mirrored states and anything unrecognized pass through.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight EXIF orientation states, named by where the 0th row and 0th
/// column of the stored image sit on the visual image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// 1: stored upright
    TopLeft,
    /// 2: mirrored horizontally
    TopRight,
    /// 3: rotated 180°
    BottomRight,
    /// 4: mirrored vertically
    BottomLeft,
    /// 5: mirrored horizontally, rotated 270° clockwise
    LeftTop,
    /// 6: top of the image is at the physical right
    RightTop,
    /// 7: mirrored horizontally, rotated 90° clockwise
    RightBottom,
    /// 8: top of the image is at the physical left, reading bottom-up
    LeftBottom,
}

impl Orientation {
    /// Every orientation state, in tag-value order.
    pub const ALL: [Orientation; 8] = [
        Orientation::TopLeft,
        Orientation::TopRight,
        Orientation::BottomRight,
        Orientation::BottomLeft,
        Orientation::LeftTop,
        Orientation::RightTop,
        Orientation::RightBottom,
        Orientation::LeftBottom,
    ];

    /// Parse a raw EXIF tag value. Values outside 1..=8 are not orientations.
    pub fn from_tag(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::TopLeft),
            2 => Some(Self::TopRight),
            3 => Some(Self::BottomRight),
            4 => Some(Self::BottomLeft),
            5 => Some(Self::LeftTop),
            6 => Some(Self::RightTop),
            7 => Some(Self::RightBottom),
            8 => Some(Self::LeftBottom),
            _ => None,
        }
    }

    /// The raw EXIF tag value.
    pub fn tag(self) -> u32 {
        match self {
            Self::TopLeft => 1,
            Self::TopRight => 2,
            Self::BottomRight => 3,
            Self::BottomLeft => 4,
            Self::LeftTop => 5,
            Self::RightTop => 6,
            Self::RightBottom => 7,
            Self::LeftBottom => 8,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::LeftTop => "left-top",
            Self::RightTop => "right-top",
            Self::RightBottom => "right-bottom",
            Self::LeftBottom => "left-bottom",
        };
        write!(f, "{name} ({})", self.tag())
    }
}

/// A counter-clockwise rotation that expands the canvas instead of cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Ccw90,
    Ccw180,
    Ccw270,
}

impl Rotation {
    /// Decide the rotation for an orientation tag.
    ///
    /// Absent tags and every state outside the fixed table resolve to no
    /// rotation; that is a normal outcome, not an error.
    pub fn resolve(orientation: Option<Orientation>) -> Self {
        match orientation {
            Some(Orientation::LeftBottom) => Self::Ccw90,
            Some(Orientation::BottomRight) => Self::Ccw180,
            Some(Orientation::RightTop) => Self::Ccw270,
            _ => Self::None,
        }
    }

    /// Rotation in counter-clockwise degrees: 0, 90, 180 or 270.
    pub fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Ccw90 => 90,
            Self::Ccw180 => 180,
            Self::Ccw270 => 270,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Self::None
    }

    /// Apply the rotation. `image` turns clockwise, so the counter-clockwise
    /// quarter turns map onto its opposite quarter turns.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::None => image,
            Self::Ccw90 => image.rotate270(),
            Self::Ccw180 => image.rotate180(),
            Self::Ccw270 => image.rotate90(),
        }
    }
}

impl Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.degrees())
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u16::deserialize(deserializer)? {
            0 => Ok(Self::None),
            90 => Ok(Self::Ccw90),
            180 => Ok(Self::Ccw180),
            270 => Ok(Self::Ccw270),
            other => Err(serde::de::Error::custom(format!(
                "rotation must be 0, 90, 180 or 270, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn test_resolve_full_table() {
        let expected = [
            (Orientation::TopLeft, 0),
            (Orientation::TopRight, 0),
            (Orientation::BottomRight, 180),
            (Orientation::BottomLeft, 0),
            (Orientation::LeftTop, 0),
            (Orientation::RightTop, 270),
            (Orientation::RightBottom, 0),
            (Orientation::LeftBottom, 90),
        ];
        for (orientation, degrees) in expected {
            assert_eq!(
                Rotation::resolve(Some(orientation)).degrees(),
                degrees,
                "{orientation}"
            );
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for orientation in Orientation::ALL {
            let first = Rotation::resolve(Some(orientation));
            let second = Rotation::resolve(Some(orientation));
            assert_eq!(first, second);
            assert!([0, 90, 180, 270].contains(&first.degrees()));
        }
    }

    #[test]
    fn test_absent_and_unknown_tags_do_not_rotate() {
        assert_eq!(Rotation::resolve(None), Rotation::None);
        assert_eq!(Orientation::from_tag(0), None);
        assert_eq!(Orientation::from_tag(9), None);
        assert_eq!(Rotation::resolve(Orientation::from_tag(42)), Rotation::None);
    }

    #[test]
    fn test_tag_values_match_exif() {
        for (i, orientation) in Orientation::ALL.iter().enumerate() {
            let value = i as u32 + 1;
            assert_eq!(orientation.tag(), value);
            assert_eq!(Orientation::from_tag(value), Some(*orientation));
        }
    }

    #[test]
    fn test_quarter_turns_expand_canvas() {
        let img = DynamicImage::new_rgb8(40, 10);
        assert_eq!(Rotation::Ccw90.apply(img.clone()).dimensions(), (10, 40));
        assert_eq!(Rotation::Ccw270.apply(img.clone()).dimensions(), (10, 40));
        assert_eq!(Rotation::Ccw180.apply(img.clone()).dimensions(), (40, 10));
        assert_eq!(Rotation::None.apply(img).dimensions(), (40, 10));
    }

    #[test]
    fn test_ccw90_moves_top_right_pixel_to_top_left() {
        // Mark the top-right corner; a counter-clockwise quarter turn brings it
        // to the top-left.
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 0, Rgb([255, 0, 0]));
        let rotated = Rotation::Ccw90.apply(DynamicImage::ImageRgb8(img)).to_rgb8();
        assert_eq!(rotated.dimensions(), (2, 3));
        assert_eq!(rotated.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_rotation_serializes_as_degrees() {
        assert_eq!(serde_json::to_string(&Rotation::Ccw270).unwrap(), "270");
        let parsed: Rotation = serde_json::from_str("90").unwrap();
        assert_eq!(parsed, Rotation::Ccw90);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }
}
