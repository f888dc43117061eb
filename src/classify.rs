//! Face-shape classification from landmark geometry.
//!
//! Five distances are measured between fixed landmarks, then an ordered list
//! of threshold rules picks the shape. Rule order matters: the first rule
//! that matches wins, even when a later one would also match.

use serde::Serialize;

use crate::error::Result;
use crate::landmarks::{
    CHEEKBONE_LEFT, CHEEKBONE_RIGHT, CHIN, CHIN_BOTTOM, FOREHEAD_CENTER, FOREHEAD_TOP, JAW_LEFT,
    JAW_RIGHT, NOSE_BRIDGE,
};
use crate::types::Landmarks;

/// Tolerance for the Square rule, as a fraction of face length.
const SQUARE_TOLERANCE: f64 = 0.1;

/// Coarse face-shape category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FaceShape {
    Oval,
    Rectangle,
    Triangle,
    Heart,
    Round,
    Square,
    Unknown,
}

impl FaceShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaceShape::Oval => "Oval",
            FaceShape::Rectangle => "Rectangle",
            FaceShape::Triangle => "Triangle",
            FaceShape::Heart => "Heart",
            FaceShape::Round => "Round",
            FaceShape::Square => "Square",
            FaceShape::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FaceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five distances the classifier works from, in normalized units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FaceMeasurements {
    /// Right to left jaw extreme (points 0-16)
    pub jaw_width: f64,

    /// Right to left cheekbone (points 2-14)
    pub cheekbone_width: f64,

    /// Chin tip to nose bridge (points 8-27)
    pub face_length: f64,

    /// Forehead top to forehead center (points 10-151)
    pub forehead_width: f64,

    /// Chin bottom to chin tip (points 152-8)
    pub jaw_to_chin_length: f64,
}

impl FaceMeasurements {
    /// Measure a face.
    ///
    /// Fails with [`crate::Error::LandmarkOutOfRange`] if the landmark list is
    /// too short to contain every index in [`crate::landmarks::REQUIRED`].
    pub fn from_landmarks(landmarks: &Landmarks) -> Result<Self> {
        let span = |a: usize, b: usize| -> Result<f64> {
            Ok(landmarks.get(a)?.distance(&landmarks.get(b)?))
        };

        Ok(Self {
            jaw_width: span(JAW_RIGHT, JAW_LEFT)?,
            cheekbone_width: span(CHEEKBONE_RIGHT, CHEEKBONE_LEFT)?,
            face_length: span(CHIN, NOSE_BRIDGE)?,
            forehead_width: span(FOREHEAD_TOP, FOREHEAD_CENTER)?,
            jaw_to_chin_length: span(CHIN_BOTTOM, CHIN)?,
        })
    }

    /// Apply the shape rules in order.
    pub fn shape(&self) -> FaceShape {
        let Self {
            jaw_width: jaw,
            cheekbone_width: cheekbone,
            face_length: length,
            forehead_width: forehead,
            jaw_to_chin_length: jaw_to_chin,
        } = *self;

        if length > cheekbone && cheekbone > jaw {
            FaceShape::Oval
        } else if length > cheekbone && cheekbone < jaw {
            FaceShape::Rectangle
        } else if forehead > cheekbone && cheekbone < jaw {
            FaceShape::Triangle
        } else if jaw_to_chin > forehead {
            FaceShape::Heart
        } else if jaw == cheekbone && cheekbone == length {
            // Exact float equality; almost never holds for measured faces.
            FaceShape::Round
        } else if (jaw - length).abs() <= SQUARE_TOLERANCE * length
            && (cheekbone - length).abs() <= SQUARE_TOLERANCE * length
        {
            FaceShape::Square
        } else {
            FaceShape::Unknown
        }
    }
}

/// Classify the face described by `landmarks`.
pub fn classify(landmarks: &Landmarks) -> Result<FaceShape> {
    Ok(FaceMeasurements::from_landmarks(landmarks)?.shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::landmarks::FACE_MESH_LANDMARK_COUNT;
    use crate::types::Point;

    /// A full face-mesh landmark list with the given points overridden.
    fn face(overrides: &[(usize, f64, f64)]) -> Landmarks {
        let mut points = vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARK_COUNT];
        for &(idx, x, y) in overrides {
            points[idx] = Point::new(x, y);
        }
        Landmarks::new(points)
    }

    fn measured(
        jaw: f64,
        cheekbone: f64,
        length: f64,
        forehead: f64,
        jaw_to_chin: f64,
    ) -> FaceMeasurements {
        FaceMeasurements {
            jaw_width: jaw,
            cheekbone_width: cheekbone,
            face_length: length,
            forehead_width: forehead,
            jaw_to_chin_length: jaw_to_chin,
        }
    }

    #[test]
    fn measurements_use_expected_landmarks() {
        let landmarks = face(&[
            (JAW_RIGHT, 0.0, 0.0),
            (JAW_LEFT, 0.3, 0.0),
            (CHEEKBONE_RIGHT, 0.1, 0.5),
            (CHEEKBONE_LEFT, 0.6, 0.5),
            (CHIN, 0.3, 1.0),
            (NOSE_BRIDGE, 0.3, 0.0),
            (FOREHEAD_TOP, 0.2, 0.1),
            (FOREHEAD_CENTER, 0.2, 0.3),
            (CHIN_BOTTOM, 0.3, 0.9),
        ]);

        let m = FaceMeasurements::from_landmarks(&landmarks).unwrap();
        assert!((m.jaw_width - 0.3).abs() < 1e-12);
        assert!((m.cheekbone_width - 0.5).abs() < 1e-12);
        assert!((m.face_length - 1.0).abs() < 1e-12);
        assert!((m.forehead_width - 0.2).abs() < 1e-12);
        assert!((m.jaw_to_chin_length - 0.1).abs() < 1e-12);
    }

    #[test]
    fn oval_from_landmarks() {
        // jaw 0.3, cheekbone 0.5, face length 1.0
        let landmarks = face(&[
            (JAW_RIGHT, 0.0, 0.0),
            (JAW_LEFT, 0.3, 0.0),
            (CHEEKBONE_RIGHT, 0.1, 0.5),
            (CHEEKBONE_LEFT, 0.6, 0.5),
            (CHIN, 0.3, 1.0),
            (NOSE_BRIDGE, 0.3, 0.0),
        ]);
        assert_eq!(classify(&landmarks).unwrap(), FaceShape::Oval);
    }

    #[test]
    fn strictly_decreasing_widths_are_oval() {
        for &(length, cheekbone, jaw) in &[
            (1.0, 0.5, 0.3),
            (0.9, 0.8, 0.7),
            (0.5, 0.49, 0.01),
            (0.31, 0.3, 0.29),
        ] {
            // Forehead and chin values that would trigger later rules
            let m = measured(jaw, cheekbone, length, 0.9, 1.0);
            assert_eq!(m.shape(), FaceShape::Oval, "{:?}", m);
        }
    }

    #[test]
    fn rectangle_wins_over_square() {
        let m = measured(0.98, 0.95, 1.0, 0.2, 0.1);
        // Both the Rectangle and the Square conditions hold here
        assert!((m.jaw_width - m.face_length).abs() <= 0.1 * m.face_length);
        assert!((m.cheekbone_width - m.face_length).abs() <= 0.1 * m.face_length);
        assert_eq!(m.shape(), FaceShape::Rectangle);

        let landmarks = face(&[
            (JAW_RIGHT, 0.0, 0.2),
            (JAW_LEFT, 0.98, 0.2),
            (CHEEKBONE_RIGHT, 0.0, 0.5),
            (CHEEKBONE_LEFT, 0.95, 0.5),
            (CHIN, 0.1, 1.0),
            (NOSE_BRIDGE, 0.1, 0.0),
        ]);
        assert_eq!(classify(&landmarks).unwrap(), FaceShape::Rectangle);
    }

    #[test]
    fn triangle() {
        let m = measured(0.6, 0.5, 0.4, 0.7, 0.0);
        assert_eq!(m.shape(), FaceShape::Triangle);
    }

    #[test]
    fn heart() {
        let m = measured(0.3, 0.5, 0.4, 0.1, 0.2);
        assert_eq!(m.shape(), FaceShape::Heart);
    }

    #[test]
    fn round_on_exact_equality() {
        assert_eq!(measured(0.5, 0.5, 0.5, 0.1, 0.0).shape(), FaceShape::Round);

        let landmarks = face(&[
            (JAW_RIGHT, 0.0, 0.0),
            (JAW_LEFT, 0.5, 0.0),
            (CHEEKBONE_RIGHT, 0.0, 0.25),
            (CHEEKBONE_LEFT, 0.5, 0.25),
            (NOSE_BRIDGE, 0.25, 0.0),
            (CHIN, 0.25, 0.5),
            (CHIN_BOTTOM, 0.25, 0.5),
            (FOREHEAD_TOP, 0.4, 0.1),
            (FOREHEAD_CENTER, 0.5, 0.1),
        ]);
        assert_eq!(classify(&landmarks).unwrap(), FaceShape::Round);
    }

    #[test]
    fn round_requires_exact_equality() {
        // A hair off equal falls through to Square
        let m = measured(0.5, 0.5, 0.500_000_1, 0.1, 0.0);
        assert_eq!(m.shape(), FaceShape::Square);
    }

    #[test]
    fn square_within_tolerance() {
        let m = measured(1.0, 1.05, 1.0, 0.2, 0.1);
        assert_eq!(m.shape(), FaceShape::Square);
    }

    #[test]
    fn unknown_when_nothing_matches() {
        let m = measured(0.4, 0.5, 0.3, 0.1, 0.0);
        assert_eq!(m.shape(), FaceShape::Unknown);
    }

    #[test]
    fn classification_is_deterministic() {
        let landmarks = face(&[
            (JAW_RIGHT, 0.12, 0.4),
            (JAW_LEFT, 0.81, 0.42),
            (CHEEKBONE_RIGHT, 0.15, 0.5),
            (CHEEKBONE_LEFT, 0.78, 0.52),
            (CHIN, 0.47, 0.93),
            (NOSE_BRIDGE, 0.48, 0.38),
        ]);
        let first = classify(&landmarks).unwrap();
        for _ in 0..10 {
            assert_eq!(classify(&landmarks).unwrap(), first);
        }
    }

    #[test]
    fn short_landmark_list_is_out_of_range() {
        let landmarks = Landmarks::new(vec![Point::new(0.5, 0.5); 100]);
        match classify(&landmarks) {
            Err(Error::LandmarkOutOfRange { index, len }) => {
                assert_eq!(index, FOREHEAD_CENTER);
                assert_eq!(len, 100);
            }
            other => panic!("expected out-of-range error, got {:?}", other),
        }

        assert!(classify(&Landmarks::default()).is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(FaceShape::Oval.to_string(), "Oval");
        assert_eq!(FaceShape::Unknown.to_string(), "Unknown");
    }
}
