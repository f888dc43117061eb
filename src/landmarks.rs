//! Landmark indices used by the face-shape measurements.
//!
//! These address the face-mesh detector's fixed 468-point output. They are
//! part of that model's schema and are not configurable.

/// Number of points the face-mesh detector emits per face.
pub const FACE_MESH_LANDMARK_COUNT: usize = 468;

/// Right jaw extreme.
pub const JAW_RIGHT: usize = 0;
/// Right cheekbone.
pub const CHEEKBONE_RIGHT: usize = 2;
/// Chin tip.
pub const CHIN: usize = 8;
/// Top of the forehead.
pub const FOREHEAD_TOP: usize = 10;
/// Left cheekbone.
pub const CHEEKBONE_LEFT: usize = 14;
/// Left jaw extreme.
pub const JAW_LEFT: usize = 16;
/// Top of the nose bridge.
pub const NOSE_BRIDGE: usize = 27;
/// Forehead center.
pub const FOREHEAD_CENTER: usize = 151;
/// Bottom of the chin.
pub const CHIN_BOTTOM: usize = 152;

/// Every index the classifier reads.
pub const REQUIRED: [usize; 9] = [
    JAW_RIGHT,
    CHEEKBONE_RIGHT,
    CHIN,
    FOREHEAD_TOP,
    CHEEKBONE_LEFT,
    JAW_LEFT,
    NOSE_BRIDGE,
    FOREHEAD_CENTER,
    CHIN_BOTTOM,
];
