//! # Object Physics Registry
//!
//! Static per-kind physical parameters. Every other module consults these
//! tables; nothing here is mutable at runtime.

use serde::{Deserialize, Serialize};

/// Closed set of desk object kinds.
///
/// Tags that do not name a known kind parse to [`ObjectKind::Unknown`], which
/// participates in physics with generic defaults instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Clock,
    Lamp,
    Books,
    Pen,
    PenHolder,
    Mug,
    Laptop,
    Paper,
    PhotoFrame,
    CassettePlayer,
    Cassette,
    Notebook,
    Magazine,
    Plant,
    Globe,
    Hourglass,
    Metronome,
    #[serde(other)]
    Unknown,
}

/// Physical parameters of one object kind at scale 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsProfile {
    /// Relative mass used for pushes and elastic exchange.
    pub weight: f32,
    /// 0..1, resistance to tipping.
    pub stability: f32,
    /// Distance from the origin to the top surface.
    pub height: f32,
    /// Distance from the origin down to the physical bottom.
    pub base_offset: f32,
    /// 0..1, how strongly drag is transmitted through a stacking contact.
    pub friction: f32,
    /// Nothing may rest on top of this kind.
    pub no_stacking_on_top: bool,
}

impl PhysicsProfile {
    const fn new(
        weight: f32,
        stability: f32,
        height: f32,
        base_offset: f32,
        friction: f32,
        no_stacking_on_top: bool,
    ) -> Self {
        Self {
            weight,
            stability,
            height,
            base_offset,
            friction,
            no_stacking_on_top,
        }
    }
}

pub const DEFAULT_COLLISION_RADIUS: f32 = 0.1;
pub const DEFAULT_COLLISION_HEIGHT: f32 = 0.3;
pub const DEFAULT_STACKING_RADIUS: f32 = 0.25;

const DEFAULT_PROFILE: PhysicsProfile = PhysicsProfile::new(0.5, 0.5, 0.1, 0.0, 0.5, false);

impl ObjectKind {
    pub const ALL: [ObjectKind; 18] = [
        ObjectKind::Clock,
        ObjectKind::Lamp,
        ObjectKind::Books,
        ObjectKind::Pen,
        ObjectKind::PenHolder,
        ObjectKind::Mug,
        ObjectKind::Laptop,
        ObjectKind::Paper,
        ObjectKind::PhotoFrame,
        ObjectKind::CassettePlayer,
        ObjectKind::Cassette,
        ObjectKind::Notebook,
        ObjectKind::Magazine,
        ObjectKind::Plant,
        ObjectKind::Globe,
        ObjectKind::Hourglass,
        ObjectKind::Metronome,
        ObjectKind::Unknown,
    ];

    /// Parse a type tag such as `"photo-frame"`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "clock" => Self::Clock,
            "lamp" => Self::Lamp,
            "books" => Self::Books,
            "pen" => Self::Pen,
            "pen-holder" => Self::PenHolder,
            "mug" => Self::Mug,
            "laptop" => Self::Laptop,
            "paper" => Self::Paper,
            "photo-frame" => Self::PhotoFrame,
            "cassette-player" => Self::CassettePlayer,
            "cassette" => Self::Cassette,
            "notebook" => Self::Notebook,
            "magazine" => Self::Magazine,
            "plant" => Self::Plant,
            "globe" => Self::Globe,
            "hourglass" => Self::Hourglass,
            "metronome" => Self::Metronome,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Lamp => "lamp",
            Self::Books => "books",
            Self::Pen => "pen",
            Self::PenHolder => "pen-holder",
            Self::Mug => "mug",
            Self::Laptop => "laptop",
            Self::Paper => "paper",
            Self::PhotoFrame => "photo-frame",
            Self::CassettePlayer => "cassette-player",
            Self::Cassette => "cassette",
            Self::Notebook => "notebook",
            Self::Magazine => "magazine",
            Self::Plant => "plant",
            Self::Globe => "globe",
            Self::Hourglass => "hourglass",
            Self::Metronome => "metronome",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub const fn physics(self) -> PhysicsProfile {
        match self {
            //                            weight stab  height base   fric  no-stack
            Self::Clock => PhysicsProfile::new(0.6, 0.5, 0.45, 0.0, 0.5, true),
            Self::Lamp => PhysicsProfile::new(1.2, 0.7, 0.6, 0.0, 0.6, true),
            Self::Books => PhysicsProfile::new(0.8, 0.85, 0.06, 0.0, 0.75, false),
            Self::Pen => PhysicsProfile::new(0.05, 0.9, 0.02, 0.0, 0.8, true),
            Self::PenHolder => PhysicsProfile::new(0.3, 0.6, 0.15, 0.0, 0.5, true),
            Self::Mug => PhysicsProfile::new(0.4, 0.6, 0.06, 0.06, 0.5, true),
            Self::Laptop => PhysicsProfile::new(1.5, 0.9, 0.03, 0.0, 0.6, false),
            Self::Paper => PhysicsProfile::new(0.05, 1.0, 0.005, 0.0, 0.6, false),
            Self::PhotoFrame => PhysicsProfile::new(0.2, 0.35, 0.25, 0.0, 0.5, true),
            Self::CassettePlayer => PhysicsProfile::new(0.7, 0.8, 0.08, 0.0, 0.6, false),
            Self::Cassette => PhysicsProfile::new(0.08, 0.9, 0.015, 0.0, 0.5, false),
            Self::Notebook => PhysicsProfile::new(0.15, 0.95, 0.02, 0.0, 0.7, false),
            Self::Magazine => PhysicsProfile::new(0.1, 0.95, 0.01, 0.0, 0.65, false),
            Self::Plant => PhysicsProfile::new(0.9, 0.5, 0.35, 0.0, 0.6, true),
            Self::Globe => PhysicsProfile::new(0.7, 0.45, 0.2, 0.2, 0.5, true),
            Self::Hourglass => PhysicsProfile::new(0.3, 0.4, 0.2, 0.0, 0.5, true),
            Self::Metronome => PhysicsProfile::new(0.5, 0.6, 0.25, 0.0, 0.5, true),
            Self::Unknown => DEFAULT_PROFILE,
        }
    }

    /// Tight footprint radius used for push-apart collisions.
    #[must_use]
    pub const fn collision_base_radius(self) -> f32 {
        match self {
            Self::Clock | Self::Metronome => 0.12,
            Self::Lamp => 0.15,
            Self::Books => 0.2,
            Self::Pen | Self::Cassette => 0.05,
            Self::PenHolder | Self::Mug | Self::PhotoFrame => 0.08,
            Self::Laptop => 0.25,
            Self::Paper | Self::Notebook | Self::Magazine => 0.15,
            Self::CassettePlayer => 0.18,
            Self::Plant | Self::Globe => 0.12,
            Self::Hourglass => 0.06,
            Self::Unknown => DEFAULT_COLLISION_RADIUS,
        }
    }

    /// Height of the span used by the vertical-overlap test.
    #[must_use]
    pub const fn collision_base_height(self) -> f32 {
        match self {
            Self::Clock => 0.45,
            Self::Lamp => 0.6,
            Self::Books => 0.06,
            Self::Pen => 0.02,
            Self::PenHolder => 0.15,
            Self::Mug => 0.12,
            Self::Laptop => 0.03,
            Self::Paper => 0.005,
            Self::PhotoFrame | Self::Metronome => 0.25,
            Self::CassettePlayer => 0.08,
            Self::Cassette => 0.015,
            Self::Notebook => 0.02,
            Self::Magazine => 0.01,
            Self::Plant => 0.35,
            Self::Globe => 0.4,
            Self::Hourglass => 0.2,
            Self::Unknown => DEFAULT_COLLISION_HEIGHT,
        }
    }

    /// Generous footprint radius used for every support query.
    #[must_use]
    pub const fn stacking_base_radius(self) -> f32 {
        match self {
            Self::Clock | Self::Metronome => 0.18,
            Self::Lamp => 0.22,
            Self::Books => 0.35,
            Self::Pen | Self::Cassette => 0.12,
            Self::PenHolder | Self::Mug => 0.12,
            Self::Laptop => 0.4,
            Self::Paper | Self::Notebook | Self::Magazine => 0.25,
            Self::PhotoFrame => 0.15,
            Self::CassettePlayer => 0.28,
            Self::Plant | Self::Globe => 0.18,
            Self::Hourglass => 0.1,
            Self::Unknown => DEFAULT_STACKING_RADIUS,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
