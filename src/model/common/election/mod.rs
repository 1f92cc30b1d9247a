mod status;

pub use status::{Badge, BadgeTone, ElectionStatus, StatusCounts, UnknownStatus};

/// Positions an election is created with when none are given.
pub const DEFAULT_POSITIONS: [&str; 3] = ["President", "Vice President", "Secretary"];
