//! Wind bearing classification and arrow geometry

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DashboardError, Result};

/// Eight-point compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    /// Sectors in clockwise order, starting at North
    const SECTORS: [CompassDirection; 8] = [
        CompassDirection::North,
        CompassDirection::Northeast,
        CompassDirection::East,
        CompassDirection::Southeast,
        CompassDirection::South,
        CompassDirection::Southwest,
        CompassDirection::West,
        CompassDirection::Northwest,
    ];

    /// Full English name, e.g. "Northeast"
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CompassDirection::North => "North",
            CompassDirection::Northeast => "Northeast",
            CompassDirection::East => "East",
            CompassDirection::Southeast => "Southeast",
            CompassDirection::South => "South",
            CompassDirection::Southwest => "Southwest",
            CompassDirection::West => "West",
            CompassDirection::Northwest => "Northwest",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Width of one compass sector in degrees
const SECTOR_WIDTH: f64 = 45.0;

/// Map a bearing in [0, 360] to its compass sector.
///
/// Sectors are half-open and centred on the cardinal/intercardinal bearings,
/// so 22.5 is Northeast and 337.5 is North. 360 is the same as 0.
pub fn classify(degrees: f64) -> Result<CompassDirection> {
    if !degrees.is_finite() || !(0.0..=360.0).contains(&degrees) {
        return Err(DashboardError::InvalidDegree { degrees });
    }

    let normalized = degrees % 360.0;
    // Shift by half a sector so North's wrap-around range starts at 0
    let shifted = (normalized + SECTOR_WIDTH / 2.0) % 360.0;
    let index = (shifted / SECTOR_WIDTH).floor() as usize;

    Ok(CompassDirection::SECTORS[index.min(CompassDirection::SECTORS.len() - 1)])
}

/// Arrow endpoint relative to the origin, y pointing north
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowVector {
    pub dx: f64,
    pub dy: f64,
}

/// Arrow of `length` pointing along the bearing, measured clockwise from north
#[must_use]
pub fn to_vector(degrees: f64, length: f64) -> ArrowVector {
    let radians = degrees.to_radians();
    ArrowVector {
        dx: length * radians.sin(),
        dy: length * radians.cos(),
    }
}
