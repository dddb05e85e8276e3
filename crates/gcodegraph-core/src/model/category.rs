//! Motion categories and their feed/extrusion policies
//!
//! Every commanded move belongs to exactly one category. The category drives
//! the feed rate written on export and how the extrusion axis advances for
//! the move: either a fixed increment (`Set`) or an increment proportional
//! to the length of the move (`PerLength`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a category's extrusion coefficient is applied on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrusionMode {
    /// Apply the coefficient as an absolute increment once
    Set,
    /// Multiply the coefficient by the Euclidean length of the move
    PerLength,
}

/// Static policy record for one motion category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    /// Feed rate (F word) written on export, in machine units per minute
    pub feed_rate: f64,
    /// Extrusion coefficient (absolute or per-length, see `mode`)
    pub extrusion_rate: f64,
    /// How the coefficient advances the actuator accumulator
    pub mode: ExtrusionMode,
}

/// Classification of a move's purpose
///
/// Fixed vocabulary shared by both codec directions. The declaration order
/// matches the policy table of the machine profile this format targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    /// Initial move to the start position of the print
    MoveToStart,
    /// Anchor pass that primes the extruder against the build plate
    Anchor,
    /// Restart extrusion after a retract
    Restart,
    /// Non-extruding travel move
    TravelMove,
    /// Connecting move between path sections
    Connection,
    /// Filament retraction
    Retract,
    /// Outer perimeter extrusion
    Outline,
    /// Inner perimeter extrusion
    Inset,
    /// Interior fill extrusion
    Infill,
    /// Final move ending the print
    EndOfPrint,
}

impl MoveCategory {
    /// All categories in policy-table order
    pub const ALL: [MoveCategory; 10] = [
        MoveCategory::MoveToStart,
        MoveCategory::Anchor,
        MoveCategory::Restart,
        MoveCategory::TravelMove,
        MoveCategory::Connection,
        MoveCategory::Retract,
        MoveCategory::Outline,
        MoveCategory::Inset,
        MoveCategory::Infill,
        MoveCategory::EndOfPrint,
    ];

    /// Get the feed and extrusion policy for this category
    pub fn policy(self) -> CategoryPolicy {
        use ExtrusionMode::{PerLength, Set};
        match self {
            MoveCategory::MoveToStart => CategoryPolicy {
                feed_rate: 9000.0,
                extrusion_rate: 0.0,
                mode: Set,
            },
            MoveCategory::Anchor => CategoryPolicy {
                feed_rate: 1800.0,
                extrusion_rate: 0.175,
                mode: PerLength,
            },
            MoveCategory::Restart => CategoryPolicy {
                feed_rate: 1500.0,
                extrusion_rate: 1.3,
                mode: Set,
            },
            MoveCategory::TravelMove => CategoryPolicy {
                feed_rate: 9000.0,
                extrusion_rate: 0.0,
                mode: Set,
            },
            MoveCategory::Connection => CategoryPolicy {
                feed_rate: 1620.0,
                extrusion_rate: 0.035,
                mode: PerLength,
            },
            MoveCategory::Retract => CategoryPolicy {
                feed_rate: 1500.0,
                extrusion_rate: -1.3,
                mode: Set,
            },
            MoveCategory::Outline => CategoryPolicy {
                feed_rate: 720.0,
                extrusion_rate: 0.035,
                mode: PerLength,
            },
            MoveCategory::Inset => CategoryPolicy {
                feed_rate: 1800.0,
                extrusion_rate: 0.035,
                mode: PerLength,
            },
            MoveCategory::Infill => CategoryPolicy {
                feed_rate: 1620.0,
                extrusion_rate: 0.035,
                mode: PerLength,
            },
            MoveCategory::EndOfPrint => CategoryPolicy {
                feed_rate: 1500.0,
                extrusion_rate: -1.3,
                mode: Set,
            },
        }
    }

    /// Human-readable label written as the trailing comment on export
    pub fn label(self) -> &'static str {
        match self {
            MoveCategory::MoveToStart => "Move to start position",
            MoveCategory::Anchor => "Anchor",
            MoveCategory::Restart => "Restart",
            MoveCategory::TravelMove => "Travel move",
            MoveCategory::Connection => "Connection",
            MoveCategory::Retract => "Retract",
            MoveCategory::Outline => "Outline",
            MoveCategory::Inset => "Inset",
            MoveCategory::Infill => "Infill",
            MoveCategory::EndOfPrint => "End of print",
        }
    }

    /// Resolve a trailing annotation word to a category
    ///
    /// The aliases `move`, `position` and `print` are also the final words
    /// of the multi-word labels, so the trailing comment of an exported line
    /// resolves back to the same category on re-import.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "move" => Some(MoveCategory::TravelMove),
            "position" => Some(MoveCategory::MoveToStart),
            "print" => Some(MoveCategory::EndOfPrint),
            "Anchor" => Some(MoveCategory::Anchor),
            "Restart" => Some(MoveCategory::Restart),
            "Connection" => Some(MoveCategory::Connection),
            "Retract" => Some(MoveCategory::Retract),
            "Outline" => Some(MoveCategory::Outline),
            "Inset" => Some(MoveCategory::Inset),
            "Infill" => Some(MoveCategory::Infill),
            _ => None,
        }
    }
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
