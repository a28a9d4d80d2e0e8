//! Spirit photo development odds

use serde::{Deserialize, Serialize};

/// Time between taking a photo and knowing what it shows (ms)
pub const PHOTO_DEVELOP_DELAY_MS: u64 = 7000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoQuality {
    Strong,
    Faint,
    None,
}

impl PhotoQuality {
    /// Whether the photo counts as evidence
    pub fn is_evidence(&self) -> bool {
        !matches!(self, PhotoQuality::None)
    }
}

/// Outcome probabilities for one distance band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoOdds {
    pub strong: f64,
    pub faint: f64,
    pub none: f64,
}

/// Probability table for a ghost at normalized radar `distance`
pub fn photo_odds(distance: f64) -> PhotoOdds {
    if distance < 0.3 {
        PhotoOdds { strong: 0.6, faint: 0.3, none: 0.1 }
    } else if distance < 0.6 {
        PhotoOdds { strong: 0.2, faint: 0.5, none: 0.3 }
    } else {
        PhotoOdds { strong: 0.05, faint: 0.25, none: 0.7 }
    }
}

/// Resolve a photo's quality from a uniform roll in [0, 1)
pub fn roll_photo_quality(distance: f64, roll: f64) -> PhotoQuality {
    let odds = photo_odds(distance);
    if roll < odds.strong {
        PhotoQuality::Strong
    } else if roll < odds.strong + odds.faint {
        PhotoQuality::Faint
    } else {
        PhotoQuality::None
    }
}

/// A photo taken during an investigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: u32,
    /// Ghost distance when the shutter fired
    pub distance: f64,
    pub taken_at: u64,
    /// `None` until developed
    pub quality: Option<PhotoQuality>,
}
