//! Forecast horizon buckets.
//!
//! A horizon is the number of whole days between a question's open date and
//! its resolution date. Horizons are grouped into six ordered, half-open
//! `[min, max)` buckets:
//!
//! ```text
//! short_term      [0, 7)
//! near_term       [7, 30)
//! medium_term     [30, 90)
//! long_term       [90, 180)
//! very_long_term  [180, 365)
//! extended        [365, ∞)
//! ```
//!
//! A boundary day always belongs to the later bucket (90 days is `long_term`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label of a horizon bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonGroup {
    ShortTerm,
    NearTerm,
    MediumTerm,
    LongTerm,
    VeryLongTerm,
    Extended,
}

/// One row of the horizon table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonBucket {
    pub group: HorizonGroup,
    /// Inclusive lower bound in days
    pub min_days: u32,
    /// Exclusive upper bound in days (`None` = unbounded)
    pub max_days: Option<u32>,
}

impl HorizonBucket {
    /// Whether `days` falls inside `[min_days, max_days)`.
    pub const fn contains(&self, days: i64) -> bool {
        if days < self.min_days as i64 {
            return false;
        }
        match self.max_days {
            Some(max) => days < max as i64,
            None => true,
        }
    }
}

/// Ordered horizon table. Buckets partition `[0, ∞)`.
pub const HORIZON_BUCKETS: [HorizonBucket; 6] = [
    HorizonBucket {
        group: HorizonGroup::ShortTerm,
        min_days: 0,
        max_days: Some(7),
    },
    HorizonBucket {
        group: HorizonGroup::NearTerm,
        min_days: 7,
        max_days: Some(30),
    },
    HorizonBucket {
        group: HorizonGroup::MediumTerm,
        min_days: 30,
        max_days: Some(90),
    },
    HorizonBucket {
        group: HorizonGroup::LongTerm,
        min_days: 90,
        max_days: Some(180),
    },
    HorizonBucket {
        group: HorizonGroup::VeryLongTerm,
        min_days: 180,
        max_days: Some(365),
    },
    HorizonBucket {
        group: HorizonGroup::Extended,
        min_days: 365,
        max_days: None,
    },
];

const fn table_is_contiguous(table: &[HorizonBucket]) -> bool {
    if table.is_empty() || table[0].min_days != 0 {
        return false;
    }
    let mut i = 0;
    while i < table.len() {
        let is_last = i + 1 == table.len();
        match table[i].max_days {
            // Only the final bucket may be unbounded.
            None => {
                if !is_last {
                    return false;
                }
            }
            Some(max) => {
                if is_last || max <= table[i].min_days || table[i + 1].min_days != max {
                    return false;
                }
            }
        }
        i += 1;
    }
    true
}

const _: () = assert!(table_is_contiguous(&HORIZON_BUCKETS));

impl HorizonGroup {
    /// All groups in table order.
    pub fn all() -> [HorizonGroup; 6] {
        HORIZON_BUCKETS.map(|b| b.group)
    }

    /// Classify a horizon in days.
    ///
    /// Total over all integers: anything no bucket matches (only negative
    /// values, given the table is contiguous from zero) falls back to
    /// `Extended`.
    pub fn from_days(days: i64) -> HorizonGroup {
        HORIZON_BUCKETS
            .iter()
            .find(|b| b.contains(days))
            .map(|b| b.group)
            .unwrap_or(HorizonGroup::Extended)
    }

    /// Wire label, e.g. `"long_term"`.
    pub fn label(&self) -> &'static str {
        match self {
            HorizonGroup::ShortTerm => "short_term",
            HorizonGroup::NearTerm => "near_term",
            HorizonGroup::MediumTerm => "medium_term",
            HorizonGroup::LongTerm => "long_term",
            HorizonGroup::VeryLongTerm => "very_long_term",
            HorizonGroup::Extended => "extended",
        }
    }

    /// Parse a wire label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<HorizonGroup> {
        Self::all().into_iter().find(|g| g.label() == label)
    }

    /// Table row for this group.
    pub fn bucket(&self) -> HorizonBucket {
        HORIZON_BUCKETS[*self as usize]
    }
}

impl fmt::Display for HorizonGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HorizonGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HorizonGroup::from_label(s).ok_or_else(|| format!("unknown horizon group '{s}'"))
    }
}

/// Classify a horizon in days. See [`HorizonGroup::from_days`].
pub fn classify(days: i64) -> HorizonGroup {
    HorizonGroup::from_days(days)
}

/// All horizon labels in table order.
pub fn horizons_list() -> Vec<&'static str> {
    HorizonGroup::all().iter().map(|g| g.label()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_days_boundaries() {
        let cases = [
            (0, HorizonGroup::ShortTerm),
            (3, HorizonGroup::ShortTerm),
            (6, HorizonGroup::ShortTerm),
            (7, HorizonGroup::NearTerm),
            (15, HorizonGroup::NearTerm),
            (30, HorizonGroup::MediumTerm),
            (60, HorizonGroup::MediumTerm),
            (89, HorizonGroup::MediumTerm),
            (90, HorizonGroup::LongTerm),
            (120, HorizonGroup::LongTerm),
            (180, HorizonGroup::VeryLongTerm),
            (300, HorizonGroup::VeryLongTerm),
            (364, HorizonGroup::VeryLongTerm),
            (365, HorizonGroup::Extended),
            (500, HorizonGroup::Extended),
            (1000, HorizonGroup::Extended),
        ];
        for (days, expected) in cases {
            assert_eq!(classify(days), expected, "classify({days})");
        }
    }

    #[test]
    fn test_negative_falls_back_to_extended() {
        assert_eq!(classify(-1), HorizonGroup::Extended);
    }

    #[test]
    fn test_every_day_hits_exactly_one_bucket() {
        for days in 0..2000 {
            let hits = HORIZON_BUCKETS.iter().filter(|b| b.contains(days)).count();
            assert_eq!(hits, 1, "day {days} matched {hits} buckets");
        }
    }

    #[test]
    fn test_table_contiguous() {
        assert!(table_is_contiguous(&HORIZON_BUCKETS));

        let mut gapped = HORIZON_BUCKETS;
        gapped[2].min_days = 31;
        assert!(!table_is_contiguous(&gapped));

        let mut open_middle = HORIZON_BUCKETS;
        open_middle[1].max_days = None;
        assert!(!table_is_contiguous(&open_middle));
    }

    #[test]
    fn test_table_order_matches_enum() {
        for (i, group) in HorizonGroup::all().iter().enumerate() {
            assert_eq!(*group as usize, i);
            assert_eq!(group.bucket().group, *group);
        }
    }

    #[test]
    fn test_labels_round_trip_and_unique() {
        let labels = horizons_list();
        assert_eq!(
            labels,
            vec![
                "short_term",
                "near_term",
                "medium_term",
                "long_term",
                "very_long_term",
                "extended"
            ]
        );
        for label in &labels {
            let group = HorizonGroup::from_label(label).unwrap();
            assert_eq!(group.label(), *label);
        }
        assert!(HorizonGroup::from_label("forever").is_none());
        assert!("forever".parse::<HorizonGroup>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&HorizonGroup::VeryLongTerm).unwrap();
        assert_eq!(json, "\"very_long_term\"");
    }
}
