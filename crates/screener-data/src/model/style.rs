//! Investment-style tags.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The ten investment-style classifications published with the universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StyleTag {
    /// Multi-bagger candidates
    #[serde(rename = "MBagger")]
    MultiBagger,

    /// High return on equity
    #[serde(rename = "ROE")]
    ReturnOnEquity,

    /// Growth
    #[serde(rename = "grow")]
    Growth,

    /// Growth, relaxed criteria
    #[serde(rename = "growR")]
    GrowthRelaxed,

    /// Momentum
    #[serde(rename = "mom")]
    Momentum,

    /// Quality
    #[serde(rename = "qual")]
    Quality,

    /// Quality, relaxed criteria
    #[serde(rename = "qualR")]
    QualityRelaxed,

    /// Small caps
    #[serde(rename = "small")]
    SmallCap,

    /// Trend following
    #[serde(rename = "trend")]
    Trend,

    /// Value
    #[serde(rename = "value")]
    Value,
}

impl StyleTag {
    /// All style tags in source column order.
    pub const ALL: [Self; 10] = [
        Self::MultiBagger,
        Self::ReturnOnEquity,
        Self::Growth,
        Self::GrowthRelaxed,
        Self::Momentum,
        Self::Quality,
        Self::QualityRelaxed,
        Self::SmallCap,
        Self::Trend,
        Self::Value,
    ];

    /// Name of the source column carrying this tag.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::MultiBagger => "MBagger",
            Self::ReturnOnEquity => "ROE",
            Self::Growth => "grow",
            Self::GrowthRelaxed => "growR",
            Self::Momentum => "mom",
            Self::Quality => "qual",
            Self::QualityRelaxed => "qualR",
            Self::SmallCap => "small",
            Self::Trend => "trend",
            Self::Value => "value",
        }
    }

    /// Look a tag up by its exact source column name.
    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.column() == column)
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Error returned when a string names no style tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style tag {0:?}")]
pub struct UnknownStyleTag(pub String);

impl FromStr for StyleTag {
    type Err = UnknownStyleTag;

    /// Accepts the source column name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.column().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStyleTag(s.to_string()))
    }
}

/// A set of style tags.
///
/// Membership is total: a tag that is not in the set is false, whether the
/// source marked it so or never published the column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleTags(u16);

impl StyleTags {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether `tag` is set.
    pub const fn contains(&self, tag: StyleTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Set or clear `tag`.
    pub const fn set(&mut self, tag: StyleTag, value: bool) {
        if value {
            self.0 |= tag.bit();
        } else {
            self.0 &= !tag.bit();
        }
    }

    /// Builder form of [`set`](Self::set) with `true`.
    #[must_use]
    pub const fn with(mut self, tag: StyleTag) -> Self {
        self.set(tag, true);
        self
    }

    /// Whether the two sets share at least one tag.
    pub const fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no tag is set.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of tags set.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Tags set, in source column order.
    pub fn iter(&self) -> impl Iterator<Item = StyleTag> + '_ {
        StyleTag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }
}

impl FromIterator<StyleTag> for StyleTags {
    fn from_iter<I: IntoIterator<Item = StyleTag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl Serialize for StyleTags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
