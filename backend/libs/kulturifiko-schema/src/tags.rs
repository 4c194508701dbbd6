use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Elements of culture a post can be tagged with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CultureElement {
    Geography,
    History,
    Demographics,
    Culture,
}

impl CultureElement {
    pub const ALL: [CultureElement; 4] = [
        CultureElement::Geography,
        CultureElement::History,
        CultureElement::Demographics,
        CultureElement::Culture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CultureElement::Geography => "geography",
            CultureElement::History => "history",
            CultureElement::Demographics => "demographics",
            CultureElement::Culture => "culture",
        }
    }

    /// Sidebar label
    pub fn label(&self) -> &'static str {
        match self {
            CultureElement::Geography => "Geography",
            CultureElement::History => "History",
            CultureElement::Demographics => "Demographics",
            CultureElement::Culture => "Culture",
        }
    }
}

/// Learning styles a post can be tagged with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    AuditoryOral,
    ReadWrite,
    Kinesthetic,
}

impl LearningStyle {
    pub const ALL: [LearningStyle; 4] = [
        LearningStyle::Visual,
        LearningStyle::AuditoryOral,
        LearningStyle::ReadWrite,
        LearningStyle::Kinesthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "visual",
            LearningStyle::AuditoryOral => "auditory_oral",
            LearningStyle::ReadWrite => "read_write",
            LearningStyle::Kinesthetic => "kinesthetic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "Visual",
            LearningStyle::AuditoryOral => "Auditory & Oral",
            LearningStyle::ReadWrite => "Read & Write",
            LearningStyle::Kinesthetic => "Kinesthetic",
        }
    }
}

/// Tag text stored in the database did not match any known tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tag: {}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for CultureElement {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CultureElement::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

impl FromStr for LearningStyle {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LearningStyle::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}
