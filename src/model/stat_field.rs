/// Stat field definitions for the base stats table
///
/// This module maps the row labels used by the source's base stats table onto
/// the six fields of an [`AttributeSet`](crate::model::AttributeSet).
use std::fmt;

/// One of the six base stats, or a label the table uses for something else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,

    /// Any label outside the fixed table (totals, cosmetic rows, ...)
    Unrecognized,
}

impl StatField {
    /// The six fields every complete stat set must carry, in table order
    pub const REQUIRED: [StatField; 6] = [
        Self::Hp,
        Self::Attack,
        Self::Defense,
        Self::SpecialAttack,
        Self::SpecialDefense,
        Self::Speed,
    ];

    /// Maps a row label onto a field
    ///
    /// Matching is exact and case-sensitive; anything else is `Unrecognized`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "HP" => Self::Hp,
            "Attack" => Self::Attack,
            "Defense" => Self::Defense,
            "Sp. Atk" => Self::SpecialAttack,
            "Sp. Def" => Self::SpecialDefense,
            "Speed" => Self::Speed,
            _ => Self::Unrecognized,
        }
    }

    /// The label the source table uses for this field
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Hp => Some("HP"),
            Self::Attack => Some("Attack"),
            Self::Defense => Some("Defense"),
            Self::SpecialAttack => Some("Sp. Atk"),
            Self::SpecialDefense => Some("Sp. Def"),
            Self::Speed => Some("Speed"),
            Self::Unrecognized => None,
        }
    }

    /// The key this field is stored under in the record file
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hp => "hp",
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::SpecialAttack => "special_attack",
            Self::SpecialDefense => "special_defense",
            Self::Speed => "speed",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Position of the field in [`StatField::REQUIRED`]
    pub(crate) fn index(&self) -> Option<usize> {
        Self::REQUIRED.iter().position(|field| field == self)
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
