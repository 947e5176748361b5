//! Base stat sets and their incremental builder

use crate::model::StatField;
use crate::ExtractError;
use serde::{Deserialize, Serialize};

/// The six base stats of one entry
///
/// Values are never range-checked; the source only ever publishes
/// non-negative numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub special_attack: i32,
    pub special_defense: i32,
    pub speed: i32,
}

impl AttributeSet {
    /// Returns the value stored for `field`, `None` for `Unrecognized`
    pub fn get(&self, field: StatField) -> Option<i32> {
        match field {
            StatField::Hp => Some(self.hp),
            StatField::Attack => Some(self.attack),
            StatField::Defense => Some(self.defense),
            StatField::SpecialAttack => Some(self.special_attack),
            StatField::SpecialDefense => Some(self.special_defense),
            StatField::Speed => Some(self.speed),
            StatField::Unrecognized => None,
        }
    }

    /// Sum of all six stats
    pub fn total(&self) -> i64 {
        StatField::REQUIRED
            .iter()
            .filter_map(|field| self.get(*field))
            .map(i64::from)
            .sum()
    }
}

/// Collects stat values row by row and produces an [`AttributeSet`] once all
/// six fields are known
#[derive(Debug, Clone, Default)]
pub struct StatsBuilder {
    values: [Option<i32>; 6],
}

impl StatsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value for `field`
    ///
    /// A later value for the same field replaces the earlier one. Returns the
    /// replaced value, if any. `Unrecognized` is ignored.
    pub fn set(&mut self, field: StatField, value: i32) -> Option<i32> {
        let index = field.index()?;
        self.values[index].replace(value)
    }

    /// Fields that have not received a value yet, in table order
    pub fn missing(&self) -> Vec<StatField> {
        StatField::REQUIRED
            .iter()
            .zip(self.values.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| *field)
            .collect()
    }

    /// Builds the stat set, failing with the list of missing fields
    pub fn build(&self) -> Result<AttributeSet, ExtractError> {
        match self.values {
            [Some(hp), Some(attack), Some(defense), Some(special_attack), Some(special_defense), Some(speed)] => {
                Ok(AttributeSet {
                    hp,
                    attack,
                    defense,
                    special_attack,
                    special_defense,
                    speed,
                })
            }
            _ => Err(ExtractError::Validation {
                missing: self.missing(),
            }),
        }
    }
}
