//! Markets for which fair prices are projected.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// An 'over _N_.5' line.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Over(pub u8);
impl Over {
    pub fn line(&self) -> f64 {
        self.0 as f64 + 0.5
    }

    /// The smallest count that settles the over.
    pub fn threshold(&self) -> u32 {
        self.0 as u32 + 1
    }
}

impl Default for Over {
    fn default() -> Self {
        Self(2)
    }
}

impl Display for Over {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.5", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    ShotsOver(Over),
    OnePlusPoints,
    TwoPlusPoints,
    FirstGoal,
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Market::ShotsOver(over) => write!(f, "SOG over {over}"),
            Market::OnePlusPoints => write!(f, "1+ points"),
            Market::TwoPlusPoints => write!(f, "2+ points"),
            Market::FirstGoal => write!(f, "first goal"),
        }
    }
}
