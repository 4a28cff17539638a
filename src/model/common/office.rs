use std::fmt::Display;

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// The two elected offices every ballot must select a candidate for.
#[derive(
    Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Office {
    /// The student advocate.
    Personero,
    /// The student comptroller.
    Contralor,
}

impl Office {
    /// Every office on the ballot, in the order results are reported.
    pub const ALL: [Office; 2] = [Office::Personero, Office::Contralor];
}

impl Display for Office {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Personero => "Personero",
                Self::Contralor => "Contralor",
            }
        )
    }
}

impl From<Office> for Bson {
    fn from(office: Office) -> Self {
        to_bson(&office).expect("Serialisation is infallible")
    }
}
