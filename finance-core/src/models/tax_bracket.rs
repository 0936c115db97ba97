use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One slice of a progressive tax schedule.
///
/// `max` of `None` marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { min, max, rate }
    }

    /// Width of the bracket, or `None` when it is unbounded.
    pub fn width(&self) -> Option<Decimal> {
        self.max.map(|max| max - self.min)
    }
}
