use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A budget line for one category in a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub allocated: Decimal,
    pub spent: Decimal,
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        allocated: Decimal,
        spent: Decimal,
    ) -> Self {
        Self {
            category: category.into(),
            allocated,
            spent,
        }
    }
}

/// Health tier of a budget based on its utilization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Healthy,
    Warning,
    Critical,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Healthy => "green",
            Self::Warning => "yellow",
            Self::Critical => "red",
        }
    }

    /// The `{status, color}` pair handed to presentation code.
    pub fn classification(&self) -> BudgetClassification {
        BudgetClassification {
            status: *self,
            color: self.color(),
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetClassification {
    pub status: BudgetStatus,
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn classification_serializes_status_and_color() {
        let json = serde_json::to_string(&BudgetStatus::Warning.classification()).unwrap();

        assert_eq!(json, r#"{"status":"warning","color":"yellow"}"#);
    }

    #[test]
    fn display_uses_lowercase_name() {
        assert_eq!(BudgetStatus::Critical.to_string(), "critical");
    }
}
