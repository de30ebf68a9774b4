use serde::{Deserialize, Serialize};

/// Reduction applied to a run of daily values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Arithmetic mean.
    Avg,
    /// First value of the run.
    Value,
}

impl Aggregate {
    /// The aggregate a command word names (`min`, `max`, `avg`, `value`).
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Aggregate::Min),
            "max" => Some(Aggregate::Max),
            "avg" => Some(Aggregate::Avg),
            "value" => Some(Aggregate::Value),
            _ => None,
        }
    }

    /// The command word.
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Avg => "avg",
            Aggregate::Value => "value",
        }
    }

    /// Word used in sentences: `minimum`, `maximum`, `average`, `value`.
    pub fn long_name(self) -> &'static str {
        match self {
            Aggregate::Min => "minimum",
            Aggregate::Max => "maximum",
            Aggregate::Avg => "average",
            Aggregate::Value => "value",
        }
    }

    /// Reduce `values`. `None` for an empty run.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        let (&first, rest) = values.split_first()?;
        Some(match self {
            Aggregate::Min => rest.iter().fold(first, |a, &b| if a <= b { a } else { b }),
            Aggregate::Max => rest.iter().fold(first, |a, &b| if a >= b { a } else { b }),
            Aggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Value => first,
        })
    }
}

impl std::fmt::Display for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reductions() {
        let v = [70.0, 75.0, 65.0];
        assert_eq!(Aggregate::Min.apply(&v), Some(65.0));
        assert_eq!(Aggregate::Max.apply(&v), Some(75.0));
        assert_eq!(Aggregate::Avg.apply(&v), Some(70.0));
        assert_eq!(Aggregate::Value.apply(&v), Some(70.0));
        assert_eq!(Aggregate::Max.apply(&[]), None);
    }

    #[test]
    fn command_words() {
        for kind in [Aggregate::Min, Aggregate::Max, Aggregate::Avg, Aggregate::Value] {
            assert_eq!(Aggregate::from_command(kind.as_str()), Some(kind));
        }
        assert_eq!(Aggregate::from_command("histogram"), None);
        assert_eq!(Aggregate::Avg.long_name(), "average");
    }
}
