use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bounds (exclusive) of the first five buckets, ascending.
const UPPER_BOUNDS: [f64; 5] = [18.5, 25.0, 30.0, 35.0, 40.0];

/// Ordered BMI buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    /// bmi < 18.5
    Underweight,
    /// 18.5 <= bmi < 25
    Normal,
    /// 25 <= bmi < 30
    OverweightLevelI,
    /// 30 <= bmi < 35
    ObesityTypeI,
    /// 35 <= bmi < 40
    ObesityTypeII,
    /// bmi >= 40
    ObesityTypeIII,
}

impl BmiCategory {
    /// All buckets in ascending order.
    pub const ALL: [Self; 6] = [
        Self::Underweight,
        Self::Normal,
        Self::OverweightLevelI,
        Self::ObesityTypeI,
        Self::ObesityTypeII,
        Self::ObesityTypeIII,
    ];

    /// Display label shown to the user.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Baixo peso",
            Self::Normal => "Peso normal",
            Self::OverweightLevelI => "Sobrepeso Nível I",
            Self::ObesityTypeI => "Obesidade Tipo I",
            Self::ObesityTypeII => "Obesidade Tipo II",
            Self::ObesityTypeIII => "Obesidade Tipo III",
        }
    }

    /// One-based bucket number.
    #[must_use]
    pub const fn bucket(self) -> u8 {
        match self {
            Self::Underweight => 1,
            Self::Normal => 2,
            Self::OverweightLevelI => 3,
            Self::ObesityTypeI => 4,
            Self::ObesityTypeII => 5,
            Self::ObesityTypeIII => 6,
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body-mass-index: weight in kilograms over height in metres squared.
///
/// `height_m` must be positive; the record assembler enforces the 1.0 m
/// minimum before this is reached.
#[must_use]
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / height_m.powi(2)
}

/// Maps a BMI to the first bucket whose upper bound exceeds it.
#[must_use]
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    UPPER_BOUNDS
        .iter()
        .position(|bound| bmi < *bound)
        .map_or(BmiCategory::ObesityTypeIII, |idx| BmiCategory::ALL[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_matches_formula() {
        for (weight, height) in [(70.0, 1.70), (100.0, 1.60), (30.0, 2.5), (300.0, 1.0)] {
            let expected = weight / (height * height);
            assert!((calculate_bmi(weight, height) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn boundaries_belong_to_upper_bucket() {
        assert_eq!(classify_bmi(18.499), BmiCategory::Underweight);
        assert_eq!(classify_bmi(18.5), BmiCategory::Normal);
        assert_eq!(classify_bmi(24.999), BmiCategory::Normal);
        assert_eq!(classify_bmi(25.0), BmiCategory::OverweightLevelI);
        assert_eq!(classify_bmi(30.0), BmiCategory::ObesityTypeI);
        assert_eq!(classify_bmi(35.0), BmiCategory::ObesityTypeII);
        assert_eq!(classify_bmi(39.999), BmiCategory::ObesityTypeII);
        assert_eq!(classify_bmi(40.0), BmiCategory::ObesityTypeIII);
        assert_eq!(classify_bmi(120.0), BmiCategory::ObesityTypeIII);
        assert_eq!(classify_bmi(-1.0), BmiCategory::Underweight);
    }

    #[test]
    fn labels_and_buckets() {
        assert_eq!(classify_bmi(18.5).label(), "Peso normal");
        assert_eq!(classify_bmi(39.999).label(), "Obesidade Tipo II");
        assert_eq!(classify_bmi(40.0).label(), "Obesidade Tipo III");
        let buckets: Vec<u8> = BmiCategory::ALL.iter().map(|c| c.bucket()).collect();
        assert_eq!(buckets, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn reference_patients() {
        let bmi = calculate_bmi(70.0, 1.70);
        assert!((bmi - 24.22).abs() < 0.01);
        assert_eq!(classify_bmi(bmi), BmiCategory::Normal);
        assert_eq!(classify_bmi(bmi).bucket(), 2);

        let bmi = calculate_bmi(100.0, 1.60);
        assert!((bmi - 39.06).abs() < 0.01);
        assert_eq!(classify_bmi(bmi), BmiCategory::ObesityTypeII);
        assert_eq!(classify_bmi(bmi).bucket(), 5);
    }
}
