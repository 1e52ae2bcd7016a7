use std::fmt;

/// IEEE-754 rounding modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatingPointRoundingMode {
    #[default]
    NearestTiesToEven,
    NearestTiesAway,
    TowardPositive,
    TowardNegative,
    TowardZero,
}

impl FloatingPointRoundingMode {
    pub const ALL: [FloatingPointRoundingMode; 5] = [
        FloatingPointRoundingMode::NearestTiesToEven,
        FloatingPointRoundingMode::NearestTiesAway,
        FloatingPointRoundingMode::TowardPositive,
        FloatingPointRoundingMode::TowardNegative,
        FloatingPointRoundingMode::TowardZero,
    ];
}

impl fmt::Display for FloatingPointRoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FloatingPointRoundingMode::NearestTiesToEven => "NEAREST_TIES_TO_EVEN",
            FloatingPointRoundingMode::NearestTiesAway => "NEAREST_TIES_AWAY",
            FloatingPointRoundingMode::TowardPositive => "TOWARD_POSITIVE",
            FloatingPointRoundingMode::TowardNegative => "TOWARD_NEGATIVE",
            FloatingPointRoundingMode::TowardZero => "TOWARD_ZERO",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ties_to_even() {
        assert_eq!(
            FloatingPointRoundingMode::default(),
            FloatingPointRoundingMode::NearestTiesToEven
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(
            FloatingPointRoundingMode::TowardZero.to_string(),
            "TOWARD_ZERO"
        );
        assert_eq!(FloatingPointRoundingMode::ALL.len(), 5);
    }
}
