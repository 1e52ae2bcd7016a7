use std::fmt;
use std::str::FromStr;

/// SMT-LIB sort (type) representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Boolean sort
    Bool,
    /// Mathematical integer sort
    Int,
    /// Real number sort
    Real,
    /// Fixed-width bitvector: `(_ BitVec n)`
    BitVec(u32),
    /// Array sort: `(Array index_sort element_sort)`
    Array(Box<Sort>, Box<Sort>),
    /// IEEE 754 floating-point: `(_ FloatingPoint eb sb)`, `sb` counting the
    /// hidden bit
    Float(u32, u32),
    /// Unicode strings
    String,
    /// Regular languages over strings
    RegLan,
    /// IEEE 754 rounding modes
    RoundingMode,
    /// Uninterpreted sort
    Uninterpreted(String),
}

impl Sort {
    pub fn array(index: Sort, element: Sort) -> Self {
        Sort::Array(Box::new(index), Box::new(element))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int | Sort::Real)
    }
}

/// IEEE 754 rounding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Round to nearest, ties to even
    #[default]
    Rne,
    /// Round to nearest, ties away from zero
    Rna,
    /// Round toward positive infinity
    Rtp,
    /// Round toward negative infinity
    Rtn,
    /// Round toward zero
    Rtz,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 5] = [
        RoundingMode::Rne,
        RoundingMode::Rna,
        RoundingMode::Rtp,
        RoundingMode::Rtn,
        RoundingMode::Rtz,
    ];

    /// Short SMT-LIB name (`RNE`, ...).
    pub fn short_name(self) -> &'static str {
        match self {
            RoundingMode::Rne => "RNE",
            RoundingMode::Rna => "RNA",
            RoundingMode::Rtp => "RTP",
            RoundingMode::Rtn => "RTN",
            RoundingMode::Rtz => "RTZ",
        }
    }

    /// Long SMT-LIB name (`roundNearestTiesToEven`, ...).
    pub fn long_name(self) -> &'static str {
        match self {
            RoundingMode::Rne => "roundNearestTiesToEven",
            RoundingMode::Rna => "roundNearestTiesToAway",
            RoundingMode::Rtp => "roundTowardPositive",
            RoundingMode::Rtn => "roundTowardNegative",
            RoundingMode::Rtz => "roundTowardZero",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    /// Accepts both the short and the long SMT-LIB names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoundingMode::ALL
            .into_iter()
            .find(|rm| rm.short_name() == s || rm.long_name() == s)
            .ok_or_else(|| format!("unknown rounding mode: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_mode_names_round_trip() {
        for rm in RoundingMode::ALL {
            assert_eq!(rm.short_name().parse::<RoundingMode>(), Ok(rm));
            assert_eq!(rm.long_name().parse::<RoundingMode>(), Ok(rm));
        }
        assert!("RNX".parse::<RoundingMode>().is_err());
    }

    #[test]
    fn numeric_sorts() {
        assert!(Sort::Int.is_numeric());
        assert!(Sort::Real.is_numeric());
        assert!(!Sort::BitVec(8).is_numeric());
    }
}
