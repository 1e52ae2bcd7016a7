//! The SMT-LIB backend: [`Term`] and [`Sort`] as native handles.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use smtwrap_api::{ApiError, ApiResult, Backend, FloatingPointRoundingMode, FormulaType, Value};
use smtwrap_smtlib::typing::infer_sort;
use smtwrap_smtlib::{Command, Evaluator, RoundingMode, Sort, Term, Val};

/// Largest format whose values convert to `f64` without rounding.
const F64_EXPONENT_BITS: u32 = 11;
const F64_MANTISSA_BITS: u32 = 52;

/// Native side of an SMT-LIB session.
///
/// Variables are free constants; the declared symbols are kept here so that
/// a prover can emit their `declare-const` commands and sort inference can
/// resolve them.
#[derive(Debug, Default)]
pub struct SmtlibBackend {
    symbols: RefCell<BTreeMap<String, Sort>>,
}

impl SmtlibBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// `declare-const` for every variable created so far.
    pub fn declarations(&self) -> Vec<Command> {
        self.symbols
            .borrow()
            .iter()
            .map(|(name, sort)| Command::DeclareConst(name.clone(), sort.clone()))
            .collect()
    }

    pub fn declared_names(&self) -> BTreeSet<String> {
        self.symbols.borrow().keys().cloned().collect()
    }
}

pub(crate) fn native_rounding_mode(rm: FloatingPointRoundingMode) -> RoundingMode {
    match rm {
        FloatingPointRoundingMode::NearestTiesToEven => RoundingMode::Rne,
        FloatingPointRoundingMode::NearestTiesAway => RoundingMode::Rna,
        FloatingPointRoundingMode::TowardPositive => RoundingMode::Rtp,
        FloatingPointRoundingMode::TowardNegative => RoundingMode::Rtn,
        FloatingPointRoundingMode::TowardZero => RoundingMode::Rtz,
    }
}

pub(crate) fn api_rounding_mode(rm: RoundingMode) -> FloatingPointRoundingMode {
    match rm {
        RoundingMode::Rne => FloatingPointRoundingMode::NearestTiesToEven,
        RoundingMode::Rna => FloatingPointRoundingMode::NearestTiesAway,
        RoundingMode::Rtp => FloatingPointRoundingMode::TowardPositive,
        RoundingMode::Rtn => FloatingPointRoundingMode::TowardNegative,
        RoundingMode::Rtz => FloatingPointRoundingMode::TowardZero,
    }
}

impl Backend for SmtlibBackend {
    type Term = Term;
    type Sort = Sort;

    fn name(&self) -> &'static str {
        "smtlib"
    }

    fn native_sort(&self, ty: &FormulaType) -> ApiResult<Sort> {
        Ok(match ty {
            FormulaType::Boolean => Sort::Bool,
            FormulaType::Integer => Sort::Int,
            FormulaType::Rational => Sort::Real,
            FormulaType::Bitvector(bv) => Sort::BitVec(bv.size()),
            // SMT-LIB counts the hidden bit in the significand
            FormulaType::FloatingPoint(fp) => {
                Sort::Float(fp.exponent_size(), fp.mantissa_size() + 1)
            }
            FormulaType::FloatingPointRoundingMode => Sort::RoundingMode,
            FormulaType::Array(array) => Sort::array(
                self.native_sort(array.index_type())?,
                self.native_sort(array.element_type())?,
            ),
            FormulaType::String => Sort::String,
            FormulaType::Regex => Sort::RegLan,
        })
    }

    fn formula_type(&self, sort: &Sort) -> ApiResult<FormulaType> {
        Ok(match sort {
            Sort::Bool => FormulaType::Boolean,
            Sort::Int => FormulaType::Integer,
            Sort::Real => FormulaType::Rational,
            Sort::BitVec(size) => FormulaType::try_bitvector(*size)?,
            Sort::Float(e, s) => FormulaType::try_floating_point(*e, s.saturating_sub(1))?,
            Sort::RoundingMode => FormulaType::FloatingPointRoundingMode,
            Sort::Array(index, element) => {
                FormulaType::array(self.formula_type(index)?, self.formula_type(element)?)
            }
            Sort::String => FormulaType::String,
            Sort::RegLan => FormulaType::Regex,
            Sort::Uninterpreted(name) => {
                return Err(ApiError::Backend(format!(
                    "uninterpreted sort '{name}' has no formula type"
                )));
            }
        })
    }

    fn sort_of(&self, term: &Term) -> ApiResult<Sort> {
        infer_sort(term, &*self.symbols.borrow()).map_err(|e| ApiError::Backend(e.to_string()))
    }

    fn make_variable(&self, sort: &Sort, name: &str) -> ApiResult<Term> {
        let mut symbols = self.symbols.borrow_mut();
        match symbols.get(name) {
            Some(existing) if existing != sort => {
                return Err(ApiError::Backend(format!(
                    "symbol '{name}' is already declared with sort {existing}, not {sort}"
                )));
            }
            Some(_) => {}
            None => {
                symbols.insert(name.to_string(), sort.clone());
            }
        }
        Ok(Term::constant(name))
    }

    fn convert_value(&self, original: &FormulaType, evaluated: &Term) -> Option<Value> {
        let value = Evaluator::default().evaluate(evaluated)?;
        match (original, value) {
            (FormulaType::Boolean, Val::Bool(b)) => Some(Value::Boolean(b)),
            (FormulaType::Integer, Val::Int(n)) => Some(Value::Integer(n)),
            (FormulaType::Integer, Val::Real(r)) if r.is_integer() => {
                Some(Value::Integer(r.to_integer()))
            }
            (FormulaType::Rational, Val::Real(r)) => Some(Value::Rational(r)),
            (FormulaType::Rational, Val::Int(n)) => {
                Some(Value::Rational(num_rational::BigRational::from_integer(n)))
            }
            (FormulaType::Bitvector(_), Val::Bv { value, .. }) => Some(Value::Integer(value)),
            (FormulaType::FloatingPoint(ty), Val::Float(x, _)) => {
                let fits_f64 = ty.exponent_size() <= F64_EXPONENT_BITS
                    && ty.mantissa_size() <= F64_MANTISSA_BITS;
                match x.to_rational() {
                    Some(exact) if !fits_f64 && !x.is_zero() => Some(Value::Rational(exact)),
                    _ => Some(Value::Float(x.to_f64())),
                }
            }
            (FormulaType::FloatingPointRoundingMode, Val::Rm(rm)) => {
                Some(Value::RoundingMode(api_rounding_mode(rm)))
            }
            (FormulaType::String, Val::Str(chars)) => Some(Value::String(chars.into_iter().collect())),
            _ => None,
        }
    }
}
