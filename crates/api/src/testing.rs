//! A string-backed backend for unit tests: terms are SMT-LIB-ish text.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::creator::Backend;
use crate::error::{ApiError, ApiResult};
use crate::formula_type::{FloatingPointType, FormulaType};
use crate::manager::{
    ArrayPrimitives, BitvectorPrimitives, BooleanPrimitives, FloatingPointPrimitives,
    NumeralPrimitives, StringPrimitives,
};
use crate::model::{ModelPrimitives, RawAssignment};
use crate::rounding_mode::FloatingPointRoundingMode;
use crate::value::Value;

fn sexp(op: &str, args: &[&String]) -> ApiResult<String> {
    let mut out = format!("({op}");
    for arg in args {
        out.push(' ');
        out.push_str(arg);
    }
    out.push(')');
    Ok(out)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn is_literal(term: &str) -> bool {
    term == "true"
        || term == "false"
        || term.starts_with('"')
        || term.starts_with("#b")
        || term.parse::<BigInt>().is_ok()
        || term.parse::<BigRational>().is_ok()
}

#[derive(Debug, Default)]
pub struct TextBackend {
    declared: RefCell<BTreeMap<String, FormulaType>>,
}

impl TextBackend {
    pub fn declared(&self) -> BTreeMap<String, FormulaType> {
        self.declared.borrow().clone()
    }
}

impl Backend for TextBackend {
    type Term = String;
    type Sort = FormulaType;

    fn name(&self) -> &'static str {
        "text"
    }

    fn native_sort(&self, ty: &FormulaType) -> ApiResult<FormulaType> {
        Ok(ty.clone())
    }

    fn formula_type(&self, sort: &FormulaType) -> ApiResult<FormulaType> {
        Ok(sort.clone())
    }

    fn sort_of(&self, term: &String) -> ApiResult<FormulaType> {
        if let Some(ty) = self.declared.borrow().get(term) {
            return Ok(ty.clone());
        }
        if term == "true" || term == "false" {
            Ok(FormulaType::Boolean)
        } else if term.starts_with('"') {
            Ok(FormulaType::String)
        } else if let Some(bits) = term.strip_prefix("#b") {
            Ok(FormulaType::bitvector(bits.len() as u32))
        } else if term.parse::<BigInt>().is_ok() {
            Ok(FormulaType::Integer)
        } else {
            Err(ApiError::Backend(format!("cannot infer the sort of {term}")))
        }
    }

    fn make_variable(&self, sort: &FormulaType, name: &str) -> ApiResult<String> {
        let mut declared = self.declared.borrow_mut();
        match declared.get(name) {
            Some(existing) if existing != sort => Err(ApiError::Backend(format!(
                "{name} already declared with sort {existing}"
            ))),
            _ => {
                declared.insert(name.to_string(), sort.clone());
                Ok(name.to_string())
            }
        }
    }

    fn convert_value(&self, original: &FormulaType, evaluated: &String) -> Option<Value> {
        match original {
            FormulaType::Boolean => match evaluated.as_str() {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            FormulaType::Integer => evaluated.parse().ok().map(Value::Integer),
            FormulaType::Rational => evaluated.parse().ok().map(Value::Rational),
            FormulaType::Bitvector(_) => {
                let bits = evaluated.strip_prefix("#b")?;
                BigInt::parse_bytes(bits.as_bytes(), 2).map(Value::Integer)
            }
            FormulaType::String => {
                let inner = evaluated.strip_prefix('"')?.strip_suffix('"')?;
                Some(Value::String(inner.replace("\"\"", "\"")))
            }
            _ => None,
        }
    }
}

fn rm_name(rm: FloatingPointRoundingMode) -> &'static str {
    match rm {
        FloatingPointRoundingMode::NearestTiesToEven => "RNE",
        FloatingPointRoundingMode::NearestTiesAway => "RNA",
        FloatingPointRoundingMode::TowardPositive => "RTP",
        FloatingPointRoundingMode::TowardNegative => "RTN",
        FloatingPointRoundingMode::TowardZero => "RTZ",
    }
}

fn fp_indices(ty: &FloatingPointType) -> String {
    format!("{} {}", ty.exponent_size(), ty.mantissa_size() + 1)
}

/// Boolean, bitvector, floating-point, array and string theories as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTheory;

impl BooleanPrimitives for TextTheory {
    type Term = String;

    fn make_boolean(&self, value: bool) -> ApiResult<String> {
        Ok(value.to_string())
    }
    fn not(&self, operand: &String) -> ApiResult<String> {
        sexp("not", &[operand])
    }
    fn and(&self, operands: &[&String]) -> ApiResult<String> {
        if operands.is_empty() {
            return Ok("true".into());
        }
        sexp("and", operands)
    }
    fn or(&self, operands: &[&String]) -> ApiResult<String> {
        if operands.is_empty() {
            return Ok("false".into());
        }
        sexp("or", operands)
    }
    fn xor(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("xor", &[lhs, rhs])
    }
    fn implication(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("=>", &[lhs, rhs])
    }
    fn equivalence(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("=", &[lhs, rhs])
    }
    fn if_then_else(&self, c: &String, t: &String, e: &String) -> ApiResult<String> {
        sexp("ite", &[c, t, e])
    }
    fn is_true(&self, term: &String) -> bool {
        term == "true"
    }
    fn is_false(&self, term: &String) -> bool {
        term == "false"
    }
}

impl BitvectorPrimitives for TextTheory {
    type Term = String;

    fn make_bitvector(&self, width: u32, value: &BigInt) -> ApiResult<String> {
        Ok(format!("#b{:0>width$}", value.to_str_radix(2), width = width as usize))
    }
    fn negate(&self, operand: &String) -> ApiResult<String> {
        sexp("bvneg", &[operand])
    }
    fn add(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("bvadd", &[lhs, rhs])
    }
    fn subtract(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("bvsub", &[lhs, rhs])
    }
    fn multiply(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("bvmul", &[lhs, rhs])
    }
    fn divide(&self, lhs: &String, rhs: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvsdiv" } else { "bvudiv" }, &[lhs, rhs])
    }
    fn modulo(&self, lhs: &String, rhs: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvsrem" } else { "bvurem" }, &[lhs, rhs])
    }
    fn not(&self, operand: &String) -> ApiResult<String> {
        sexp("bvnot", &[operand])
    }
    fn and(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("bvand", &[lhs, rhs])
    }
    fn or(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("bvor", &[lhs, rhs])
    }
    fn xor(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("bvxor", &[lhs, rhs])
    }
    fn shift_left(&self, operand: &String, amount: &String) -> ApiResult<String> {
        sexp("bvshl", &[operand, amount])
    }
    fn shift_right(&self, operand: &String, amount: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvashr" } else { "bvlshr" }, &[operand, amount])
    }
    fn concat(&self, high: &String, low: &String) -> ApiResult<String> {
        sexp("concat", &[high, low])
    }
    fn extract(&self, operand: &String, msb: u32, lsb: u32) -> ApiResult<String> {
        sexp(&format!("(_ extract {msb} {lsb})"), &[operand])
    }
    fn extend(&self, operand: &String, extension: u32, signed: bool) -> ApiResult<String> {
        let op = if signed { "sign_extend" } else { "zero_extend" };
        sexp(&format!("(_ {op} {extension})"), &[operand])
    }
    fn equal(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("=", &[lhs, rhs])
    }
    fn less_than(&self, lhs: &String, rhs: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvslt" } else { "bvult" }, &[lhs, rhs])
    }
    fn less_or_equals(&self, lhs: &String, rhs: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvsle" } else { "bvule" }, &[lhs, rhs])
    }
    fn greater_than(&self, lhs: &String, rhs: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvsgt" } else { "bvugt" }, &[lhs, rhs])
    }
    fn greater_or_equals(&self, lhs: &String, rhs: &String, signed: bool) -> ApiResult<String> {
        sexp(if signed { "bvsge" } else { "bvuge" }, &[lhs, rhs])
    }
}

impl FloatingPointPrimitives for TextTheory {
    type Term = String;

    fn make_number(
        &self,
        value: &BigRational,
        ty: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        Ok(format!("((_ to_fp {}) {} {value})", fp_indices(ty), rm_name(rm)))
    }
    fn make_zero(&self, negative: bool, ty: &FloatingPointType) -> ApiResult<String> {
        let sign = if negative { '-' } else { '+' };
        Ok(format!("(_ {sign}zero {})", fp_indices(ty)))
    }
    fn make_nan(&self, ty: &FloatingPointType) -> ApiResult<String> {
        Ok(format!("(_ NaN {})", fp_indices(ty)))
    }
    fn make_plus_infinity(&self, ty: &FloatingPointType) -> ApiResult<String> {
        Ok(format!("(_ +oo {})", fp_indices(ty)))
    }
    fn make_minus_infinity(&self, ty: &FloatingPointType) -> ApiResult<String> {
        Ok(format!("(_ -oo {})", fp_indices(ty)))
    }
    fn make_rounding_mode(&self, rm: FloatingPointRoundingMode) -> ApiResult<String> {
        Ok(rm_name(rm).to_string())
    }
    fn negate(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.neg", &[operand])
    }
    fn abs(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.abs", &[operand])
    }
    fn add(&self, lhs: &String, rhs: &String, rm: FloatingPointRoundingMode) -> ApiResult<String> {
        sexp(&format!("fp.add {}", rm_name(rm)), &[lhs, rhs])
    }
    fn subtract(
        &self,
        lhs: &String,
        rhs: &String,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        sexp(&format!("fp.sub {}", rm_name(rm)), &[lhs, rhs])
    }
    fn multiply(
        &self,
        lhs: &String,
        rhs: &String,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        sexp(&format!("fp.mul {}", rm_name(rm)), &[lhs, rhs])
    }
    fn divide(
        &self,
        lhs: &String,
        rhs: &String,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        sexp(&format!("fp.div {}", rm_name(rm)), &[lhs, rhs])
    }
    fn sqrt(&self, operand: &String, rm: FloatingPointRoundingMode) -> ApiResult<String> {
        sexp(&format!("fp.sqrt {}", rm_name(rm)), &[operand])
    }
    fn round(&self, operand: &String, rm: FloatingPointRoundingMode) -> ApiResult<String> {
        sexp(&format!("fp.roundToIntegral {}", rm_name(rm)), &[operand])
    }
    fn is_nan(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.isNaN", &[operand])
    }
    fn is_infinity(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.isInfinite", &[operand])
    }
    fn is_zero(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.isZero", &[operand])
    }
    fn is_normal(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.isNormal", &[operand])
    }
    fn is_subnormal(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.isSubnormal", &[operand])
    }
    fn is_negative(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.isNegative", &[operand])
    }
    fn equal_with_fp_semantics(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("fp.eq", &[lhs, rhs])
    }
    fn assignment(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("=", &[lhs, rhs])
    }
    fn greater_than(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("fp.gt", &[lhs, rhs])
    }
    fn greater_or_equals(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("fp.geq", &[lhs, rhs])
    }
    fn less_than(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("fp.lt", &[lhs, rhs])
    }
    fn less_or_equals(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("fp.leq", &[lhs, rhs])
    }
    fn cast_to_floating_point(
        &self,
        operand: &String,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        Ok(format!("((_ to_fp {}) {} {operand})", fp_indices(target), rm_name(rm)))
    }
    fn cast_to_bitvector(
        &self,
        operand: &String,
        width: u32,
        signed: bool,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        let op = if signed { "fp.to_sbv" } else { "fp.to_ubv" };
        Ok(format!("((_ {op} {width}) {} {operand})", rm_name(rm)))
    }
    fn cast_to_rational(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.to_real", &[operand])
    }
    fn cast_from_bitvector(
        &self,
        operand: &String,
        signed: bool,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        let op = if signed { "to_fp" } else { "to_fp_unsigned" };
        Ok(format!("((_ {op} {}) {} {operand})", fp_indices(target), rm_name(rm)))
    }
    fn cast_from_rational(
        &self,
        operand: &String,
        source: &FormulaType,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<String> {
        let real = if source.is_integer() {
            sexp("to_real", &[operand])?
        } else {
            operand.clone()
        };
        Ok(format!("((_ to_fp {}) {} {real})", fp_indices(target), rm_name(rm)))
    }
    fn to_ieee_bitvector(&self, operand: &String) -> ApiResult<String> {
        sexp("fp.to_ieee_bv", &[operand])
    }
    fn from_ieee_bitvector(&self, operand: &String, target: &FloatingPointType) -> ApiResult<String> {
        Ok(format!("((_ to_fp {}) {operand})", fp_indices(target)))
    }
}

impl ArrayPrimitives for TextTheory {
    type Term = String;

    fn select(&self, array: &String, index: &String) -> ApiResult<String> {
        sexp("select", &[array, index])
    }
    fn store(&self, array: &String, index: &String, value: &String) -> ApiResult<String> {
        sexp("store", &[array, index, value])
    }
    fn equivalence(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("=", &[lhs, rhs])
    }
}

impl StringPrimitives for TextTheory {
    type Term = String;

    fn make_string(&self, value: &str) -> ApiResult<String> {
        Ok(quote(value))
    }
    fn concat(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("str.++", &[lhs, rhs])
    }
    fn substring(&self, text: &String, start: &String, length: &String) -> ApiResult<String> {
        sexp("str.substr", &[text, start, length])
    }
    fn replace(&self, text: &String, pattern: &String, replacement: &String) -> ApiResult<String> {
        sexp("str.replace", &[text, pattern, replacement])
    }
    fn char_at(&self, text: &String, index: &String) -> ApiResult<String> {
        sexp("str.at", &[text, index])
    }
    fn length(&self, text: &String) -> ApiResult<String> {
        sexp("str.len", &[text])
    }
    fn index_of(&self, text: &String, pattern: &String, start: &String) -> ApiResult<String> {
        sexp("str.indexof", &[text, pattern, start])
    }
    fn equal(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("=", &[lhs, rhs])
    }
    fn contains(&self, text: &String, pattern: &String) -> ApiResult<String> {
        sexp("str.contains", &[text, pattern])
    }
    fn starts_with(&self, text: &String, prefix: &String) -> ApiResult<String> {
        sexp("str.prefixof", &[prefix, text])
    }
    fn ends_with(&self, text: &String, suffix: &String) -> ApiResult<String> {
        sexp("str.suffixof", &[suffix, text])
    }
    fn regex_in(&self, text: &String, regex: &String) -> ApiResult<String> {
        sexp("str.in_re", &[text, regex])
    }
    fn make_regex(&self, value: &str) -> ApiResult<String> {
        sexp("str.to_re", &[&quote(value)])
    }
    fn regex_star(&self, regex: &String) -> ApiResult<String> {
        sexp("re.*", &[regex])
    }
    fn regex_plus(&self, regex: &String) -> ApiResult<String> {
        sexp("re.+", &[regex])
    }
    fn regex_optional(&self, regex: &String) -> ApiResult<String> {
        sexp("re.opt", &[regex])
    }
    fn regex_concat(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("re.++", &[lhs, rhs])
    }
    fn regex_union(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
        sexp("re.union", &[lhs, rhs])
    }
    fn regex_complement(&self, regex: &String) -> ApiResult<String> {
        sexp("re.comp", &[regex])
    }
    fn regex_range(&self, start: char, end: char) -> ApiResult<String> {
        sexp(
            "re.range",
            &[&quote(&start.to_string()), &quote(&end.to_string())],
        )
    }
    fn regex_none(&self) -> ApiResult<String> {
        Ok("re.none".into())
    }
    fn regex_all(&self) -> ApiResult<String> {
        Ok("re.all".into())
    }
    fn regex_all_char(&self) -> ApiResult<String> {
        Ok("re.allchar".into())
    }
}

fn numeral_literal(value: &BigRational) -> String {
    let magnitude = value.abs();
    let text = if magnitude.is_integer() {
        magnitude.numer().to_string()
    } else {
        format!("(/ {} {})", magnitude.numer(), magnitude.denom())
    };
    if value.is_negative() {
        format!("(- {text})")
    } else {
        text
    }
}

macro_rules! text_numeral_theory {
    ($name:ident, $divide:literal $(, $modulo:literal)?) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl NumeralPrimitives for $name {
            type Term = String;

            fn make_number(&self, value: &BigRational) -> ApiResult<String> {
                Ok(numeral_literal(value))
            }
            fn negate(&self, operand: &String) -> ApiResult<String> {
                sexp("-", &[operand])
            }
            fn add(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp("+", &[lhs, rhs])
            }
            fn sum(&self, operands: &[&String]) -> ApiResult<String> {
                if operands.is_empty() {
                    return Ok(numeral_literal(&BigRational::zero()));
                }
                sexp("+", operands)
            }
            fn subtract(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp("-", &[lhs, rhs])
            }
            fn multiply(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp("*", &[lhs, rhs])
            }
            fn divide(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp($divide, &[lhs, rhs])
            }
            $(
            fn modulo(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp($modulo, &[lhs, rhs])
            }
            )?
            fn equal(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp("=", &[lhs, rhs])
            }
            fn distinct(&self, operands: &[&String]) -> ApiResult<String> {
                sexp("distinct", operands)
            }
            fn greater_than(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp(">", &[lhs, rhs])
            }
            fn greater_or_equals(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp(">=", &[lhs, rhs])
            }
            fn less_than(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp("<", &[lhs, rhs])
            }
            fn less_or_equals(&self, lhs: &String, rhs: &String) -> ApiResult<String> {
                sexp("<=", &[lhs, rhs])
            }
        }
    };
}

text_numeral_theory!(TextIntegerTheory, "div", "mod");
text_numeral_theory!(TextRationalTheory, "/");

/// Model over fixed `name = value` text pairs.
#[derive(Debug)]
pub struct TextModel {
    assignments: Vec<(String, String)>,
    releases: Rc<Cell<u32>>,
}

impl TextModel {
    pub fn new(pairs: &[(&str, &str)], releases: Rc<Cell<u32>>) -> Self {
        Self {
            assignments: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            releases,
        }
    }
}

impl ModelPrimitives for TextModel {
    type Term = String;

    fn eval_impl(&self, term: &String) -> Option<String> {
        if let Some((_, value)) = self.assignments.iter().find(|(name, _)| name == term) {
            return Some(value.clone());
        }
        is_literal(term).then(|| term.clone())
    }

    fn to_list(&self) -> ApiResult<Vec<RawAssignment<String>>> {
        Ok(self
            .assignments
            .iter()
            .map(|(name, value)| RawAssignment {
                key: name.clone(),
                value: value.clone(),
                name: name.clone(),
                arguments: Vec::new(),
            })
            .collect())
    }

    fn equality(&self, key: &String, value: &String) -> ApiResult<String> {
        sexp("=", &[key, value])
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}
