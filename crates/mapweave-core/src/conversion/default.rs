//! Reference conversion service for the scalar field types
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::{ConversionConcern, ConversionError, ConversionService, ConverterInfo};
use crate::types::{FieldType, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static GLOBAL_CONVERSIONS: OnceLock<Arc<DefaultConversionService>> = OnceLock::new();

/// Table-driven conversions between every pair of scalar types
#[derive(Debug, Clone)]
pub struct DefaultConversionService {
    converters: HashMap<(FieldType, FieldType), ConverterInfo>,
}

impl DefaultConversionService {
    /// Build the converter table
    pub fn new() -> Self {
        let mut converters = HashMap::new();
        for from in FieldType::SCALARS {
            for to in FieldType::SCALARS {
                if from == to {
                    continue;
                }
                converters.insert(
                    (from, to),
                    ConverterInfo {
                        from,
                        to,
                        concerns: concerns_for(from, to),
                    },
                );
            }
        }
        Self { converters }
    }

    /// Process-wide instance, built at most once
    pub fn global() -> Arc<DefaultConversionService> {
        GLOBAL_CONVERSIONS
            .get_or_init(|| Arc::new(DefaultConversionService::new()))
            .clone()
    }

    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }
}

impl Default for DefaultConversionService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionService for DefaultConversionService {
    /// The runtime type of `value` selects the converter; `from` is the declared
    /// type and only used for reporting.
    fn convert(&self, value: &Value, from: FieldType, to: FieldType) -> Result<Value, ConversionError> {
        let actual = value.field_type();
        if to == FieldType::All || actual == to {
            return Ok(value.clone());
        }

        if !self.converters.contains_key(&(actual, to)) {
            let from = if from == FieldType::All || from == FieldType::None {
                actual
            } else {
                from
            };
            return Err(ConversionError::NoConverter { from, to });
        }

        match to {
            FieldType::String => Ok(Value::String(value.to_string())),
            FieldType::Boolean => to_boolean(value),
            FieldType::Byte | FieldType::Short | FieldType::Integer | FieldType::Long => {
                to_integral(value, to)
            }
            FieldType::Float | FieldType::Double => to_floating(value, to),
            FieldType::Char => to_char(value),
            FieldType::ByteArray => match value {
                Value::String(s) => Ok(Value::ByteArray(s.as_bytes().to_vec())),
                other => Err(ConversionError::failed(other, to, "unsupported conversion")),
            },
            other => Err(ConversionError::NoConverter { from: actual, to: other }),
        }
    }

    fn find_converter(&self, from: FieldType, to: FieldType) -> Option<ConverterInfo> {
        self.converters.get(&(from, to)).cloned()
    }
}

fn integral_rank(field_type: FieldType) -> u8 {
    match field_type {
        FieldType::Byte => 0,
        FieldType::Short => 1,
        FieldType::Integer => 2,
        _ => 3,
    }
}

/// Declared concerns of converting `from` into `to`
fn concerns_for(from: FieldType, to: FieldType) -> Vec<ConversionConcern> {
    use ConversionConcern as C;
    use FieldType as T;

    match (from, to) {
        (T::ByteArray, T::String) => vec![C::Format],
        (T::String, T::ByteArray) => vec![C::None],
        (T::ByteArray, _) | (_, T::ByteArray) => vec![C::Unsupported],
        (_, T::String) => vec![C::None],
        (T::String, T::Boolean) => vec![C::Format],
        (T::String, T::Char) => vec![C::Range],
        (T::String, t) if t.is_integral() => vec![C::Format, C::Range],
        (T::String, _) => vec![C::Format],
        (T::Boolean, _) => vec![C::None],
        (_, T::Boolean) => vec![C::Format],
        (T::Char, T::Integer | T::Long | T::Float | T::Double) => vec![C::None],
        (T::Char, _) | (_, T::Char) => vec![C::Range],
        (f, t) if f.is_integral() && t.is_integral() => {
            if integral_rank(f) <= integral_rank(t) {
                vec![C::None]
            } else {
                vec![C::Range]
            }
        }
        (f, t) if f.is_floating() && t.is_integral() => vec![C::Range],
        (T::Double, T::Float) => vec![C::Range],
        _ => vec![C::None],
    }
}

fn to_boolean(value: &Value) -> Result<Value, ConversionError> {
    let result = match value {
        Value::Boolean(b) => *b,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" | "t" | "y" => true,
            "false" | "no" | "0" | "off" | "f" | "n" => false,
            _ => {
                return Err(ConversionError::failed(
                    value,
                    FieldType::Boolean,
                    "not a recognized boolean literal",
                ))
            }
        },
        Value::Char(c) => match c.to_ascii_lowercase() {
            't' | 'y' | '1' => true,
            'f' | 'n' | '0' => false,
            _ => {
                return Err(ConversionError::failed(
                    value,
                    FieldType::Boolean,
                    "not a recognized boolean character",
                ))
            }
        },
        Value::Float(v) => *v != 0.0,
        Value::Double(v) => *v != 0.0,
        other => match other.as_i64() {
            Some(v) => v != 0,
            None => {
                return Err(ConversionError::failed(
                    other,
                    FieldType::Boolean,
                    "unsupported conversion",
                ))
            }
        },
    };
    Ok(Value::Boolean(result))
}

fn to_integral(value: &Value, to: FieldType) -> Result<Value, ConversionError> {
    let wide = match value {
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<i64>() {
                Ok(v) => v,
                Err(_) => match trimmed.parse::<f64>() {
                    Ok(f) => truncate(value, f, to)?,
                    Err(_) => return Err(ConversionError::failed(value, to, "not a number")),
                },
            }
        }
        Value::Float(_) | Value::Double(_) => {
            let f = value.as_f64().unwrap_or(f64::NAN);
            truncate(value, f, to)?
        }
        other => other
            .as_i64()
            .ok_or_else(|| ConversionError::failed(other, to, "unsupported conversion"))?,
    };

    let out_of_range = || ConversionError::failed(value, to, "value out of range");
    Ok(match to {
        FieldType::Byte => Value::Byte(i8::try_from(wide).map_err(|_| out_of_range())?),
        FieldType::Short => Value::Short(i16::try_from(wide).map_err(|_| out_of_range())?),
        FieldType::Integer => Value::Integer(i32::try_from(wide).map_err(|_| out_of_range())?),
        _ => Value::Long(wide),
    })
}

fn truncate(value: &Value, f: f64, to: FieldType) -> Result<i64, ConversionError> {
    if !f.is_finite() || f.trunc() < i64::MIN as f64 || f.trunc() > i64::MAX as f64 {
        return Err(ConversionError::failed(value, to, "value out of range"));
    }
    Ok(f.trunc() as i64)
}

fn to_floating(value: &Value, to: FieldType) -> Result<Value, ConversionError> {
    let wide = match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ConversionError::failed(value, to, "not a number"))?,
        other => other
            .as_f64()
            .ok_or_else(|| ConversionError::failed(other, to, "unsupported conversion"))?,
    };

    if to == FieldType::Float {
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(ConversionError::failed(value, to, "value out of range"));
        }
        return Ok(Value::Float(wide as f32));
    }
    Ok(Value::Double(wide))
}

fn to_char(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::String(s) => s
            .chars()
            .next()
            .map(Value::Char)
            .ok_or_else(|| ConversionError::failed(value, FieldType::Char, "empty string")),
        Value::Boolean(b) => Ok(Value::Char(if *b { 'T' } else { 'F' })),
        Value::Float(_) | Value::Double(_) => {
            let code = truncate(value, value.as_f64().unwrap_or(f64::NAN), FieldType::Char)?;
            code_point(value, code)
        }
        other => match other.as_i64() {
            Some(code) => code_point(other, code),
            None => Err(ConversionError::failed(other, FieldType::Char, "unsupported conversion")),
        },
    }
}

fn code_point(value: &Value, code: i64) -> Result<Value, ConversionError> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Char)
        .ok_or_else(|| ConversionError::failed(value, FieldType::Char, "not a valid character code"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> DefaultConversionService {
        DefaultConversionService::new()
    }

    #[test]
    fn test_every_scalar_pair_has_a_converter() {
        let n = FieldType::SCALARS.len();
        assert_eq!(service().converter_count(), n * (n - 1));
        assert!(service().find_converter(FieldType::Complex, FieldType::String).is_none());
        assert!(service().find_converter(FieldType::String, FieldType::String).is_none());
    }

    #[test]
    fn test_concerns() {
        let s = service();
        let concerns = |from, to| s.find_converter(from, to).unwrap().concerns;
        assert_eq!(concerns(FieldType::Integer, FieldType::Long), vec![ConversionConcern::None]);
        assert_eq!(concerns(FieldType::Long, FieldType::Short), vec![ConversionConcern::Range]);
        assert_eq!(concerns(FieldType::String, FieldType::Double), vec![ConversionConcern::Format]);
        assert_eq!(concerns(FieldType::Double, FieldType::Integer), vec![ConversionConcern::Range]);
        assert_eq!(
            concerns(FieldType::ByteArray, FieldType::Integer),
            vec![ConversionConcern::Unsupported]
        );
    }

    #[test]
    fn test_string_to_numbers() {
        let s = service();
        let v = Value::from(" 42 ");
        assert_eq!(
            s.convert(&v, FieldType::String, FieldType::Integer).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            s.convert(&Value::from("3.9"), FieldType::String, FieldType::Long).unwrap(),
            Value::Long(3)
        );
        assert_eq!(
            s.convert(&Value::from("2.5"), FieldType::String, FieldType::Double).unwrap(),
            Value::Double(2.5)
        );
        assert!(matches!(
            s.convert(&Value::from("abc"), FieldType::String, FieldType::Integer),
            Err(ConversionError::Failed { .. })
        ));
    }

    #[test]
    fn test_range_failures() {
        let s = service();
        assert!(s
            .convert(&Value::Integer(300), FieldType::Integer, FieldType::Byte)
            .is_err());
        assert_eq!(
            s.convert(&Value::Integer(100), FieldType::Integer, FieldType::Byte).unwrap(),
            Value::Byte(100)
        );
        assert!(s
            .convert(&Value::Double(f64::MAX), FieldType::Double, FieldType::Float)
            .is_err());
    }

    #[test]
    fn test_boolean_rules() {
        let s = service();
        for truthy in ["true", "YES", "1", "on"] {
            assert_eq!(
                s.convert(&Value::from(truthy), FieldType::String, FieldType::Boolean).unwrap(),
                Value::Boolean(true)
            );
        }
        assert_eq!(
            s.convert(&Value::Integer(0), FieldType::Integer, FieldType::Boolean).unwrap(),
            Value::Boolean(false)
        );
        assert!(s
            .convert(&Value::from("maybe"), FieldType::String, FieldType::Boolean)
            .is_err());
    }

    #[test]
    fn test_identity_and_wildcard() {
        let s = service();
        let v = Value::from("x");
        assert_eq!(s.convert(&v, FieldType::String, FieldType::String).unwrap(), v);
        assert_eq!(s.convert(&v, FieldType::String, FieldType::All).unwrap(), v);
    }

    #[test]
    fn test_no_converter_to_complex() {
        let err = service()
            .convert(&Value::from("x"), FieldType::String, FieldType::Complex)
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::NoConverter {
                from: FieldType::String,
                to: FieldType::Complex
            }
        );
    }

    #[test]
    fn test_char_conversions() {
        let s = service();
        assert_eq!(
            s.convert(&Value::from("hello"), FieldType::String, FieldType::Char).unwrap(),
            Value::Char('h')
        );
        assert_eq!(
            s.convert(&Value::Integer(65), FieldType::Integer, FieldType::Char).unwrap(),
            Value::Char('A')
        );
        assert_eq!(
            s.convert(&Value::Char('A'), FieldType::Char, FieldType::Integer).unwrap(),
            Value::Integer(65)
        );
    }

    #[test]
    fn test_global_is_shared() {
        let a = DefaultConversionService::global();
        let b = DefaultConversionService::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
