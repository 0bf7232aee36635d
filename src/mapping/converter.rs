//! Value converters
//!
//! A converter turns the raw string captured for a field into a typed
//! `Value` and back. Converters are shared by every parse using a
//! `Mapping`, so they must be `Send + Sync`.

use super::value::Value;
use crate::error::ConversionError;
use std::fmt;
use std::sync::Arc;

/// Two-way conversion between raw markup text and a field value
pub trait Converter: Send + Sync {
    /// Parse raw text into a value
    fn parse(&self, raw: &str) -> Result<Value, ConversionError>;

    /// Render a value back to raw text, `None` if the value is not one
    /// this converter produces
    fn format(&self, value: &Value) -> Option<String> {
        match value {
            Value::Bag(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Shared handle stored in field rules
pub type SharedConverter = Arc<dyn Converter>;

/// Signed integers
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl Converter for IntegerConverter {
    fn parse(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| ConversionError::new(format!("not an integer: {}", e)))
    }

    fn format(&self, value: &Value) -> Option<String> {
        value.as_i64().map(|i| i.to_string())
    }
}

/// Floating point numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    fn parse(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.trim()
            .parse::<f64>()
            .map(Value::Decimal)
            .map_err(|e| ConversionError::new(format!("not a decimal: {}", e)))
    }

    fn format(&self, value: &Value) -> Option<String> {
        value.as_f64().map(|d| d.to_string())
    }
}

/// Booleans: `true/false`, `yes/no`, `1/0` (case-insensitive)
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn parse(&self, raw: &str) -> Result<Value, ConversionError> {
        let trimmed = raw.trim();
        if ["true", "yes", "1"].iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
            Ok(Value::Bool(true))
        } else if ["false", "no", "0"].iter().any(|f| trimmed.eq_ignore_ascii_case(f)) {
            Ok(Value::Bool(false))
        } else {
            Err(ConversionError::new(format!("not a boolean: {:?}", trimmed)))
        }
    }

    fn format(&self, value: &Value) -> Option<String> {
        value.as_bool().map(|b| b.to_string())
    }
}

type ParseFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;
type FormatFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// Converter built from closures
pub struct FnConverter {
    parse: Box<ParseFn>,
    format: Option<Box<FormatFn>>,
}

impl FnConverter {
    pub fn new<P>(parse: P) -> Self
    where
        P: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        FnConverter {
            parse: Box::new(parse),
            format: None,
        }
    }

    /// Attach an inverse; without one values render through `Display`
    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.format = Some(Box::new(format));
        self
    }
}

impl Converter for FnConverter {
    fn parse(&self, raw: &str) -> Result<Value, ConversionError> {
        (self.parse)(raw)
    }

    fn format(&self, value: &Value) -> Option<String> {
        match &self.format {
            Some(format) => format(value),
            None => match value {
                Value::Bag(_) => None,
                other => Some(other.to_string()),
            },
        }
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter")
            .field("format", &self.format.is_some())
            .finish()
    }
}
