/*
 * Platform-agnostic types shared between the binding engine, the widget
 * library and the host-facing plugin surface. Nothing in here depends on a
 * particular host ABI, so the whole module is available on every platform.
 */
use std::fmt;

use crate::error::{PluginError, Result};

/// Logical handle of a measure inside the `MeasureRegistry` arena.
///
/// The generation guards against a stale host handle resolving to a slot that
/// was freed and handed to a newer measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureId {
    index: u32,
    generation: u32,
}

impl MeasureId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }

    /// Packs the id into a non-zero integer suitable for an opaque host handle.
    pub fn to_raw(self) -> u64 {
        ((self.generation as u64) << 32 | self.index as u64) + 1
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        let packed = raw.checked_sub(1)?;
        Some(Self {
            index: (packed & 0xFFFF_FFFF) as u32,
            generation: (packed >> 32) as u32,
        })
    }
}

/// Opaque identity of the skin instance that owns a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkinId(pub usize);

/// ARGB color. Alpha defaults to fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 0xFF, r, g, b }
    }

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_argb(0, 0, 0, 0)
    }
}

/// Declared type of a property or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Bool,
    Float,
    Double,
    Color,
    /// Enum type, referenced by simple name in the library.
    Enum(String),
    /// Reference type, rebuilt from constructors or static factories.
    Reference(String),
}

impl ValueType {
    pub fn enumeration(name: impl Into<String>) -> Self {
        ValueType::Enum(name.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        ValueType::Reference(name.into())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValueType::String
                | ValueType::Int
                | ValueType::Bool
                | ValueType::Float
                | ValueType::Double
        )
    }

    /// Types a single command-line token can be turned into without
    /// constructing another object.
    pub fn is_token_coercible(&self) -> bool {
        self.is_primitive() || matches!(self, ValueType::Enum(_))
    }

    pub fn type_name(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Color => "Color",
            ValueType::Enum(name) | ValueType::Reference(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Enum member value tagged with its enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub bits: i64,
}

/// Structured value of a reference type such as `Size` or `Font`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(field, value)| (field == name).then_some(value))
    }
}

/// Typed value produced by coercion and consumed by property setters and
/// callables.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i32),
    Bool(bool),
    Float(f32),
    Double(f64),
    Color(Color),
    Enum(EnumValue),
    Record(Record),
}

impl Value {
    pub fn enum_value(type_name: impl Into<String>, bits: i64) -> Self {
        Value::Enum(EnumValue {
            type_name: type_name.into(),
            bits,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum_bits(&self) -> Option<i64> {
        match self {
            Value::Enum(e) => Some(e.bits),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Color(_) => "Color",
            Value::Enum(e) => &e.type_name,
            Value::Record(r) => &r.type_name,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

/// Extraction of a concrete Rust value out of a `Value`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromValue for Color {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// Converts a setter/callable argument, naming the member in the error.
pub fn value_as<T: FromValue>(member: &str, value: &Value) -> Result<T> {
    T::from_value(value).ok_or_else(|| {
        PluginError::invocation(
            member,
            format!("unexpected argument of type {}", value.kind_name()),
        )
    })
}

/// Positional variant of [`value_as`] used by callables.
pub fn arg<T: FromValue>(member: &str, args: &[Value], index: usize) -> Result<T> {
    let value = args.get(index).ok_or_else(|| {
        PluginError::invocation(member, format!("missing argument #{}", index + 1))
    })?;
    value_as(member, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_id_raw_round_trip_is_never_zero() {
        let id = MeasureId::new(0, 0);
        assert_ne!(id.to_raw(), 0);
        assert_eq!(MeasureId::from_raw(id.to_raw()), Some(id));
        assert_eq!(MeasureId::from_raw(0), None);

        let later = MeasureId::new(7, 3);
        assert_eq!(MeasureId::from_raw(later.to_raw()), Some(later));
    }

    #[test]
    fn color_packs_alpha_first() {
        assert_eq!(Color::from_argb(0x80, 1, 2, 3).to_argb(), 0x8001_0203);
        assert_eq!(Color::from_rgb(1, 2, 3).a, 0xFF);
    }

    #[test]
    fn record_field_lookup() {
        let size = Record::new("Size").with("Width", 10).with("Height", 20);
        assert_eq!(size.field("Height"), Some(&Value::Int(20)));
        assert_eq!(size.field("Depth"), None);
    }

    #[test]
    fn arg_reports_type_mismatch() {
        let args = vec![Value::from("abc")];
        assert_eq!(arg::<String>("SetText", &args, 0).unwrap(), "abc");
        assert!(arg::<i32>("Select", &args, 0).is_err());
        assert!(arg::<i32>("Select", &args, 1).is_err());
    }

    #[test]
    fn only_primitives_and_enums_are_token_coercible() {
        assert!(ValueType::Int.is_token_coercible());
        assert!(ValueType::enumeration("DockStyle").is_token_coercible());
        assert!(!ValueType::Color.is_token_coercible());
        assert!(!ValueType::reference("Font").is_token_coercible());
    }
}
