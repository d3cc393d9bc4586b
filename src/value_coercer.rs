/*
 * Conversion of untyped configuration strings into typed values. Coercion
 * either yields a complete value or nothing; callers decide how to report a
 * failure.
 *
 * - primitives are trimmed and parsed with locale-invariant rules
 * - enums match member names case-insensitively, flags enums OR `A|B` segments
 * - colors are `R,G,B` or `R,G,B,A`
 * - reference types are rebuilt from `a,b,c` through constructors, then
 *   static factories returning the same type
 */
use crate::library::{EnumDescriptor, WidgetLibrary};
use crate::overload_invoker;
use crate::types::{Color, Value, ValueType};

pub fn coerce(library: &WidgetLibrary, raw: &str, target: &ValueType) -> Option<Value> {
    match target {
        ValueType::Color => parse_color(raw).map(Value::Color),
        ValueType::Reference(name) => construct(library, name, raw),
        _ => coerce_token(library, raw, target),
    }
}

/// Coercion for a single command argument: primitives and enums only.
pub fn coerce_token(library: &WidgetLibrary, raw: &str, target: &ValueType) -> Option<Value> {
    match target {
        ValueType::String => Some(Value::Str(raw.to_string())),
        ValueType::Int => raw.trim().parse().ok().map(Value::Int),
        ValueType::Bool => parse_bool(raw).map(Value::Bool),
        ValueType::Float => parse_finite::<f32>(raw).map(Value::Float),
        ValueType::Double => parse_finite::<f64>(raw).map(Value::Double),
        ValueType::Enum(name) => {
            let descriptor = library.enum_descriptor(name)?;
            parse_enum(descriptor, raw).map(|bits| Value::enum_value(name.as_str(), bits))
        }
        ValueType::Color | ValueType::Reference(_) => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

trait Finite: std::str::FromStr {
    fn finite(&self) -> bool;
}

impl Finite for f32 {
    fn finite(&self) -> bool {
        self.is_finite()
    }
}

impl Finite for f64 {
    fn finite(&self) -> bool {
        self.is_finite()
    }
}

// `inf` and `NaN` parse in Rust but are not numbers a skin author means.
fn parse_finite<T: Finite>(raw: &str) -> Option<T> {
    raw.trim().parse::<T>().ok().filter(Finite::finite)
}

pub fn parse_enum(descriptor: &EnumDescriptor, raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Some(bits) = descriptor.member(raw) {
        return Some(bits);
    }
    if !descriptor.flags {
        return None;
    }
    raw.split('|')
        .map(|segment| descriptor.member(segment.trim()))
        .try_fold(0, |acc, bits| bits.map(|bits| acc | bits))
}

pub fn parse_color(raw: &str) -> Option<Color> {
    let channels = raw
        .split(',')
        .map(|segment| segment.trim().parse::<u8>().ok())
        .collect::<Option<Vec<_>>>()?;
    match channels[..] {
        [r, g, b] => Some(Color::from_rgb(r, g, b)),
        [r, g, b, a] => Some(Color::from_argb(a, r, g, b)),
        _ => None,
    }
}

fn construct(library: &WidgetLibrary, type_name: &str, raw: &str) -> Option<Value> {
    let args: Vec<&str> = raw.split(',').map(str::trim).collect();
    let mut candidates = library.constructors(type_name);
    candidates.extend(library.static_factories(type_name));
    if candidates.is_empty() {
        log::debug!("ValueCoercer: {type_name} has no constructors or factories");
        return None;
    }
    overload_invoker::invoke(library, None, &candidates, &args)?.value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Font, Padding, Size};
    use crate::types::FromValue;

    fn library() -> WidgetLibrary {
        WidgetLibrary::standard()
    }

    #[test]
    fn primitives_are_trimmed_and_parsed() {
        let library = library();
        assert_eq!(coerce(&library, " 42 ", &ValueType::Int), Some(Value::Int(42)));
        assert_eq!(coerce(&library, "4x", &ValueType::Int), None);
        assert_eq!(coerce(&library, "TRUE", &ValueType::Bool), Some(Value::Bool(true)));
        assert_eq!(coerce(&library, "1", &ValueType::Bool), None);
        assert_eq!(coerce(&library, "0.5", &ValueType::Double), Some(Value::Double(0.5)));
        assert_eq!(coerce(&library, "NaN", &ValueType::Float), None);
        assert_eq!(coerce(&library, "", &ValueType::String), Some(Value::from("")));
    }

    #[test]
    fn plain_enums_need_a_whole_member() {
        let library = library();
        let dock = ValueType::enumeration("DockStyle");
        assert_eq!(coerce(&library, "fill", &dock).and_then(|v| v.as_enum_bits()), Some(5));
        assert_eq!(coerce(&library, "Top|Left", &dock), None);
    }

    #[test]
    fn flags_enums_or_their_segments_in_any_order() {
        let library = library();
        let anchor = ValueType::enumeration("AnchorStyles");
        let a = coerce(&library, "Top|Left", &anchor).and_then(|v| v.as_enum_bits());
        let b = coerce(&library, "left | TOP", &anchor).and_then(|v| v.as_enum_bits());
        assert_eq!(a, Some(5));
        assert_eq!(a, b);
        assert_eq!(coerce(&library, "Top|Sideways", &anchor), None);
    }

    #[test]
    fn colors_take_three_or_four_channels() {
        assert_eq!(parse_color("255,0,0"), Some(Color::from_rgb(255, 0, 0)));
        assert_eq!(
            parse_color("10, 20, 30, 128"),
            Some(Color::from_argb(128, 10, 20, 30))
        );
        assert_eq!(parse_color("255,0"), None);
        assert_eq!(parse_color("1,2,3,4,5"), None);
        assert_eq!(parse_color("256,0,0"), None);
        assert_eq!(parse_color("red"), None);
    }

    #[test]
    fn reference_types_use_constructors_then_factories() {
        let library = library();
        let size = coerce(&library, "200,30", &ValueType::reference("Size"));
        assert_eq!(size.as_ref().and_then(Size::from_value), Some(Size::new(200, 30)));

        let parsed = coerce(&library, "64x48", &ValueType::reference("Size"));
        assert_eq!(parsed.as_ref().and_then(Size::from_value), Some(Size::new(64, 48)));

        let padding = coerce(&library, "1,2,3,4", &ValueType::reference("Padding"));
        assert_eq!(
            padding.as_ref().and_then(Padding::from_value).map(|p| p.bottom),
            Some(4)
        );

        let font = coerce(&library, "Consolas, 11, Bold|Italic", &ValueType::reference("Font"))
            .as_ref()
            .and_then(Font::from_value)
            .unwrap();
        assert_eq!(font.family, "Consolas");
        assert_eq!(font.style, 3);

        assert_eq!(coerce(&library, "wide", &ValueType::reference("Point")), None);
    }
}
