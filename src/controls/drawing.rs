/*
 * Value types used by control properties (sizes, points, paddings, fonts) and
 * the drawing enums. These are the reference types a skin writes as
 * comma-separated constructor arguments, e.g. `Font=Segoe UI,11,Bold` or
 * `Size=200,30`.
 */
use crate::error::{PluginError, Result};
use crate::library::{Callable, Parameter, TypeDescriptor, WidgetLibrary};
use crate::types::{FromValue, Record, Value, ValueType, arg};

pub const DRAWING_NAMESPACE: &str = "RainForms.Drawing";

pub(crate) const FONT_STYLE_BOLD: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Parses the `WxH` shorthand, e.g. `200x100`.
    pub fn parse(text: &str) -> Option<Self> {
        let (w, h) = text.trim().split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

impl From<Size> for Value {
    fn from(size: Size) -> Self {
        Value::Record(
            Record::new("Size")
                .with("Width", size.width)
                .with("Height", size.height),
        )
    }
}

impl FromValue for Size {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_record().filter(|r| r.type_name == "Size")?;
        Some(Self::new(
            record.field("Width")?.as_int()?,
            record.field("Height")?.as_int()?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Value {
    fn from(point: Point) -> Self {
        Value::Record(Record::new("Point").with("X", point.x).with("Y", point.y))
    }
}

impl FromValue for Point {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_record().filter(|r| r.type_name == "Point")?;
        Some(Self::new(
            record.field("X")?.as_int()?,
            record.field("Y")?.as_int()?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Padding {
    pub const fn all(value: i32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

impl From<Padding> for Value {
    fn from(padding: Padding) -> Self {
        Value::Record(
            Record::new("Padding")
                .with("Left", padding.left)
                .with("Top", padding.top)
                .with("Right", padding.right)
                .with("Bottom", padding.bottom),
        )
    }
}

impl FromValue for Padding {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_record().filter(|r| r.type_name == "Padding")?;
        Some(Self {
            left: record.field("Left")?.as_int()?,
            top: record.field("Top")?.as_int()?,
            right: record.field("Right")?.as_int()?,
            bottom: record.field("Bottom")?.as_int()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
    /// `FontStyle` bits.
    pub style: i64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Segoe UI".to_string(),
            size: 9.0,
            style: 0,
        }
    }
}

impl Font {
    pub fn is_bold(&self) -> bool {
        self.style & FONT_STYLE_BOLD != 0
    }
}

impl From<Font> for Value {
    fn from(font: Font) -> Self {
        Value::Record(
            Record::new("Font")
                .with("Name", font.family)
                .with("Size", font.size)
                .with("Style", Value::enum_value("FontStyle", font.style)),
        )
    }
}

impl FromValue for Font {
    fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_record().filter(|r| r.type_name == "Font")?;
        Some(Self {
            family: record.field("Name")?.as_str()?.to_string(),
            size: f32::from_value(record.field("Size")?)?,
            style: record.field("Style")?.as_enum_bits()?,
        })
    }
}

fn font_from(member: &str, family: String, size: f32, style: i64) -> Result<Option<Value>> {
    if family.trim().is_empty() {
        return Err(PluginError::invocation(member, "font family must not be empty"));
    }
    if !(size > 0.0 && size.is_finite()) {
        return Err(PluginError::invocation(
            member,
            format!("font size {size} must be positive"),
        ));
    }
    Ok(Some(Value::from(Font {
        family,
        size,
        style,
    })))
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(TypeDescriptor::enumeration(
        DRAWING_NAMESPACE,
        "FontStyle",
        true,
        &[
            ("Regular", 0),
            ("Bold", FONT_STYLE_BOLD),
            ("Italic", 2),
            ("Underline", 4),
            ("Strikeout", 8),
        ],
    ));
    library.register(TypeDescriptor::enumeration(
        DRAWING_NAMESPACE,
        "ContentAlignment",
        false,
        &[
            ("TopLeft", 1),
            ("TopCenter", 2),
            ("TopRight", 4),
            ("MiddleLeft", 16),
            ("MiddleCenter", 32),
            ("MiddleRight", 64),
            ("BottomLeft", 256),
            ("BottomCenter", 512),
            ("BottomRight", 1024),
        ],
    ));

    library.register(
        TypeDescriptor::value(DRAWING_NAMESPACE, "Size")
            .constructor(Callable::constructor(
                "Size",
                vec![
                    Parameter::new("width", ValueType::Int),
                    Parameter::new("height", ValueType::Int),
                ],
                |args| {
                    Ok(Some(Value::from(Size::new(
                        arg("Size", args, 0)?,
                        arg("Size", args, 1)?,
                    ))))
                },
            ))
            .method(Callable::factory(
                "Parse",
                vec![Parameter::new("text", ValueType::String)],
                ValueType::reference("Size"),
                |args| {
                    let text: String = arg("Parse", args, 0)?;
                    Size::parse(&text)
                        .map(|size| Some(Value::from(size)))
                        .ok_or_else(|| {
                            PluginError::invocation("Parse", format!("\"{text}\" is not WxH"))
                        })
                },
            )),
    );

    library.register(TypeDescriptor::value(DRAWING_NAMESPACE, "Point").constructor(
        Callable::constructor(
            "Point",
            vec![
                Parameter::new("x", ValueType::Int),
                Parameter::new("y", ValueType::Int),
            ],
            |args| {
                Ok(Some(Value::from(Point::new(
                    arg("Point", args, 0)?,
                    arg("Point", args, 1)?,
                ))))
            },
        ),
    ));

    library.register(
        TypeDescriptor::value(DRAWING_NAMESPACE, "Padding")
            .constructor(Callable::constructor(
                "Padding",
                vec![Parameter::new("all", ValueType::Int)],
                |args| Ok(Some(Value::from(Padding::all(arg("Padding", args, 0)?)))),
            ))
            .constructor(Callable::constructor(
                "Padding",
                vec![
                    Parameter::new("left", ValueType::Int),
                    Parameter::new("top", ValueType::Int),
                    Parameter::new("right", ValueType::Int),
                    Parameter::new("bottom", ValueType::Int),
                ],
                |args| {
                    Ok(Some(Value::from(Padding {
                        left: arg("Padding", args, 0)?,
                        top: arg("Padding", args, 1)?,
                        right: arg("Padding", args, 2)?,
                        bottom: arg("Padding", args, 3)?,
                    })))
                },
            )),
    );

    library.register(
        TypeDescriptor::value(DRAWING_NAMESPACE, "Font")
            .constructor(Callable::constructor(
                "Font",
                vec![
                    Parameter::new("familyName", ValueType::String),
                    Parameter::new("emSize", ValueType::Float),
                ],
                |args| font_from("Font", arg("Font", args, 0)?, arg("Font", args, 1)?, 0),
            ))
            .constructor(Callable::constructor(
                "Font",
                vec![
                    Parameter::new("familyName", ValueType::String),
                    Parameter::new("emSize", ValueType::Float),
                    Parameter::new("style", ValueType::enumeration("FontStyle")),
                ],
                |args| {
                    let style = args.get(2).and_then(Value::as_enum_bits).unwrap_or(0);
                    font_from("Font", arg("Font", args, 0)?, arg("Font", args, 1)?, style)
                },
            ))
            .method(Callable::factory(
                "FromName",
                vec![Parameter::new("familyName", ValueType::String)],
                ValueType::reference("Font"),
                |args| {
                    font_from(
                        "FromName",
                        arg("FromName", args, 0)?,
                        Font::default().size,
                        0,
                    )
                },
            )),
    );
}
