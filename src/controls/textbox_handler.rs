/*
 * Single and multi-line text input. The measure's string value is the text
 * box content, so skins can display what the user typed with `[MeasureName]`.
 *
 * `MaxLength` truncates programmatic text too, counted in chars. A
 * `Select` beyond the end of the text is clamped like the native control.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, new_widget};
use super::drawing::Size;
use crate::error::PluginError;
use crate::library::{Callable, Parameter, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, arg, value_as};

const DEFAULT_MAX_LENGTH: i32 = 32767;

#[derive(Debug)]
pub struct TextBox {
    core: ControlCore,
    multiline: bool,
    read_only: bool,
    max_length: i32,
    use_system_password_char: bool,
    selection_start: usize,
    selection_length: usize,
}

impl TextBox {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(100, 23)),
            multiline: false,
            read_only: false,
            max_length: DEFAULT_MAX_LENGTH,
            use_system_password_char: false,
            selection_start: 0,
            selection_length: 0,
        }
    }

    fn text_len(&self) -> usize {
        self.core.text().chars().count()
    }

    fn limit(&self, text: &str) -> String {
        let text = if self.multiline {
            text.to_string()
        } else {
            text.lines().next().unwrap_or_default().to_string()
        };
        text.chars().take(self.max_length.max(0) as usize).collect()
    }

    pub fn set_text(&mut self, text: &str) {
        let limited = self.limit(text);
        self.core.set_text(limited);
        self.selection_start = self.selection_start.min(self.text_len());
        self.selection_length = 0;
    }

    pub fn append_text(&mut self, text: &str) {
        let combined = format!("{}{}", self.core.text(), text);
        self.set_text(&combined);
        self.selection_start = self.text_len();
    }

    pub fn select(&mut self, start: usize, length: usize) {
        let len = self.text_len();
        self.selection_start = start.min(len);
        self.selection_length = length.min(len - self.selection_start);
    }

    pub fn selected_text(&self) -> String {
        self.core
            .text()
            .chars()
            .skip(self.selection_start)
            .take(self.selection_length)
            .collect()
    }
}

impl Default for TextBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TextBox {
    fn core(&self) -> &ControlCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ControlCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn input_text(&self) -> Option<String> {
        Some(self.core.text().to_string())
    }
}

fn create() -> WidgetRef {
    new_widget(TextBox::new())
}

fn non_negative(member: &str, value: i32) -> crate::error::Result<usize> {
    usize::try_from(value)
        .map_err(|_| PluginError::invocation(member, format!("{value} must not be negative")))
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "TextBox", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            // Shadows Control.Text so MaxLength and Multiline apply to skin values.
            .property(PropertyDescriptor::new(
                "Text",
                ValueType::String,
                |w| Ok(Value::from(w.core().text())),
                |w, v| {
                    let text: String = value_as("Text", &v)?;
                    downcast_mut::<TextBox>(w, "Text")?.set_text(&text);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "Multiline",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<TextBox>(w, "Multiline")?.multiline)),
                |w, v| {
                    downcast_mut::<TextBox>(w, "Multiline")?.multiline = value_as("Multiline", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "ReadOnly",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<TextBox>(w, "ReadOnly")?.read_only)),
                |w, v| {
                    downcast_mut::<TextBox>(w, "ReadOnly")?.read_only = value_as("ReadOnly", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "MaxLength",
                ValueType::Int,
                |w| Ok(Value::Int(downcast::<TextBox>(w, "MaxLength")?.max_length)),
                |w, v| {
                    let max_length: i32 = value_as("MaxLength", &v)?;
                    non_negative("MaxLength", max_length)?;
                    let textbox = downcast_mut::<TextBox>(w, "MaxLength")?;
                    textbox.max_length = max_length;
                    let text = textbox.core.text().to_string();
                    textbox.set_text(&text);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "UseSystemPasswordChar",
                ValueType::Bool,
                |w| {
                    let textbox = downcast::<TextBox>(w, "UseSystemPasswordChar")?;
                    Ok(Value::Bool(textbox.use_system_password_char))
                },
                |w, v| {
                    downcast_mut::<TextBox>(w, "UseSystemPasswordChar")?.use_system_password_char =
                        value_as("UseSystemPasswordChar", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::read_only(
                "SelectedText",
                ValueType::String,
                |w| Ok(Value::Str(downcast::<TextBox>(w, "SelectedText")?.selected_text())),
            ))
            .method(Callable::method(
                "SetText",
                vec![Parameter::rest("text")],
                |w, args| {
                    let text: String = arg("SetText", args, 0)?;
                    downcast_mut::<TextBox>(w, "SetText")?.set_text(&text);
                    Ok(None)
                },
            ))
            .method(Callable::method(
                "AppendText",
                vec![Parameter::new("text", ValueType::String)],
                |w, args| {
                    let text: String = arg("AppendText", args, 0)?;
                    downcast_mut::<TextBox>(w, "AppendText")?.append_text(&text);
                    Ok(None)
                },
            ))
            .method(Callable::method("Clear", vec![], |w, _| {
                downcast_mut::<TextBox>(w, "Clear")?.set_text("");
                Ok(None)
            }))
            .method(Callable::method(
                "Select",
                vec![
                    Parameter::new("start", ValueType::Int),
                    Parameter::optional("length", ValueType::Int, Value::Int(0)),
                ],
                |w, args| {
                    let start = non_negative("Select", arg("Select", args, 0)?)?;
                    let length = non_negative("Select", arg("Select", args, 1)?)?;
                    downcast_mut::<TextBox>(w, "Select")?.select(start, length);
                    Ok(None)
                },
            ))
            .method(Callable::method("SelectAll", vec![], |w, _| {
                let textbox = downcast_mut::<TextBox>(w, "SelectAll")?;
                let len = textbox.text_len();
                textbox.select(0, len);
                Ok(None)
            })),
    );
}
