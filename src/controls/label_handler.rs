/*
 * Static text labels. A label never takes focus; `AutoSize` is kept as a
 * flag for layouts that size the label from its text.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, enum_bits, new_widget};
use super::drawing::Size;
use super::enums::BORDER_STYLE_NONE;
use crate::library::{PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, value_as};

const CONTENT_TOP_LEFT: i64 = 1;

#[derive(Debug)]
pub struct Label {
    core: ControlCore,
    auto_size: bool,
    text_align: i64,
    border_style: i64,
}

impl Label {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(100, 23)),
            auto_size: false,
            text_align: CONTENT_TOP_LEFT,
            border_style: BORDER_STYLE_NONE,
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Label {
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
}

fn create() -> WidgetRef {
    new_widget(Label::new())
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "Label", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "AutoSize",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<Label>(w, "AutoSize")?.auto_size)),
                |w, v| {
                    downcast_mut::<Label>(w, "AutoSize")?.auto_size = value_as("AutoSize", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "TextAlign",
                ValueType::enumeration("ContentAlignment"),
                |w| {
                    let label = downcast::<Label>(w, "TextAlign")?;
                    Ok(Value::enum_value("ContentAlignment", label.text_align))
                },
                |w, v| {
                    downcast_mut::<Label>(w, "TextAlign")?.text_align = enum_bits("TextAlign", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "BorderStyle",
                ValueType::enumeration("BorderStyle"),
                |w| {
                    let label = downcast::<Label>(w, "BorderStyle")?;
                    Ok(Value::enum_value("BorderStyle", label.border_style))
                },
                |w, v| {
                    downcast_mut::<Label>(w, "BorderStyle")?.border_style = enum_bits("BorderStyle", &v)?;
                    Ok(())
                },
            )),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_properties_are_not_available_on_other_controls() {
        let mut library = WidgetLibrary::new(super::super::BASE_WIDGET_TYPE);
        register(&mut library);
        let property = library.property("Label", "AutoSize").unwrap();
        let panel = new_widget(crate::controls::panel_handler::Panel::new());
        assert!(property.set(&mut *panel.borrow_mut(), Value::Bool(true)).is_err());

        let label = create();
        property.set(&mut *label.borrow_mut(), Value::Bool(true)).unwrap();
        assert_eq!(property.get(&*label.borrow()).unwrap(), Value::Bool(true));
    }
}
