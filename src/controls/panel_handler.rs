/*
 * Panel and GroupBox containers. Neither adds behavior beyond holding
 * children; they exist so skins can group and position controls.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, enum_bits, new_widget};
use super::drawing::Size;
use super::enums::BORDER_STYLE_NONE;
use crate::library::{PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, value_as};

#[derive(Debug)]
pub struct Panel {
    core: ControlCore,
    border_style: i64,
    auto_scroll: bool,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(200, 100)),
            border_style: BORDER_STYLE_NONE,
            auto_scroll: false,
        }
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Panel {
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

#[derive(Debug)]
pub struct GroupBox {
    core: ControlCore,
}

impl GroupBox {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(200, 100)),
        }
    }
}

impl Default for GroupBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for GroupBox {
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

fn create_panel() -> WidgetRef {
    new_widget(Panel::new())
}

fn create_group_box() -> WidgetRef {
    new_widget(GroupBox::new())
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "Panel", Some(create_panel))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "BorderStyle",
                ValueType::enumeration("BorderStyle"),
                |w| {
                    let panel = downcast::<Panel>(w, "BorderStyle")?;
                    Ok(Value::enum_value("BorderStyle", panel.border_style))
                },
                |w, v| {
                    downcast_mut::<Panel>(w, "BorderStyle")?.border_style = enum_bits("BorderStyle", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "AutoScroll",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<Panel>(w, "AutoScroll")?.auto_scroll)),
                |w, v| {
                    downcast_mut::<Panel>(w, "AutoScroll")?.auto_scroll = value_as("AutoScroll", &v)?;
                    Ok(())
                },
            )),
    );
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "GroupBox", Some(create_group_box))
            .base(super::BASE_WIDGET_TYPE),
    );
}
