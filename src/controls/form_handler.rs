/*
 * The top-level window. A form needs no parent; every other control reaches
 * the screen through a chain of parents ending in a form. Forms start hidden
 * and are shown with `Show` (e.g. `[!CommandMeasure Form1 "Show"]`).
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, enum_bits, new_widget};
use super::drawing::Size;
use super::enums::{FORM_BORDER_SIZABLE, START_POSITION_DEFAULT_LOCATION};
use crate::error::PluginError;
use crate::library::{Callable, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, value_as};

#[derive(Debug)]
pub struct Form {
    core: ControlCore,
    top_most: bool,
    opacity: f64,
    border_style: i64,
    start_position: i64,
    show_in_taskbar: bool,
    maximize_box: bool,
    minimize_box: bool,
}

impl Form {
    pub fn new() -> Self {
        let mut core = ControlCore::new(Size::new(300, 300));
        core.set_visible(false);
        Self {
            core,
            top_most: false,
            opacity: 1.0,
            border_style: FORM_BORDER_SIZABLE,
            start_position: START_POSITION_DEFAULT_LOCATION,
            show_in_taskbar: true,
            maximize_box: true,
            minimize_box: true,
        }
    }

    /// Hides the form and raises the closing events. The form stays alive
    /// until its measure is finalized, so it can be shown again.
    pub fn close(&mut self) {
        if !self.core.visible() {
            return;
        }
        log::debug!("FormHandler: Closing '{}'", self.core.name());
        self.core.raise("FormClosing");
        self.core.set_visible(false);
        self.core.raise("FormClosed");
    }

    pub fn activate(&mut self) {
        if self.core.visible() {
            self.core.raise("Activated");
        }
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Form {
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

    fn is_top_level(&self) -> bool {
        true
    }
}

fn create() -> WidgetRef {
    new_widget(Form::new())
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "Form", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "TopMost",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<Form>(w, "TopMost")?.top_most)),
                |w, v| {
                    downcast_mut::<Form>(w, "TopMost")?.top_most = value_as("TopMost", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "Opacity",
                ValueType::Double,
                |w| Ok(Value::Double(downcast::<Form>(w, "Opacity")?.opacity)),
                |w, v| {
                    let opacity: f64 = value_as("Opacity", &v)?;
                    if !opacity.is_finite() {
                        return Err(PluginError::invocation("Opacity", "must be a finite number"));
                    }
                    downcast_mut::<Form>(w, "Opacity")?.opacity = opacity.clamp(0.0, 1.0);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "FormBorderStyle",
                ValueType::enumeration("FormBorderStyle"),
                |w| {
                    let form = downcast::<Form>(w, "FormBorderStyle")?;
                    Ok(Value::enum_value("FormBorderStyle", form.border_style))
                },
                |w, v| {
                    downcast_mut::<Form>(w, "FormBorderStyle")?.border_style =
                        enum_bits("FormBorderStyle", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "StartPosition",
                ValueType::enumeration("FormStartPosition"),
                |w| {
                    let form = downcast::<Form>(w, "StartPosition")?;
                    Ok(Value::enum_value("FormStartPosition", form.start_position))
                },
                |w, v| {
                    downcast_mut::<Form>(w, "StartPosition")?.start_position =
                        enum_bits("StartPosition", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "ShowInTaskbar",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<Form>(w, "ShowInTaskbar")?.show_in_taskbar)),
                |w, v| {
                    downcast_mut::<Form>(w, "ShowInTaskbar")?.show_in_taskbar =
                        value_as("ShowInTaskbar", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "MaximizeBox",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<Form>(w, "MaximizeBox")?.maximize_box)),
                |w, v| {
                    downcast_mut::<Form>(w, "MaximizeBox")?.maximize_box = value_as("MaximizeBox", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "MinimizeBox",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<Form>(w, "MinimizeBox")?.minimize_box)),
                |w, v| {
                    downcast_mut::<Form>(w, "MinimizeBox")?.minimize_box = value_as("MinimizeBox", &v)?;
                    Ok(())
                },
            ))
            .event("Activated")
            .event("FormClosing")
            .event("FormClosed")
            .method(Callable::method("Close", vec![], |w, _| {
                downcast_mut::<Form>(w, "Close")?.close();
                Ok(None)
            }))
            .method(Callable::method("Activate", vec![], |w, _| {
                downcast_mut::<Form>(w, "Activate")?.activate();
                Ok(None)
            })),
    );
}
