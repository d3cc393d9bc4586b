/*
 * CheckBox controls. `Checked` and `CheckState` are two views of the same
 * state; changing either raises `CheckedChanged` and `CheckStateChanged`.
 * The measure's numeric value mirrors the checked state. `Checked` is read
 * from the skin as an integer; any value >= 1 checks the box.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, enum_bits, new_widget};
use super::drawing::Size;
use super::enums::{CHECK_STATE_CHECKED, CHECK_STATE_INDETERMINATE, CHECK_STATE_UNCHECKED};
use crate::error::PluginError;
use crate::library::{PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, value_as};

#[derive(Debug)]
pub struct CheckBox {
    core: ControlCore,
    check_state: i64,
    three_state: bool,
}

impl CheckBox {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(104, 24)),
            check_state: CHECK_STATE_UNCHECKED,
            three_state: false,
        }
    }

    pub fn checked(&self) -> bool {
        self.check_state != CHECK_STATE_UNCHECKED
    }

    pub fn set_checked(&mut self, checked: bool) {
        let state = if checked {
            CHECK_STATE_CHECKED
        } else {
            CHECK_STATE_UNCHECKED
        };
        self.set_check_state(state);
    }

    pub fn set_check_state(&mut self, state: i64) {
        if self.check_state == state {
            return;
        }
        let was_checked = self.checked();
        self.check_state = state;
        if was_checked != self.checked() {
            self.core.raise("CheckedChanged");
        }
        self.core.raise("CheckStateChanged");
    }
}

impl Default for CheckBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for CheckBox {
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

    fn checked_state(&self) -> Option<bool> {
        Some(self.checked())
    }
}

fn create() -> WidgetRef {
    new_widget(CheckBox::new())
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "CheckBox", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "Checked",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<CheckBox>(w, "Checked")?.checked())),
                |w, v| {
                    let checked = value_as("Checked", &v)?;
                    downcast_mut::<CheckBox>(w, "Checked")?.set_checked(checked);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "CheckState",
                ValueType::enumeration("CheckState"),
                |w| {
                    let checkbox = downcast::<CheckBox>(w, "CheckState")?;
                    Ok(Value::enum_value("CheckState", checkbox.check_state))
                },
                |w, v| {
                    let state = enum_bits("CheckState", &v)?;
                    let checkbox = downcast_mut::<CheckBox>(w, "CheckState")?;
                    if state == CHECK_STATE_INDETERMINATE && !checkbox.three_state {
                        return Err(PluginError::invocation(
                            "CheckState",
                            "Indeterminate requires ThreeState=1",
                        ));
                    }
                    checkbox.set_check_state(state);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "ThreeState",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<CheckBox>(w, "ThreeState")?.three_state)),
                |w, v| {
                    downcast_mut::<CheckBox>(w, "ThreeState")?.three_state = value_as("ThreeState", &v)?;
                    Ok(())
                },
            ))
            .event("CheckedChanged")
            .event("CheckStateChanged"),
    );
}
