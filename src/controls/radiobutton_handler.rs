/*
 * RadioButton controls. Radio buttons sharing a parent form one group:
 * checking one (with AutoCheck on) unchecks its RadioButton siblings. A
 * sibling that is busy is left alone and logged.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, enum_bits, new_widget};
use super::drawing::Size;
use crate::library::{Callable, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, value_as};

const CONTENT_MIDDLE_LEFT: i64 = 16;

#[derive(Debug)]
pub struct RadioButton {
    core: ControlCore,
    checked: bool,
    auto_check: bool,
    check_align: i64,
}

impl RadioButton {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(104, 24)),
            checked: false,
            auto_check: true,
            check_align: CONTENT_MIDDLE_LEFT,
        }
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        if self.checked == checked {
            return;
        }
        self.checked = checked;
        self.core.raise("CheckedChanged");
        if checked && self.auto_check {
            self.uncheck_siblings();
        }
    }

    fn uncheck_siblings(&self) {
        let Some(parent) = self.core.parent() else {
            return;
        };
        let siblings = match parent.try_borrow() {
            Ok(parent) => parent.core().children().to_vec(),
            Err(_) => {
                log::warn!("RadioButtonHandler: Parent of '{}' busy, group not updated", self.core.name());
                return;
            }
        };
        for sibling in siblings.iter().filter(|s| !self.core.is_self(s)) {
            let Ok(mut guard) = sibling.try_borrow_mut() else {
                log::warn!("RadioButtonHandler: Sibling of '{}' busy, skipped", self.core.name());
                continue;
            };
            if let Some(radio) = guard.as_any_mut().downcast_mut::<RadioButton>() {
                if radio.auto_check {
                    radio.set_checked_alone(false);
                }
            }
        }
    }

    fn set_checked_alone(&mut self, checked: bool) {
        if self.checked != checked {
            self.checked = checked;
            self.core.raise("CheckedChanged");
        }
    }
}

impl Default for RadioButton {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for RadioButton {
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
        Some(self.checked)
    }
}

fn create() -> WidgetRef {
    new_widget(RadioButton::new())
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "RadioButton", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "Checked",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<RadioButton>(w, "Checked")?.checked)),
                |w, v| {
                    let checked = value_as("Checked", &v)?;
                    downcast_mut::<RadioButton>(w, "Checked")?.set_checked(checked);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "AutoCheck",
                ValueType::Bool,
                |w| Ok(Value::Bool(downcast::<RadioButton>(w, "AutoCheck")?.auto_check)),
                |w, v| {
                    downcast_mut::<RadioButton>(w, "AutoCheck")?.auto_check = value_as("AutoCheck", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "CheckAlign",
                ValueType::enumeration("ContentAlignment"),
                |w| {
                    let radio = downcast::<RadioButton>(w, "CheckAlign")?;
                    Ok(Value::enum_value("ContentAlignment", radio.check_align))
                },
                |w, v| {
                    downcast_mut::<RadioButton>(w, "CheckAlign")?.check_align = enum_bits("CheckAlign", &v)?;
                    Ok(())
                },
            ))
            .event("CheckedChanged")
            .method(Callable::method("PerformClick", vec![], |w, _| {
                let radio = downcast_mut::<RadioButton>(w, "PerformClick")?;
                if radio.core.enabled() {
                    radio.core.raise("Click");
                    if radio.auto_check {
                        radio.set_checked(true);
                    }
                }
                Ok(None)
            })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::control::add_child;
    use crate::controls::panel_handler::Panel;

    fn is_checked(widget: &WidgetRef) -> bool {
        widget.borrow().checked_state().unwrap_or(false)
    }

    #[test]
    fn checking_one_radio_unchecks_its_siblings() {
        let group = new_widget(Panel::new());
        let first = create();
        let second = create();
        let other_group = create();
        add_child(&group, &first).unwrap();
        add_child(&group, &second).unwrap();

        downcast_mut::<RadioButton>(&mut *first.borrow_mut(), "Checked")
            .unwrap()
            .set_checked(true);
        downcast_mut::<RadioButton>(&mut *other_group.borrow_mut(), "Checked")
            .unwrap()
            .set_checked(true);
        downcast_mut::<RadioButton>(&mut *second.borrow_mut(), "Checked")
            .unwrap()
            .set_checked(true);

        assert!(!is_checked(&first));
        assert!(is_checked(&second));
        assert!(is_checked(&other_group));
    }

    #[test]
    fn auto_check_off_leaves_siblings_alone() {
        let group = new_widget(Panel::new());
        let first = create();
        let second = create();
        add_child(&group, &first).unwrap();
        add_child(&group, &second).unwrap();
        {
            let mut guard = first.borrow_mut();
            let radio = downcast_mut::<RadioButton>(&mut *guard, "AutoCheck").unwrap();
            radio.auto_check = false;
            radio.set_checked(true);
        }
        downcast_mut::<RadioButton>(&mut *second.borrow_mut(), "Checked")
            .unwrap()
            .set_checked(true);
        assert!(is_checked(&first));
    }
}
