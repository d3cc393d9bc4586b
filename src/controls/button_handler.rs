/*
 * Push buttons. A button raises `Click` when clicked by the user or when a
 * skin calls `PerformClick`, so `OnClick=[!SomeBang]` fires either way.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, enum_bits, new_widget};
use super::drawing::Size;
use crate::library::{Callable, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType};

const CONTENT_MIDDLE_CENTER: i64 = 32;
const FLAT_STYLE_STANDARD: i64 = 2;

#[derive(Debug)]
pub struct Button {
    core: ControlCore,
    flat_style: i64,
    text_align: i64,
}

impl Button {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(75, 23)),
            flat_style: FLAT_STYLE_STANDARD,
            text_align: CONTENT_MIDDLE_CENTER,
        }
    }

    pub fn perform_click(&self) {
        if self.core.visible() && self.core.enabled() {
            log::debug!("ButtonHandler: Click on '{}'", self.core.name());
            self.core.raise("Click");
        }
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Button {
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
    new_widget(Button::new())
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "Button", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "FlatStyle",
                ValueType::enumeration("FlatStyle"),
                |w| {
                    let button = downcast::<Button>(w, "FlatStyle")?;
                    Ok(Value::enum_value("FlatStyle", button.flat_style))
                },
                |w, v| {
                    downcast_mut::<Button>(w, "FlatStyle")?.flat_style = enum_bits("FlatStyle", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "TextAlign",
                ValueType::enumeration("ContentAlignment"),
                |w| {
                    let button = downcast::<Button>(w, "TextAlign")?;
                    Ok(Value::enum_value("ContentAlignment", button.text_align))
                },
                |w, v| {
                    downcast_mut::<Button>(w, "TextAlign")?.text_align = enum_bits("TextAlign", &v)?;
                    Ok(())
                },
            ))
            .method(Callable::method("PerformClick", vec![], |w, _| {
                downcast::<Button>(w, "PerformClick")?.perform_click();
                Ok(None)
            })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::events;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn perform_click_delivers_click_on_pump() {
        let widget = create();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        widget
            .borrow_mut()
            .core_mut()
            .events_mut()
            .subscribe("Click", Rc::new(move || counter.set(counter.get() + 1)));

        downcast::<Button>(&*widget.borrow(), "PerformClick")
            .unwrap()
            .perform_click();
        assert_eq!(clicks.get(), 0);
        events::pump();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn disabled_button_does_not_click() {
        let widget = create();
        widget.borrow_mut().core_mut().set_enabled(false);
        events::pump();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        widget
            .borrow_mut()
            .core_mut()
            .events_mut()
            .subscribe("Click", Rc::new(move || counter.set(counter.get() + 1)));

        downcast::<Button>(&*widget.borrow(), "PerformClick")
            .unwrap()
            .perform_click();
        events::pump();
        assert_eq!(clicks.get(), 0);
    }
}
