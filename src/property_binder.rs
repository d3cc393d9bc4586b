/*
 * Applies a measure's configuration to its widget. Every writable property
 * of the widget's type is looked up under its exact name, and every event
 * under `Event` or `OnEvent`. Event handlers run the configured command
 * through the host.
 *
 * Rebinding is idempotent: the binder remembers the subscription it made for
 * each event and replaces it, so reloading a skin never stacks handlers.
 */
use std::collections::HashMap;
use std::rc::Rc;

use crate::controls::{SubscriptionToken, WidgetRef};
use crate::host::{Diagnostics, Host};
use crate::library::{PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType};
use crate::value_coercer;

/// Subscriptions the binder made on one widget, keyed by event name.
#[derive(Debug, Default)]
pub struct EventBindings {
    tokens: HashMap<String, SubscriptionToken>,
}

impl EventBindings {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Forgets every subscription. Used when the widget they belong to is
    /// replaced, since its event table goes away with it.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

pub fn bind(
    library: &WidgetLibrary,
    widget: &WidgetRef,
    descriptor: &TypeDescriptor,
    host: &Rc<dyn Host>,
    bindings: &mut EventBindings,
) {
    let diagnostics = Diagnostics::new(host.as_ref());
    for property in library.properties(&descriptor.name) {
        if property.can_write() {
            bind_property(library, widget, property, host.as_ref(), &diagnostics);
        }
    }
    for event in library.events(&descriptor.name) {
        bind_event(widget, &event.name, host, bindings);
    }
}

fn bind_property(
    library: &WidgetLibrary,
    widget: &WidgetRef,
    property: &PropertyDescriptor,
    host: &dyn Host,
    diagnostics: &Diagnostics<'_>,
) {
    let current = match property.get(&*widget.borrow()) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("PropertyBinder: Cannot read {}: {e}", property.name);
            return;
        }
    };

    let name = property.name.as_str();
    let configured = match (&property.value_type, &current) {
        (ValueType::String, Value::Str(current)) => {
            Some(Value::Str(host.read_string(name, current)))
        }
        (ValueType::Int, Value::Int(current)) => Some(Value::Int(host.read_int(name, *current))),
        (ValueType::Bool, Value::Bool(current)) => {
            Some(Value::Bool(host.read_int(name, i32::from(*current)) >= 1))
        }
        (ValueType::Float, Value::Float(current)) => {
            Some(Value::Float(host.read_double(name, f64::from(*current)) as f32))
        }
        (ValueType::Double, Value::Double(current)) => {
            Some(Value::Double(host.read_double(name, *current)))
        }
        _ => {
            let raw = host.read_string(name, "");
            if raw.is_empty() {
                return;
            }
            match value_coercer::coerce(library, &raw, &property.value_type) {
                Some(value) => Some(value),
                None => {
                    diagnostics.property_value_not_valid(
                        &raw,
                        name,
                        property.value_type.type_name(),
                    );
                    None
                }
            }
        }
    };

    let Some(value) = configured else {
        return;
    };
    if value == current {
        return;
    }
    log::debug!(
        "PropertyBinder: Setting {} property {name} to {value:?}",
        property.value_type
    );
    if let Err(e) = property.set(&mut *widget.borrow_mut(), value) {
        diagnostics.error(&format!("RainForms: Could not set {name}: {e}"));
    }
}

fn bind_event(
    widget: &WidgetRef,
    event: &str,
    host: &Rc<dyn Host>,
    bindings: &mut EventBindings,
) {
    let mut command = host.read_string(event, "");
    if command.is_empty() {
        command = host.read_string(&format!("On{event}"), "");
        if command.is_empty() {
            return;
        }
    }

    let mut guard = widget.borrow_mut();
    let table = guard.core_mut().events_mut();
    if let Some(previous) = bindings.tokens.remove(event) {
        table.unsubscribe(previous);
    }
    let host = Rc::clone(host);
    let token = table.subscribe(event, Rc::new(move || host.execute(&command)));
    bindings.tokens.insert(event.to_string(), token);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::types::SkinId;

    fn bind_button(host: &Rc<MemoryHost>, widget: &WidgetRef, bindings: &mut EventBindings) {
        let library = WidgetLibrary::standard();
        let descriptor = library.get("Button").unwrap().clone();
        let host: Rc<dyn Host> = host.clone();
        bind(&library, widget, &descriptor, &host, bindings);
    }

    fn new_button() -> WidgetRef {
        let library = WidgetLibrary::standard();
        library.get("Button").and_then(|t| t.widget_factory()).unwrap()()
    }

    #[test]
    fn primitive_properties_fall_back_to_current_values() {
        let host = Rc::new(
            MemoryHost::new(SkinId(1), "Btn")
                .with_option("Text", "OK")
                .with_option("Width", "120")
                .with_option("Visible", "0"),
        );
        let widget = new_button();
        let mut bindings = EventBindings::default();
        bind_button(&host, &widget, &mut bindings);

        let guard = widget.borrow();
        assert_eq!(guard.core().text(), "OK");
        assert_eq!(guard.core().size().width, 120);
        assert_eq!(guard.core().size().height, 23);
        assert!(!guard.core().visible());
    }

    #[test]
    fn invalid_values_are_reported_and_skipped() {
        let host = Rc::new(
            MemoryHost::new(SkinId(1), "Btn")
                .with_option("BackColor", "255,0")
                .with_option("Dock", "Sideways"),
        );
        let widget = new_button();
        bind_button(&host, &widget, &mut EventBindings::default());

        assert!(host.has_logged(
            log::Level::Error,
            "The value 255,0 for property BackColor is not valid, it needs to be of type Color"
        ));
        assert!(host.has_logged(log::Level::Error, "property Dock"));
    }

    #[test]
    fn rebinding_replaces_the_previous_handler() {
        let host = Rc::new(MemoryHost::new(SkinId(1), "Btn").with_option("OnClick", "[!Log A]"));
        let widget = new_button();
        let mut bindings = EventBindings::default();
        bind_button(&host, &widget, &mut bindings);

        host.remove_option("OnClick");
        host.set_option("Click", "[!Log B]");
        bind_button(&host, &widget, &mut bindings);

        assert_eq!(bindings.len(), 1);
        assert_eq!(widget.borrow().core().events().handler_count("Click"), 1);
        widget.borrow().core().raise("Click");
        crate::controls::pump_events();
        assert_eq!(host.executed(), vec!["[!Log B]".to_string()]);
    }

    #[test]
    fn missing_event_keys_leave_handlers_alone() {
        let host = Rc::new(MemoryHost::new(SkinId(1), "Btn").with_option("OnClick", "[!Log A]"));
        let widget = new_button();
        let mut bindings = EventBindings::default();
        bind_button(&host, &widget, &mut bindings);
        host.remove_option("OnClick");
        bind_button(&host, &widget, &mut bindings);
        assert_eq!(widget.borrow().core().events().handler_count("Click"), 1);
    }
}
