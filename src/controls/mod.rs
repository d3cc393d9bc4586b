/*
 * The built-in control set. Each `*_handler` module owns one control family:
 * its retained state, its `Widget` implementation and the registration of its
 * type descriptor (properties, events, constructors, methods) in the
 * `WidgetLibrary`.
 */
pub mod button_handler;
pub mod checkbox_handler;
pub mod control;
pub mod drawing;
pub mod enums;
pub mod events;
pub mod form_handler;
pub mod label_handler;
pub mod panel_handler;
pub mod progress_handler;
pub mod radiobutton_handler;
pub mod tab_control_handler;
pub mod textbox_handler;

pub use control::{
    ControlCore, WeakWidgetRef, Widget, WidgetRef, add_child, detach, dispose, new_widget,
};
pub use drawing::{Font, Padding, Point, Size};
pub use events::{EventHandler, SubscriptionToken, pump as pump_events};

use crate::library::WidgetLibrary;

pub const FORMS_NAMESPACE: &str = "RainForms.Controls";

/// Every control derives from this type.
pub const BASE_WIDGET_TYPE: &str = "Control";

pub(crate) fn register_standard_controls(library: &mut WidgetLibrary) {
    drawing::register(library);
    enums::register(library);
    control::register(library);
    form_handler::register(library);
    button_handler::register(library);
    checkbox_handler::register(library);
    radiobutton_handler::register(library);
    label_handler::register(library);
    textbox_handler::register(library);
    panel_handler::register(library);
    tab_control_handler::register(library);
    progress_handler::register(library);
}
