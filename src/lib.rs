/*
 * RainForms: a bridge plugin that lets a Rainmeter-style skin engine host GUI
 * controls as measures. Each measure names a control type and its parent; on
 * every reload the plugin creates or reuses the control, applies the
 * measure's options to the control's properties, wires its events to skin
 * commands and places it in the control tree. Commands sent to a measure call
 * the control's methods by name.
 *
 * The binding engine works on the explicit type registry in `library` and is
 * platform-agnostic, so everything but the `ffi` export layer builds and tests
 * on any platform. Hosts other than Rainmeter can drive `Plugin` directly
 * through the `Host` trait.
 */
pub(crate) mod command_executor;
pub mod controls;
pub mod error;
#[cfg(target_os = "windows")]
mod ffi;
pub mod host;
pub mod library;
pub mod measure;
pub mod overload_invoker;
pub mod plugin;
pub mod property_binder;
pub mod type_resolver;
pub mod types;
pub mod value_coercer;
pub mod widget_tree;

pub use command_executor::describe_type;
pub use error::{PluginError, Result};
pub use host::{Host, MemoryHost};
pub use library::WidgetLibrary;
pub use plugin::Plugin;
pub use types::{Color, MeasureId, SkinId, Value, ValueType};
