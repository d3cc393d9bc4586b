/*
 * Executes commands sent to a measure (`[!CommandMeasure Name "..."]`).
 * Two introspection commands print what a skin author can write for a type or
 * property; anything else is a method call on the measure's widget, with the
 * first token naming the method and the remaining tokens as its arguments.
 *
 * Introspection output is written as notices in reading order, framed by
 * separator lines.
 */
use crate::error::PluginError;
use crate::host::Diagnostics;
use crate::library::{TypeDescriptor, TypeKind, WidgetLibrary};
use crate::measure::Measure;
use crate::overload_invoker;
use crate::type_resolver;

const TYPE_INFO_COMMAND: &str = "RFTypeInfo";
const PROPERTY_INFO_COMMAND: &str = "RFPropertyInfo";
const SEPARATOR: &str = "--------------------------";

pub(crate) fn execute(library: &WidgetLibrary, measure: &Measure, command: &str) {
    let mut tokens = command.split_whitespace();
    let Some(name) = tokens.next() else {
        return;
    };
    if measure.is_invalid() {
        log::debug!(
            "CommandExecutor: Ignoring '{name}' for invalid measure '{}'",
            measure.name()
        );
        return;
    }
    let args: Vec<&str> = tokens.collect();
    let diagnostics = Diagnostics::new(measure.host.as_ref());

    match name {
        TYPE_INFO_COMMAND => execute_type_info(library, &diagnostics, args.first().copied()),
        PROPERTY_INFO_COMMAND => {
            execute_property_info(library, measure, &diagnostics, args.first().copied())
        }
        _ => execute_method(library, measure, &diagnostics, name, &args),
    }
}

fn execute_type_info(library: &WidgetLibrary, diagnostics: &Diagnostics<'_>, type_name: Option<&str>) {
    let Some(type_name) = type_name else {
        diagnostics.error("RainForms: RFTypeInfo needs a type name");
        return;
    };
    let Ok(descriptor) = type_resolver::resolve_any(library, type_name) else {
        diagnostics.error(&format!("RainForms: The type \"{type_name}\" was not found"));
        return;
    };

    diagnostics.notice(&format!("RFTypeInfo for [{}]", descriptor.full_name()));
    diagnostics.notice(SEPARATOR);
    diagnostics.notice(if descriptor.as_enum().is_some() {
        "Enum values:"
    } else {
        "Supported constructors:"
    });
    for line in describe_type(library, descriptor) {
        diagnostics.notice(&line);
    }
    diagnostics.notice(SEPARATOR);
}

fn execute_property_info(
    library: &WidgetLibrary,
    measure: &Measure,
    diagnostics: &Diagnostics<'_>,
    property_name: Option<&str>,
) {
    let Some(type_name) = measure.type_name() else {
        return;
    };
    let Some(property_name) = property_name else {
        diagnostics.error("RainForms: RFPropertyInfo needs a property name");
        return;
    };
    let Some(property) = library.property(type_name, property_name) else {
        let missing = PluginError::PropertyNotFound(property_name.to_string());
        diagnostics.error(&format!("RainForms: {missing}"));
        return;
    };
    let declared_on = library
        .lineage(type_name)
        .into_iter()
        .find(|t| t.properties.iter().any(|p| p.name == property.name))
        .map_or(type_name, |t| t.name.as_str());
    let property_type = library.get(property.value_type.type_name());

    diagnostics.notice(&format!("RFPropertyInfo for [{declared_on}.{}]", property.name));
    diagnostics.notice(SEPARATOR);
    diagnostics.notice(&format!(
        "The property is of type {}",
        property_type.map_or_else(|| property.value_type.to_string(), TypeDescriptor::full_name)
    ));
    if let Some(property_type) = property_type {
        diagnostics.notice(if property_type.as_enum().is_some() {
            "The type has following enum values:"
        } else {
            "The type has following supported constructors:"
        });
        for line in describe_type(library, property_type) {
            diagnostics.notice(&line);
        }
    }
    diagnostics.notice(SEPARATOR);
}

fn execute_method(
    library: &WidgetLibrary,
    measure: &Measure,
    diagnostics: &Diagnostics<'_>,
    name: &str,
    args: &[&str],
) {
    let (Some(type_name), Some(widget)) = (measure.type_name(), measure.widget()) else {
        return;
    };
    let candidates = library.instance_methods(type_name, name);
    if overload_invoker::invoke(library, Some(widget), &candidates, args).is_none() {
        let full_name = library.get(type_name).map_or_else(|| type_name.to_string(), TypeDescriptor::full_name);
        diagnostics.error(&format!(
            "RainForms: {name} is not a valid method in type {full_name}"
        ));
    }
    diagnostics.debug(&format!("Received command: {name}"));
}

/// The values or construction forms a skin can write for `descriptor`.
pub fn describe_type(library: &WidgetLibrary, descriptor: &TypeDescriptor) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(members) = descriptor.as_enum() {
        lines.extend(
            members
                .members
                .iter()
                .map(|(member, _)| format!("{}.{member}", descriptor.name)),
        );
    }
    if matches!(descriptor.kind, TypeKind::Widget { create: Some(_) }) {
        lines.push(format!("{}()", descriptor.name));
    }
    let constructors = library.constructors(&descriptor.name);
    let factories = library.static_factories(&descriptor.name);
    lines.extend(
        constructors
            .into_iter()
            .chain(factories)
            .filter(|callable| callable.is_token_invocable())
            .map(|callable| callable.signature(&descriptor.name)),
    );
    lines
}
