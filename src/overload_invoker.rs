/*
 * Picks and runs the first overload of a callable set that accepts a list of
 * string arguments. Candidates are tried in declaration order; a candidate is
 * skipped when its arity does not fit, when an argument does not coerce, or
 * when the call itself fails. Failures are logged at debug level and never
 * propagate to the caller.
 */
use crate::controls::WidgetRef;
use crate::error::{PluginError, Result};
use crate::library::{Callable, CallableKind, WidgetLibrary};
use crate::types::Value;
use crate::value_coercer;

/// The overload that ran and what it returned.
#[derive(Debug)]
pub struct Invoked<'a> {
    pub callable: &'a Callable,
    pub value: Option<Value>,
}

pub fn invoke<'a>(
    library: &WidgetLibrary,
    target: Option<&WidgetRef>,
    candidates: &[&'a Callable],
    args: &[&str],
) -> Option<Invoked<'a>> {
    for &candidate in candidates {
        if !candidate.accepts_arity(args.len()) {
            continue;
        }
        let Some(values) = coerce_arguments(library, candidate, args) else {
            log::trace!(
                "OverloadInvoker: {} argument(s) do not fit {} with {} parameter(s)",
                args.len(),
                candidate.name,
                candidate.params.len()
            );
            continue;
        };
        match call(candidate, target, &values) {
            Ok(value) => return Some(Invoked { callable: candidate, value }),
            Err(e) => log::debug!("OverloadInvoker: {} failed: {e}", candidate.name),
        }
    }
    None
}

/*
 * Coerces every argument before anything is invoked. A trailing rest
 * parameter takes the remaining tokens joined with single spaces; missing
 * optional parameters take their defaults.
 */
fn coerce_arguments(library: &WidgetLibrary, callable: &Callable, args: &[&str]) -> Option<Vec<Value>> {
    let mut values = Vec::with_capacity(callable.params.len());
    for (index, param) in callable.params.iter().enumerate() {
        if !param.value_type.is_token_coercible() {
            return None;
        }
        let value = if param.rest {
            match args.get(index..) {
                Some(rest) if !rest.is_empty() => Value::Str(rest.join(" ")),
                _ => param.default.clone()?,
            }
        } else {
            match args.get(index) {
                Some(raw) => value_coercer::coerce_token(library, raw, &param.value_type)?,
                None => param.default.clone()?,
            }
        };
        values.push(value);
    }
    Some(values)
}

fn call(callable: &Callable, target: Option<&WidgetRef>, values: &[Value]) -> Result<Option<Value>> {
    let result = match (callable.kind, target) {
        (CallableKind::Instance, Some(widget)) => {
            let mut guard = widget.try_borrow_mut().map_err(|_| {
                PluginError::invocation(&callable.name, "widget is busy")
            })?;
            if guard.core().is_disposed() {
                return Err(PluginError::Disposed(guard.core().name().to_string()));
            }
            callable.call(Some(&mut *guard), values)?
        }
        _ => callable.call(None, values)?,
    };
    if callable.kind == CallableKind::Constructor && result.is_none() {
        return Err(PluginError::invocation(&callable.name, "constructor produced no value"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Parameter, TypeDescriptor};
    use crate::types::ValueType;

    fn recorder_library() -> WidgetLibrary {
        let mut library = WidgetLibrary::standard();
        library.register(
            TypeDescriptor::value("Test", "Probe")
                .constructor(Callable::constructor(
                    "Probe",
                    vec![Parameter::new("a", ValueType::Int)],
                    |_| Ok(Some(Value::from("int"))),
                ))
                .constructor(Callable::constructor(
                    "Probe",
                    vec![Parameter::new("a", ValueType::String)],
                    |_| Ok(Some(Value::from("string"))),
                ))
                .constructor(Callable::constructor(
                    "Probe",
                    vec![
                        Parameter::new("a", ValueType::Int),
                        Parameter::new("b", ValueType::Int),
                    ],
                    |_| Ok(Some(Value::from("int,int"))),
                ))
                .constructor(Callable::constructor(
                    "Probe",
                    vec![Parameter::new("c", ValueType::Color)],
                    |_| Ok(Some(Value::from("color"))),
                ))
                .constructor(Callable::constructor(
                    "Probe",
                    vec![Parameter::new("f", ValueType::Bool)],
                    |_| Err(PluginError::invocation("Probe", "always fails")),
                ))
                .constructor(Callable::constructor(
                    "Probe",
                    vec![Parameter::new("f", ValueType::Bool)],
                    |_| Ok(None),
                )),
        );
        library
    }

    fn run(library: &WidgetLibrary, args: &[&str]) -> Option<Value> {
        let candidates = library.constructors("Probe");
        invoke(library, None, &candidates, args).and_then(|invoked| invoked.value)
    }

    #[test]
    fn first_matching_overload_in_declaration_order_wins() {
        let library = recorder_library();
        assert_eq!(run(&library, &["5"]), Some(Value::from("int")));
        assert_eq!(run(&library, &["five"]), Some(Value::from("string")));
        assert_eq!(run(&library, &["5", "6"]), Some(Value::from("int,int")));
        assert_eq!(run(&library, &["1", "2", "3"]), None);
    }

    #[test]
    fn failing_or_empty_constructors_count_as_failures() {
        let mut library = WidgetLibrary::new("Control");
        library.register(
            TypeDescriptor::value("Test", "Flaky")
                .constructor(Callable::constructor(
                    "Flaky",
                    vec![Parameter::new("f", ValueType::Bool)],
                    |_| Err(PluginError::invocation("Flaky", "boom")),
                ))
                .constructor(Callable::constructor(
                    "Flaky",
                    vec![Parameter::new("f", ValueType::Bool)],
                    |_| Ok(None),
                ))
                .constructor(Callable::constructor(
                    "Flaky",
                    vec![Parameter::new("f", ValueType::Bool)],
                    |_| Ok(Some(Value::from("third"))),
                )),
        );
        let candidates = library.constructors("Flaky");
        let invoked = invoke(&library, None, &candidates, &["true"]).unwrap();
        assert_eq!(invoked.value, Some(Value::from("third")));
    }

    #[test]
    fn rest_parameters_join_remaining_tokens() {
        let method = Callable::method(
            "Echo",
            vec![Parameter::new("n", ValueType::Int), Parameter::rest("text")],
            |_, args| Ok(args.get(1).cloned()),
        );
        let library = WidgetLibrary::new("Control");
        let widget = crate::controls::new_widget(crate::controls::panel_handler::Panel::new());
        let invoked = invoke(&library, Some(&widget), &[&method], &["1", "Hello", "World"]).unwrap();
        assert_eq!(invoked.value, Some(Value::from("Hello World")));

        let invoked = invoke(&library, Some(&widget), &[&method], &["1"]).unwrap();
        assert_eq!(invoked.value, Some(Value::from("")));
    }

    #[test]
    fn missing_optional_parameters_take_defaults() {
        let method = Callable::method(
            "Pick",
            vec![
                Parameter::new("start", ValueType::Int),
                Parameter::optional("length", ValueType::Int, Value::Int(9)),
            ],
            |_, args| Ok(args.get(1).cloned()),
        );
        let library = WidgetLibrary::new("Control");
        let widget = crate::controls::new_widget(crate::controls::panel_handler::Panel::new());
        let invoked = invoke(&library, Some(&widget), &[&method], &["3"]).unwrap();
        assert_eq!(invoked.value, Some(Value::Int(9)));
    }

    #[test]
    fn busy_targets_fail_without_panicking() {
        let method = Callable::method("Noop", vec![], |_, _| Ok(None));
        let library = WidgetLibrary::new("Control");
        let widget = crate::controls::new_widget(crate::controls::panel_handler::Panel::new());
        let _guard = widget.borrow();
        assert!(invoke(&library, Some(&widget), &[&method], &[]).is_none());
    }
}
