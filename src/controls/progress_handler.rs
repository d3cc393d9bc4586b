use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{ControlCore, Widget, WidgetRef, downcast, downcast_mut, new_widget};
use super::drawing::Size;
use crate::error::{PluginError, Result};
use crate::library::{Callable, Parameter, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, arg, value_as};

const DEFAULT_PROGRESS_WIDTH: i32 = 100;
const DEFAULT_PROGRESS_HEIGHT: i32 = 23;

#[derive(Debug)]
pub struct ProgressBar {
    core: ControlCore,
    minimum: i32,
    maximum: i32,
    value: i32,
    step: i32,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(DEFAULT_PROGRESS_WIDTH, DEFAULT_PROGRESS_HEIGHT)),
            minimum: 0,
            maximum: 100,
            value: 0,
            step: 10,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    fn set_value(&mut self, value: i32) -> Result<()> {
        if value < self.minimum || value > self.maximum {
            return Err(PluginError::invocation(
                "Value",
                format!(
                    "{value} is outside the range {}..{}",
                    self.minimum, self.maximum
                ),
            ));
        }
        self.value = value;
        Ok(())
    }

    // Stepping saturates at the range bounds instead of failing.
    fn increment(&mut self, amount: i32) {
        self.value = self
            .value
            .saturating_add(amount)
            .clamp(self.minimum, self.maximum);
    }

    fn set_range(&mut self, minimum: i32, maximum: i32) {
        self.minimum = minimum;
        self.maximum = maximum.max(minimum);
        self.value = self.value.clamp(self.minimum, self.maximum);
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for ProgressBar {
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
    new_widget(ProgressBar::new())
}

fn bar<'a>(w: &'a mut dyn Widget, member: &str) -> Result<&'a mut ProgressBar> {
    downcast_mut::<ProgressBar>(w, member)
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "ProgressBar", Some(create))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "Minimum",
                ValueType::Int,
                |w| Ok(Value::Int(downcast::<ProgressBar>(w, "Minimum")?.minimum)),
                |w, v| {
                    let bar = bar(w, "Minimum")?;
                    let maximum = bar.maximum;
                    bar.set_range(value_as("Minimum", &v)?, maximum);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "Maximum",
                ValueType::Int,
                |w| Ok(Value::Int(downcast::<ProgressBar>(w, "Maximum")?.maximum)),
                |w, v| {
                    let bar = bar(w, "Maximum")?;
                    let minimum = bar.minimum;
                    bar.set_range(minimum, value_as("Maximum", &v)?);
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::new(
                "Value",
                ValueType::Int,
                |w| Ok(Value::Int(downcast::<ProgressBar>(w, "Value")?.value)),
                |w, v| bar(w, "Value")?.set_value(value_as("Value", &v)?),
            ))
            .property(PropertyDescriptor::new(
                "Step",
                ValueType::Int,
                |w| Ok(Value::Int(downcast::<ProgressBar>(w, "Step")?.step)),
                |w, v| {
                    bar(w, "Step")?.step = value_as("Step", &v)?;
                    Ok(())
                },
            ))
            .method(Callable::method("PerformStep", vec![], |w, _| {
                let bar = bar(w, "PerformStep")?;
                let step = bar.step;
                bar.increment(step);
                Ok(None)
            }))
            .method(Callable::method(
                "Increment",
                vec![Parameter::new("value", ValueType::Int)],
                |w, args| {
                    let amount = arg("Increment", args, 0)?;
                    bar(w, "Increment")?.increment(amount);
                    Ok(None)
                },
            )),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_saturates_at_maximum() {
        let mut bar = ProgressBar::new();
        bar.step = 40;
        bar.increment(bar.step);
        bar.increment(bar.step);
        bar.increment(bar.step);
        assert_eq!(bar.value(), 100);
        bar.increment(-500);
        assert_eq!(bar.value(), 0);
    }

    #[test]
    fn value_outside_range_is_rejected() {
        let mut bar = ProgressBar::new();
        assert!(bar.set_value(101).is_err());
        assert!(bar.set_value(50).is_ok());
        bar.set_range(0, 20);
        assert_eq!(bar.value(), 20);
    }
}
