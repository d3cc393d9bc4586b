/*
 * The host-facing lifecycle of the plugin. `Plugin` owns the widget library
 * and every live measure; each entry point maps one host callback. Entry
 * points never panic: configuration errors mark the measure invalid and are
 * reported to the host log, and an invalid measure answers with neutral
 * values until a later reload succeeds.
 *
 * Entry points only queue the events they raise. The caller delivers them
 * with `Plugin::pump_events` once it no longer holds the plugin, so a handler
 * whose command re-enters the plugin (a bang aimed at another measure) finds
 * it free.
 */
use std::rc::Rc;

use crate::command_executor;
use crate::controls::{self, WidgetRef};
use crate::error::Result;
use crate::host::{Diagnostics, Host};
use crate::library::WidgetLibrary;
use crate::measure::{Measure, MeasureRegistry};
use crate::types::MeasureId;
use crate::widget_tree;

pub struct Plugin {
    library: WidgetLibrary,
    measures: MeasureRegistry,
}

impl Default for Plugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin {
    /// A plugin bound to the built-in control set.
    pub fn new() -> Self {
        Self::with_library(WidgetLibrary::standard())
    }

    pub fn with_library(library: WidgetLibrary) -> Self {
        Self {
            library,
            measures: MeasureRegistry::new(),
        }
    }

    pub fn library(&self) -> &WidgetLibrary {
        &self.library
    }

    pub fn measures(&self) -> &MeasureRegistry {
        &self.measures
    }

    pub fn create(&mut self, host: Rc<dyn Host>) -> MeasureId {
        let measure = Measure::new(host);
        log::debug!(
            "Plugin: Creating measure '{}' in {:?}",
            measure.name(),
            measure.skin()
        );
        self.measures.insert(measure)
    }

    /*
     * Re-applies the measure's configuration. Returns the maximum value hint
     * for the host: 1.0 for measures whose value is a checked state, `None`
     * when the host's default should stand.
     */
    pub fn reload(&mut self, id: MeasureId, host: Rc<dyn Host>) -> Result<Option<f64>> {
        self.measures.get_mut(id)?.host = Rc::clone(&host);
        let outcome = widget_tree::attach(&self.library, &mut self.measures, id, &host);
        let measure = self.measures.get_mut(id)?;
        let result = match outcome {
            Ok(()) => {
                measure.invalid = false;
                let is_checkable = measure
                    .widget()
                    .is_some_and(|w| w.borrow().checked_state().is_some());
                Ok(is_checkable.then_some(1.0))
            }
            Err(e) => {
                measure.invalid = true;
                let diagnostics = Diagnostics::new(host.as_ref());
                diagnostics.error(&format!("RainForms: {e}"));
                if !e.is_configuration_error() {
                    log::warn!("Plugin: Reload of '{}' failed: {e:?}", measure.name());
                }
                Ok(None)
            }
        };
        result
    }

    /// The measure's numeric value: the checked state of checkable widgets.
    pub fn update(&mut self, id: MeasureId) -> Result<f64> {
        let measure = self.measures.get(id)?;
        let value = if measure.is_invalid() {
            0.0
        } else {
            measure
                .widget()
                .and_then(|w| w.try_borrow().ok().and_then(|w| w.checked_state()))
                .map_or(0.0, |checked| if checked { 1.0 } else { 0.0 })
        };
        Ok(value)
    }

    /*
     * The measure's string value: the text of text-input widgets. The
     * returned slice stays valid until the next call for this measure.
     */
    pub fn get_string(&mut self, id: MeasureId) -> Result<&str> {
        let measure = self.measures.get_mut(id)?;
        let text = if measure.is_invalid() {
            None
        } else {
            measure
                .widget()
                .and_then(|w| w.try_borrow().ok().and_then(|w| w.input_text()))
        };
        measure.string_value = text.unwrap_or_default();
        Ok(&measure.string_value)
    }

    pub fn execute_bang(&mut self, id: MeasureId, command: &str) -> Result<()> {
        let measure = self.measures.get(id)?;
        command_executor::execute(&self.library, measure, command);
        Ok(())
    }

    /// Releases the measure's widget and removes the measure.
    pub fn finalize(&mut self, id: MeasureId) -> Result<()> {
        let mut measure = self.measures.remove(id)?;
        log::debug!("Plugin: Finalizing measure '{}'", measure.name());
        measure.release_widget();
        measure.string_value.clear();
        Ok(())
    }

    /// Delivers queued events. Must be called without a borrow of the plugin
    /// held, since handlers run host commands that may call back into it.
    pub fn pump_events() -> usize {
        controls::pump_events()
    }

    pub fn widget(&self, id: MeasureId) -> Result<Option<WidgetRef>> {
        Ok(self.measures.get(id)?.widget().cloned())
    }

    pub fn is_invalid(&self, id: MeasureId) -> Result<bool> {
        Ok(self.measures.get(id)?.is_invalid())
    }
}
