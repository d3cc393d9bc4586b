/*
 * The host engine as seen by the plugin: configuration reads for the measure
 * being reloaded, a log sink for skin authors, and command execution for
 * event callbacks. `MemoryHost` is an in-process implementation used by tests
 * and by embedders that drive the plugin without the native ABI.
 */
use std::cell::RefCell;
use std::collections::HashMap;

use log::Level;

use crate::types::SkinId;

pub trait Host {
    /// Reads a configuration value, returning `default` when the key is absent.
    fn read_string(&self, key: &str, default: &str) -> String;

    fn read_int(&self, key: &str, default: i32) -> i32 {
        let raw = self.read_string(key, "");
        parse_number(&raw).map_or(default, |v| v as i32)
    }

    fn read_double(&self, key: &str, default: f64) -> f64 {
        let raw = self.read_string(key, "");
        parse_number(&raw).unwrap_or(default)
    }

    fn measure_name(&self) -> String;

    fn skin(&self) -> SkinId;

    fn log(&self, level: Level, message: &str);

    /// Runs a command string in the context of the measure's skin.
    fn execute(&self, command: &str);
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/*
 * Routes user-facing diagnostics to the host log and mirrors them into the
 * `log` facade. Debug diagnostics only reach the host in debug builds.
 */
pub(crate) struct Diagnostics<'a> {
    host: &'a dyn Host,
}

impl<'a> Diagnostics<'a> {
    pub(crate) fn new(host: &'a dyn Host) -> Self {
        Self { host }
    }

    pub(crate) fn error(&self, message: &str) {
        log::error!("{message}");
        self.host.log(Level::Error, message);
    }

    pub(crate) fn notice(&self, message: &str) {
        log::info!("{message}");
        self.host.log(Level::Info, message);
    }

    pub(crate) fn debug(&self, message: &str) {
        log::debug!("{message}");
        if cfg!(debug_assertions) {
            self.host.log(Level::Debug, message);
        }
    }

    pub(crate) fn property_value_not_valid(&self, value: &str, property: &str, type_name: &str) {
        self.error(&format!(
            "RainForms: The value {value} for property {property} is not valid, it needs to be of type {type_name}"
        ));
    }
}

/// In-memory host. Option keys are case-insensitive, like skin files.
#[derive(Debug)]
pub struct MemoryHost {
    skin: SkinId,
    measure_name: String,
    options: RefCell<HashMap<String, String>>,
    log: RefCell<Vec<(Level, String)>>,
    executed: RefCell<Vec<String>>,
}

impl MemoryHost {
    pub fn new(skin: SkinId, measure_name: impl Into<String>) -> Self {
        Self {
            skin,
            measure_name: measure_name.into(),
            options: RefCell::new(HashMap::new()),
            log: RefCell::new(Vec::new()),
            executed: RefCell::new(Vec::new()),
        }
    }

    pub fn with_option(self, key: &str, value: &str) -> Self {
        self.set_option(key, value);
        self
    }

    pub fn set_option(&self, key: &str, value: &str) {
        self.options
            .borrow_mut()
            .insert(key.to_ascii_lowercase(), value.to_string());
    }

    pub fn remove_option(&self, key: &str) {
        self.options.borrow_mut().remove(&key.to_ascii_lowercase());
    }

    pub fn logged(&self) -> Vec<(Level, String)> {
        self.log.borrow().clone()
    }

    pub fn has_logged(&self, level: Level, fragment: &str) -> bool {
        self.log
            .borrow()
            .iter()
            .any(|(l, message)| *l == level && message.contains(fragment))
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl Host for MemoryHost {
    fn read_string(&self, key: &str, default: &str) -> String {
        self.options
            .borrow()
            .get(&key.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn measure_name(&self) -> String {
        self.measure_name.clone()
    }

    fn skin(&self) -> SkinId {
        self.skin
    }

    fn log(&self, level: Level, message: &str) {
        self.log.borrow_mut().push((level, message.to_string()));
    }

    fn execute(&self, command: &str) {
        self.executed.borrow_mut().push(command.to_string());
    }
}
