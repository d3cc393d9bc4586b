/*
 * Windows exports implementing the Rainmeter plugin ABI. The host API
 * (`RmReadString`, `RmReadFormula`, `RmGet`, `RmExecute`, `RmLog`) is resolved
 * from the already loaded `Rainmeter.dll` at first use, so the plugin links
 * against nothing but system libraries.
 *
 * The plugin lives in a thread-local and is borrowed for the duration of each
 * export. Events raised during an export are pumped after that borrow is
 * released, so a handler's bang may call straight back into another export.
 * A call that still arrives while the state is borrowed is ignored with a
 * warning.
 *
 * The opaque `data` handle is `MeasureId::to_raw`, so a null handle is never
 * valid.
 */
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::rc::Rc;
use std::sync::OnceLock;

use log::Level;
use windows::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress};
use windows::core::{BOOL, PCSTR, PCWSTR, s, w};

use crate::host::Host;
use crate::plugin::Plugin;
use crate::types::{MeasureId, SkinId};

type RmReadStringFn =
    unsafe extern "system" fn(rm: *mut c_void, option: PCWSTR, default: PCWSTR, replace: BOOL) -> PCWSTR;
type RmReadFormulaFn = unsafe extern "system" fn(rm: *mut c_void, option: PCWSTR, default: f64) -> f64;
type RmGetFn = unsafe extern "system" fn(rm: *mut c_void, kind: i32) -> *mut c_void;
type RmExecuteFn = unsafe extern "system" fn(skin: *mut c_void, command: PCWSTR);
type RmLogFn = unsafe extern "system" fn(rm: *mut c_void, level: i32, message: PCWSTR);

const RMG_MEASURENAME: i32 = 0;
const RMG_SKIN: i32 = 1;

const LOG_ERROR: i32 = 1;
const LOG_WARNING: i32 = 2;
const LOG_NOTICE: i32 = 3;
const LOG_DEBUG: i32 = 4;

#[derive(Clone, Copy)]
struct HostApi {
    read_string: RmReadStringFn,
    read_formula: RmReadFormulaFn,
    get: RmGetFn,
    execute: RmExecuteFn,
    log: RmLogFn,
}

fn host_api() -> Option<HostApi> {
    static API: OnceLock<Option<HostApi>> = OnceLock::new();
    *API.get_or_init(|| unsafe {
        let module = match GetModuleHandleW(w!("Rainmeter.dll")) {
            Ok(module) => module,
            Err(err) => {
                log::error!("Ffi: Rainmeter.dll is not loaded: {err:?}");
                return None;
            }
        };
        let proc = |name: PCSTR| GetProcAddress(module, name);
        let api = HostApi {
            read_string: std::mem::transmute::<unsafe extern "system" fn() -> isize, RmReadStringFn>(
                proc(s!("RmReadString"))?,
            ),
            read_formula: std::mem::transmute::<unsafe extern "system" fn() -> isize, RmReadFormulaFn>(
                proc(s!("RmReadFormula"))?,
            ),
            get: std::mem::transmute::<unsafe extern "system" fn() -> isize, RmGetFn>(proc(s!("RmGet"))?),
            execute: std::mem::transmute::<unsafe extern "system" fn() -> isize, RmExecuteFn>(
                proc(s!("RmExecute"))?,
            ),
            log: std::mem::transmute::<unsafe extern "system" fn() -> isize, RmLogFn>(proc(s!("RmLog"))?),
        };
        log::debug!("Ffi: Resolved Rainmeter host API");
        Some(api)
    })
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

unsafe fn from_wide(text: PCWSTR) -> String {
    if text.is_null() {
        return String::new();
    }
    unsafe { text.to_string() }.unwrap_or_default()
}

/// The host as seen through one measure's `rm` pointer.
struct RainmeterHost {
    api: HostApi,
    rm: *mut c_void,
}

impl Host for RainmeterHost {
    fn read_string(&self, key: &str, default: &str) -> String {
        let key = wide(key);
        let default = wide(default);
        unsafe {
            let value = (self.api.read_string)(
                self.rm,
                PCWSTR(key.as_ptr()),
                PCWSTR(default.as_ptr()),
                BOOL(1),
            );
            from_wide(value)
        }
    }

    // Numeric options go through the formula parser, like RmReadInt/RmReadDouble.
    fn read_int(&self, key: &str, default: i32) -> i32 {
        self.read_double(key, f64::from(default)) as i32
    }

    fn read_double(&self, key: &str, default: f64) -> f64 {
        let key = wide(key);
        unsafe { (self.api.read_formula)(self.rm, PCWSTR(key.as_ptr()), default) }
    }

    fn measure_name(&self) -> String {
        unsafe { from_wide(PCWSTR((self.api.get)(self.rm, RMG_MEASURENAME) as *const u16)) }
    }

    fn skin(&self) -> SkinId {
        SkinId(unsafe { (self.api.get)(self.rm, RMG_SKIN) } as usize)
    }

    fn log(&self, level: Level, message: &str) {
        let level = match level {
            Level::Error => LOG_ERROR,
            Level::Warn => LOG_WARNING,
            Level::Info => LOG_NOTICE,
            Level::Debug | Level::Trace => LOG_DEBUG,
        };
        let message = wide(message);
        unsafe { (self.api.log)(self.rm, level, PCWSTR(message.as_ptr())) }
    }

    fn execute(&self, command: &str) {
        let command = wide(command);
        unsafe {
            let skin = (self.api.get)(self.rm, RMG_SKIN);
            (self.api.execute)(skin, PCWSTR(command.as_ptr()));
        }
    }
}

#[derive(Default)]
struct FfiState {
    plugin: Plugin,
    strings: HashMap<MeasureId, Vec<u16>>,
}

thread_local! {
    static STATE: RefCell<FfiState> = RefCell::new(FfiState::default());
}

fn with_state<R>(entry: &str, f: impl FnOnce(&mut FfiState) -> R) -> Option<R> {
    STATE.with(|state| match state.try_borrow_mut() {
        Ok(mut state) => Some(f(&mut state)),
        Err(_) => {
            log::warn!("Ffi: Reentrant {entry} ignored");
            None
        }
    })
}

// Runs `f` against the plugin, then delivers the events it raised with the
// state released.
fn with_state_then_pump<R>(entry: &str, f: impl FnOnce(&mut FfiState) -> R) -> Option<R> {
    let result = with_state(entry, f);
    Plugin::pump_events();
    result
}

fn host_for(rm: *mut c_void) -> Option<Rc<dyn Host>> {
    if rm.is_null() {
        return None;
    }
    let api = host_api()?;
    Some(Rc::new(RainmeterHost { api, rm }))
}

fn measure_id(data: *mut c_void) -> Option<MeasureId> {
    MeasureId::from_raw(data as usize as u64)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Initialize(data: *mut *mut c_void, rm: *mut c_void) {
    if data.is_null() {
        return;
    }
    let Some(host) = host_for(rm) else {
        return;
    };
    let handle = with_state("Initialize", |state| state.plugin.create(host)).and_then(|id| {
        usize::try_from(id.to_raw())
            .inspect_err(|_| log::error!("Ffi: Measure handle {id:?} does not fit a pointer"))
            .ok()
    });
    if let Some(handle) = handle {
        unsafe { *data = handle as *mut c_void };
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Reload(data: *mut c_void, rm: *mut c_void, max_value: *mut f64) {
    let (Some(id), Some(host)) = (measure_id(data), host_for(rm)) else {
        return;
    };
    let outcome = with_state_then_pump("Reload", |state| state.plugin.reload(id, host));
    match outcome {
        Some(Ok(Some(max))) if !max_value.is_null() => unsafe { *max_value = max },
        Some(Err(e)) => log::error!("Ffi: Reload failed: {e}"),
        _ => {}
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Update(data: *mut c_void) -> f64 {
    let Some(id) = measure_id(data) else {
        return 0.0;
    };
    match with_state_then_pump("Update", |state| state.plugin.update(id)) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            log::error!("Ffi: Update failed: {e}");
            0.0
        }
        None => 0.0,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn GetString(data: *mut c_void) -> PCWSTR {
    let Some(id) = measure_id(data) else {
        return PCWSTR::null();
    };
    with_state("GetString", |state| {
        let text = match state.plugin.get_string(id) {
            Ok(text) => text.to_string(),
            Err(e) => {
                log::error!("Ffi: GetString failed: {e}");
                return PCWSTR::null();
            }
        };
        let buffer = state.strings.entry(id).or_default();
        *buffer = wide(&text);
        PCWSTR(buffer.as_ptr())
    })
    .unwrap_or(PCWSTR::null())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn ExecuteBang(data: *mut c_void, args: PCWSTR) {
    let Some(id) = measure_id(data) else {
        return;
    };
    let command = unsafe { from_wide(args) };
    if let Some(Err(e)) = with_state_then_pump("ExecuteBang", |state| state.plugin.execute_bang(id, &command)) {
        log::error!("Ffi: ExecuteBang failed: {e}");
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Finalize(data: *mut c_void) {
    let Some(id) = measure_id(data) else {
        return;
    };
    let outcome = with_state_then_pump("Finalize", |state| {
        state.strings.remove(&id);
        state.plugin.finalize(id)
    });
    if let Some(Err(e)) = outcome {
        log::error!("Ffi: Finalize failed: {e}");
    }
}
