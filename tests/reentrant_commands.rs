//! Event commands that call back into the plugin. The host layer keeps the
//! plugin in a thread-local that each entry point borrows; a click handler
//! whose bang targets another measure must find that borrow released.

use std::cell::RefCell;
use std::rc::Rc;

use log::Level;
use rainforms::{Host, MeasureId, MemoryHost, Plugin, SkinId};

const SKIN: SkinId = SkinId(3);

thread_local! {
    static PLUGIN: RefCell<Plugin> = RefCell::new(Plugin::new());
    static REFUSED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

// Same shape as the native exports: borrow, run, release, then pump.
fn enter<R>(entry: &str, f: impl FnOnce(&mut Plugin) -> R) -> Option<R> {
    let result = PLUGIN.with(|plugin| match plugin.try_borrow_mut() {
        Ok(mut plugin) => Some(f(&mut plugin)),
        Err(_) => {
            REFUSED.with(|refused| refused.borrow_mut().push(entry.to_string()));
            None
        }
    });
    Plugin::pump_events();
    result
}

/// Host that runs `[!CommandMeasure Name "args"]` synchronously, like the
/// skin engine does.
struct BangHost {
    inner: MemoryHost,
}

fn command_measure(command: &str) -> Option<(&str, &str)> {
    let body = command.strip_prefix("[!CommandMeasure ")?.strip_suffix(']')?;
    let (name, args) = body.split_once(' ')?;
    Some((name, args.trim().trim_matches('"')))
}

impl Host for BangHost {
    fn read_string(&self, key: &str, default: &str) -> String {
        self.inner.read_string(key, default)
    }

    fn measure_name(&self) -> String {
        self.inner.measure_name()
    }

    fn skin(&self) -> SkinId {
        self.inner.skin()
    }

    fn log(&self, level: Level, message: &str) {
        self.inner.log(level, message);
    }

    fn execute(&self, command: &str) {
        self.inner.execute(command);
        if let Some((target, args)) = command_measure(command) {
            enter("ExecuteBang", |plugin| {
                let id = plugin.measures().find_in_skin(SKIN, target)?;
                plugin.execute_bang(id, args).ok()
            });
        }
    }
}

fn measure(name: &str, options: &[(&str, &str)]) -> (MeasureId, Rc<BangHost>) {
    let inner = options
        .iter()
        .fold(MemoryHost::new(SKIN, name), |host, (key, value)| {
            host.with_option(key, value)
        });
    let host = Rc::new(BangHost { inner });
    let id = enter("Initialize", |plugin| {
        let id = plugin.create(host.clone());
        plugin.reload(id, host.clone()).map(|_| id)
    })
    .expect("plugin is free")
    .expect("reload succeeds");
    (id, host)
}

fn text_of(id: MeasureId) -> String {
    enter("GetString", |plugin| plugin.get_string(id).map(str::to_string))
        .expect("plugin is free")
        .expect("measure is live")
}

#[test]
fn click_command_can_drive_another_measure() {
    measure("Form1", &[("Type", "Form")]);
    let (input, _) = measure("Box", &[("Type", "TextBox"), ("ParentName", "Form1")]);
    let (button, button_host) = measure(
        "Go",
        &[
            ("Type", "Button"),
            ("ParentName", "Form1"),
            ("OnClick", "[!CommandMeasure Box \"SetText clicked\"]"),
        ],
    );

    enter("ExecuteBang", |plugin| plugin.execute_bang(button, "PerformClick"));

    assert_eq!(text_of(input), "clicked");
    assert_eq!(
        button_host.inner.executed(),
        vec!["[!CommandMeasure Box \"SetText clicked\"]".to_string()]
    );
    assert!(REFUSED.with(|refused| refused.borrow().is_empty()));
}

#[test]
fn commands_chain_through_several_measures() {
    measure("Form1", &[("Type", "Form")]);
    let (echo, _) = measure("Echo", &[("Type", "TextBox"), ("ParentName", "Form1")]);
    let (input, _) = measure(
        "Box",
        &[
            ("Type", "TextBox"),
            ("ParentName", "Form1"),
            ("OnTextChanged", "[!CommandMeasure Echo \"SetText echoed\"]"),
        ],
    );
    let (button, _) = measure(
        "Go",
        &[
            ("Type", "Button"),
            ("ParentName", "Form1"),
            ("OnClick", "[!CommandMeasure Box \"SetText typed\"]"),
        ],
    );

    enter("ExecuteBang", |plugin| plugin.execute_bang(button, "PerformClick"));

    assert_eq!(text_of(input), "typed");
    assert_eq!(text_of(echo), "echoed");
    assert!(REFUSED.with(|refused| refused.borrow().is_empty()));
}
