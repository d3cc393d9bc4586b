/*
 * Tabbed container. Children of a TabControl live inside named TabPage
 * children; the control tree creates a page the first time a measure names
 * it in `TabName` and reuses it afterwards.
 */
use std::any::Any;

use super::FORMS_NAMESPACE;
use super::control::{
    ControlCore, Widget, WidgetRef, add_child, downcast, downcast_mut, enum_bits, new_widget,
};
use super::drawing::Size;
use super::enums::TAB_ALIGNMENT_TOP;
use crate::error::{PluginError, Result};
use crate::library::{Callable, Parameter, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Value, ValueType, arg, value_as};

#[derive(Debug)]
pub struct TabControl {
    core: ControlCore,
    selected_index: i32,
    alignment: i64,
}

impl TabControl {
    pub fn new() -> Self {
        Self {
            core: ControlCore::new(Size::new(200, 100)),
            selected_index: -1,
            alignment: TAB_ALIGNMENT_TOP,
        }
    }

    /// Names of the pages in display order. Busy pages are reported unnamed.
    pub fn page_names(&self) -> Vec<String> {
        self.core
            .children()
            .iter()
            .filter_map(|child| match child.try_borrow() {
                Ok(page) => page
                    .as_any()
                    .is::<TabPage>()
                    .then(|| page.core().name().to_string()),
                Err(_) => Some(String::new()),
            })
            .collect()
    }

    pub fn selected_index(&self) -> i32 {
        self.selected_index
    }

    pub fn select_index(&mut self, index: i32) -> Result<()> {
        let count = self.page_names().len() as i32;
        if index < -1 || index >= count {
            return Err(PluginError::invocation(
                "SelectedIndex",
                format!("{index} is out of range for {count} page(s)"),
            ));
        }
        if self.selected_index != index {
            self.selected_index = index;
            self.core.raise("SelectedIndexChanged");
        }
        Ok(())
    }

    pub fn select_tab(&mut self, name: &str) -> Result<()> {
        let index = self
            .page_names()
            .iter()
            .position(|page| page == name)
            .ok_or_else(|| PluginError::invocation("SelectTab", format!("no tab named {name}")))?;
        self.select_index(index as i32)
    }
}

impl Default for TabControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for TabControl {
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

    fn is_tab_container(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct TabPage {
    core: ControlCore,
}

impl TabPage {
    pub fn new(name: &str) -> Self {
        let mut core = ControlCore::new(Size::new(192, 74));
        core.set_name(name);
        core.set_text(name);
        Self { core }
    }
}

impl Widget for TabPage {
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

/*
 * Returns the page whose name matches `key` ignoring ASCII case, creating
 * and appending it when missing. The first page created becomes the selected page.
 */
pub fn ensure_tab_page(tab_control: &WidgetRef, key: &str) -> Result<WidgetRef> {
    let existing = tab_control
        .borrow()
        .core()
        .children()
        .iter()
        .find(|child| {
            child
                .try_borrow()
                .is_ok_and(|page| {
                    page.as_any().is::<TabPage>() && page.core().name().eq_ignore_ascii_case(key)
                })
        })
        .cloned();
    if let Some(page) = existing {
        return Ok(page);
    }

    log::debug!("TabControlHandler: Creating page '{key}'");
    let page = new_widget(TabPage::new(key));
    add_child(tab_control, &page)?;

    let mut guard = tab_control.borrow_mut();
    if let Some(tabs) = guard.as_any_mut().downcast_mut::<TabControl>() {
        if tabs.selected_index < 0 {
            tabs.select_index(0)?;
        }
    }
    Ok(page)
}

fn create_tab_control() -> WidgetRef {
    new_widget(TabControl::new())
}

fn create_tab_page() -> WidgetRef {
    new_widget(TabPage::new(""))
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "TabControl", Some(create_tab_control))
            .base(super::BASE_WIDGET_TYPE)
            .property(PropertyDescriptor::new(
                "SelectedIndex",
                ValueType::Int,
                |w| Ok(Value::Int(downcast::<TabControl>(w, "SelectedIndex")?.selected_index)),
                |w, v| {
                    let index = value_as("SelectedIndex", &v)?;
                    downcast_mut::<TabControl>(w, "SelectedIndex")?.select_index(index)
                },
            ))
            .property(PropertyDescriptor::new(
                "Alignment",
                ValueType::enumeration("TabAlignment"),
                |w| {
                    let tabs = downcast::<TabControl>(w, "Alignment")?;
                    Ok(Value::enum_value("TabAlignment", tabs.alignment))
                },
                |w, v| {
                    downcast_mut::<TabControl>(w, "Alignment")?.alignment = enum_bits("Alignment", &v)?;
                    Ok(())
                },
            ))
            .property(PropertyDescriptor::read_only(
                "TabCount",
                ValueType::Int,
                |w| {
                    let tabs = downcast::<TabControl>(w, "TabCount")?;
                    Ok(Value::Int(tabs.page_names().len() as i32))
                },
            ))
            .event("SelectedIndexChanged")
            .method(Callable::method(
                "SelectTab",
                vec![Parameter::new("tabPageName", ValueType::String)],
                |w, args| {
                    let name: String = arg("SelectTab", args, 0)?;
                    downcast_mut::<TabControl>(w, "SelectTab")?.select_tab(&name)?;
                    Ok(None)
                },
            ))
            .method(Callable::method(
                "SelectTab",
                vec![Parameter::new("index", ValueType::Int)],
                |w, args| {
                    let index = arg("SelectTab", args, 0)?;
                    downcast_mut::<TabControl>(w, "SelectTab")?.select_index(index)?;
                    Ok(None)
                },
            )),
    );
    library.register(
        TypeDescriptor::widget(FORMS_NAMESPACE, "TabPage", Some(create_tab_page))
            .base(super::BASE_WIDGET_TYPE),
    );
}
