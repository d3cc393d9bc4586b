/*
 * Builds and maintains the control tree from measure configuration. On each
 * reload a measure's widget is created (or reused), configured, and placed
 * inside the widget of the measure named by `ParentName`. Children of a
 * TabControl are placed inside the page named by `TabName`.
 */
use std::rc::Rc;

use crate::controls::tab_control_handler::ensure_tab_page;
use crate::controls::{WidgetRef, add_child};
use crate::error::{PluginError, Result};
use crate::host::Host;
use crate::library::WidgetLibrary;
use crate::measure::MeasureRegistry;
use crate::property_binder;
use crate::type_resolver;
use crate::types::MeasureId;

pub fn attach(
    library: &WidgetLibrary,
    registry: &mut MeasureRegistry,
    id: MeasureId,
    host: &Rc<dyn Host>,
) -> Result<()> {
    let type_name = host.read_string("Type", "");
    let descriptor = type_resolver::resolve_widget(library, &type_name)?;

    let widget = {
        let measure = registry.get_mut(id)?;
        let reusable = measure.widget.clone().filter(|widget| {
            !measure.invalid
                && measure.type_name.as_deref() == Some(descriptor.name.as_str())
                && !widget.borrow().core().is_disposed()
        });
        match reusable {
            Some(widget) => widget,
            None => {
                measure.release_widget();
                let create = descriptor.widget_factory().ok_or_else(|| {
                    PluginError::OperationFailed(format!(
                        "{} cannot be created",
                        descriptor.full_name()
                    ))
                })?;
                log::debug!(
                    "WidgetTree: Creating {} for '{}'",
                    descriptor.name,
                    measure.name()
                );
                let widget = create();
                widget.borrow_mut().core_mut().set_name(measure.name());
                measure.widget = Some(widget.clone());
                measure.type_name = Some(descriptor.name.clone());
                widget
            }
        }
    };

    property_binder::bind(
        library,
        &widget,
        descriptor,
        host,
        &mut registry.get_mut(id)?.bindings,
    );

    let tab_name = host.read_string("TabName", "");
    registry.get_mut(id)?.tab_name = tab_name.clone();

    if widget.borrow().is_top_level() {
        registry.get_mut(id)?.parent = None;
        return Ok(());
    }

    let parent_name = host.read_string("ParentName", "");
    let (parent_id, parent_widget) = find_parent(registry, id, &parent_name)
        .ok_or_else(|| PluginError::MissingParent(descriptor.full_name()))?;
    if parent_id == id {
        return Err(PluginError::CircularParent(
            registry.get(id)?.name().to_string(),
        ));
    }

    let is_tab_container = parent_widget.borrow().is_tab_container();
    if is_tab_container {
        if tab_name.is_empty() {
            return Err(PluginError::MissingTabName(
                registry.get(id)?.name().to_string(),
            ));
        }
        let page = ensure_tab_page(&parent_widget, &tab_name)?;
        add_child(&page, &widget)?;
    } else {
        add_child(&parent_widget, &widget)?;
    }
    registry.get_mut(id)?.parent = Some(parent_id);
    Ok(())
}

fn find_parent(
    registry: &MeasureRegistry,
    id: MeasureId,
    parent_name: &str,
) -> Option<(MeasureId, WidgetRef)> {
    let skin = registry.get(id).ok()?.skin();
    let parent_id = registry.find_in_skin(skin, parent_name)?;
    let widget = registry
        .get(parent_id)
        .ok()?
        .widget()
        .filter(|widget| !widget.borrow().core().is_disposed())?
        .clone();
    Some((parent_id, widget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::measure::Measure;
    use crate::types::SkinId;

    struct Fixture {
        library: WidgetLibrary,
        registry: MeasureRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                library: WidgetLibrary::standard(),
                registry: MeasureRegistry::new(),
            }
        }

        fn add(&mut self, name: &str, options: &[(&str, &str)]) -> (MeasureId, Rc<dyn Host>) {
            let mut host = MemoryHost::new(SkinId(1), name);
            for (key, value) in options {
                host = host.with_option(key, value);
            }
            let host: Rc<dyn Host> = Rc::new(host);
            let id = self.registry.insert(Measure::new(host.clone()));
            (id, host)
        }

        fn attach(&mut self, id: MeasureId, host: &Rc<dyn Host>) -> Result<()> {
            attach(&self.library, &mut self.registry, id, host)
        }

        fn widget(&self, id: MeasureId) -> WidgetRef {
            self.registry.get(id).unwrap().widget().unwrap().clone()
        }
    }

    #[test]
    fn children_are_placed_in_their_parent() {
        let mut fx = Fixture::new();
        let (form, form_host) = fx.add("Form1", &[("Type", "Form")]);
        let (button, button_host) = fx.add("Btn", &[("Type", "Button"), ("ParentName", "Form1")]);
        fx.attach(form, &form_host).unwrap();
        fx.attach(button, &button_host).unwrap();

        let children = fx.widget(form).borrow().core().children().to_vec();
        assert_eq!(children.len(), 1);
        assert!(Rc::ptr_eq(&children[0], &fx.widget(button)));
        assert_eq!(fx.registry.get(button).unwrap().parent(), Some(form));
    }

    #[test]
    fn reload_with_the_same_type_reuses_the_widget() {
        let mut fx = Fixture::new();
        let (form, host) = fx.add("Form1", &[("Type", "Form")]);
        fx.attach(form, &host).unwrap();
        let first = fx.widget(form);
        fx.attach(form, &host).unwrap();
        assert!(Rc::ptr_eq(&first, &fx.widget(form)));
    }

    #[test]
    fn a_type_change_disposes_the_old_widget() {
        let mut fx = Fixture::new();
        let (form, form_host) = fx.add("Form1", &[("Type", "Form")]);
        let (id, host) = fx.add("Ctl", &[("Type", "Button"), ("ParentName", "Form1")]);
        fx.attach(form, &form_host).unwrap();
        fx.attach(id, &host).unwrap();
        let old = fx.widget(id);

        let host: Rc<dyn Host> = Rc::new(
            MemoryHost::new(SkinId(1), "Ctl")
                .with_option("Type", "Label")
                .with_option("ParentName", "Form1"),
        );
        fx.attach(id, &host).unwrap();

        assert!(old.borrow().core().is_disposed());
        assert_eq!(fx.registry.get(id).unwrap().type_name(), Some("Label"));
        assert_eq!(fx.widget(form).borrow().core().children().len(), 1);
    }

    #[test]
    fn missing_parent_names_the_type() {
        let mut fx = Fixture::new();
        let (id, host) = fx.add("Btn", &[("Type", "Button"), ("ParentName", "Nowhere")]);
        let err = fx.attach(id, &host).unwrap_err();
        assert_eq!(err.to_string(), "RainForms.Controls.Button needs a parent.");
    }

    #[test]
    fn self_parenting_is_circular() {
        let mut fx = Fixture::new();
        let (id, host) = fx.add("Box", &[("Type", "Panel"), ("ParentName", "Box")]);
        assert!(matches!(
            fx.attach(id, &host),
            Err(PluginError::CircularParent(name)) if name == "Box"
        ));
    }

    #[test]
    fn tab_children_need_a_tab_name_and_share_pages() {
        let mut fx = Fixture::new();
        let (form, form_host) = fx.add("Form1", &[("Type", "Form")]);
        let (tabs, tabs_host) = fx.add("Tabs", &[("Type", "TabControl"), ("ParentName", "Form1")]);
        let (a, a_host) = fx.add(
            "A",
            &[("Type", "CheckBox"), ("ParentName", "Tabs"), ("TabName", "General")],
        );
        let (b, b_host) = fx.add(
            "B",
            &[("Type", "Label"), ("ParentName", "Tabs"), ("TabName", "General")],
        );
        let (c, c_host) = fx.add("C", &[("Type", "Label"), ("ParentName", "Tabs")]);
        for (id, host) in [(form, &form_host), (tabs, &tabs_host), (a, &a_host), (b, &b_host)] {
            fx.attach(id, host).unwrap();
        }

        let pages = fx.widget(tabs).borrow().core().children().to_vec();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].borrow().core().text(), "General");
        assert_eq!(pages[0].borrow().core().children().len(), 2);

        assert!(matches!(
            fx.attach(c, &c_host),
            Err(PluginError::MissingTabName(name)) if name == "C"
        ));
    }
}
