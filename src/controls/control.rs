/*
 * The retained control model. Every control embeds a `ControlCore` holding
 * the state shared by all controls (text, bounds, colors, visibility, child
 * collection, event table) and implements `Widget` to expose it. Controls are
 * shared as `WidgetRef` so a parent container can hold its children while the
 * owning measure keeps the strong reference that decides their lifetime.
 *
 * This module also registers the abstract `Control` base type whose members
 * every concrete control inherits.
 */
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::drawing::{Font, Padding, Point, Size};
use super::enums::{ANCHOR_TOP_LEFT, DOCK_NONE};
use super::events::{self, EventTable};
use super::FORMS_NAMESPACE;
use crate::error::{PluginError, Result};
use crate::library::{Callable, Parameter, PropertyDescriptor, TypeDescriptor, WidgetLibrary};
use crate::types::{Color, Value, ValueType, arg, value_as};

pub type WidgetRef = Rc<RefCell<dyn Widget>>;
pub type WeakWidgetRef = Weak<RefCell<dyn Widget>>;

pub trait Widget: Any + fmt::Debug {
    fn core(&self) -> &ControlCore;
    fn core_mut(&mut self) -> &mut ControlCore;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Self-hosting window that never needs a parent.
    fn is_top_level(&self) -> bool {
        false
    }

    /// Container that hosts its children inside named pages.
    fn is_tab_container(&self) -> bool {
        false
    }

    /// Checked state for checkbox-capable controls.
    fn checked_state(&self) -> Option<bool> {
        None
    }

    /// Current text for text-input-capable controls.
    fn input_text(&self) -> Option<String> {
        None
    }
}

pub struct ControlCore {
    self_ref: Option<WeakWidgetRef>,
    parent: Option<WeakWidgetRef>,
    children: Vec<WidgetRef>,
    events: EventTable,
    disposed: bool,
    name: String,
    text: String,
    visible: bool,
    enabled: bool,
    focused: bool,
    location: Point,
    size: Size,
    tab_index: i32,
    back_color: Color,
    fore_color: Color,
    font: Font,
    padding: Padding,
    dock: i64,
    anchor: i64,
}

impl fmt::Debug for ControlCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlCore")
            .field("name", &self.name)
            .field("text", &self.text)
            .field("children", &self.children.len())
            .field("disposed", &self.disposed)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl ControlCore {
    pub fn new(default_size: Size) -> Self {
        Self {
            self_ref: None,
            parent: None,
            children: Vec::new(),
            events: EventTable::default(),
            disposed: false,
            name: String::new(),
            text: String::new(),
            visible: true,
            enabled: true,
            focused: false,
            location: Point::default(),
            size: default_size,
            tab_index: 0,
            back_color: Color::default(),
            fore_color: Color::from_rgb(0, 0, 0),
            font: Font::default(),
            padding: Padding::default(),
            dock: DOCK_NONE,
            anchor: ANCHOR_TOP_LEFT,
        }
    }

    /// Queues `event` for delivery on the next event pump.
    pub fn raise(&self, event: &str) {
        if self.disposed {
            return;
        }
        if let Some(me) = &self.self_ref {
            events::enqueue(me.clone(), event, self.events.handlers(event));
        }
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventTable {
        &mut self.events
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn parent(&self) -> Option<WidgetRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn children(&self) -> &[WidgetRef] {
        &self.children
    }

    /// True when `other` is the cell that holds this control.
    pub fn is_self(&self, other: &WidgetRef) -> bool {
        self.self_ref
            .as_ref()
            .is_some_and(|me| Rc::downgrade(other).ptr_eq(me))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text != text {
            self.text = text;
            self.raise("TextChanged");
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.raise("VisibleChanged");
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.raise("EnabledChanged");
        }
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        if self.location != location {
            self.location = location;
            self.raise("Move");
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
            self.raise("Resize");
        }
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /*
     * Moves this control to the front (index 0) or back of its parent's
     * z-order. The parent is a different cell, so borrowing it here is fine
     * while the control itself is mutably borrowed.
     */
    fn reorder_in_parent(&self, to_front: bool) {
        let (Some(parent), Some(me)) = (self.parent(), self.self_ref.as_ref()) else {
            return;
        };
        let Ok(mut parent) = parent.try_borrow_mut() else {
            log::warn!("Control: Parent busy, cannot reorder {}", self.name);
            return;
        };
        let siblings = &mut parent.core_mut().children;
        if let Some(index) = siblings.iter().position(|c| Rc::downgrade(c).ptr_eq(me)) {
            let child = siblings.remove(index);
            if to_front {
                siblings.insert(0, child);
            } else {
                siblings.push(child);
            }
        }
    }
}

/// Wraps a freshly constructed control and wires its self reference.
pub fn new_widget<W: Widget>(widget: W) -> WidgetRef {
    let rc: WidgetRef = Rc::new(RefCell::new(widget));
    let weak = Rc::downgrade(&rc);
    rc.borrow_mut().core_mut().self_ref = Some(weak);
    rc
}

pub fn downcast<'a, T: Widget>(widget: &'a dyn Widget, member: &str) -> Result<&'a T> {
    widget.as_any().downcast_ref::<T>().ok_or_else(|| {
        PluginError::invocation(
            member,
            format!("member is not available on {}", widget.core().name()),
        )
    })
}

pub fn downcast_mut<'a, T: Widget>(widget: &'a mut dyn Widget, member: &str) -> Result<&'a mut T> {
    let name = widget.core().name().to_string();
    widget.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
        PluginError::invocation(member, format!("member is not available on {name}"))
    })
}

/// True when `ancestor` is `node` itself or appears in `node`'s parent chain.
pub fn is_ancestor_or_self(ancestor: &WidgetRef, node: &WidgetRef) -> bool {
    let mut current = Some(node.clone());
    while let Some(widget) = current {
        if Rc::ptr_eq(&widget, ancestor) {
            return true;
        }
        current = widget.borrow().core().parent();
    }
    false
}

/*
 * Places `child` inside `parent`'s child collection. Attaching to the current
 * parent again is a no-op; attaching elsewhere detaches from the old parent
 * first. Attaching a control under itself or one of its descendants fails.
 */
pub fn add_child(parent: &WidgetRef, child: &WidgetRef) -> Result<()> {
    if is_ancestor_or_self(child, parent) {
        return Err(PluginError::CircularParent(
            child.borrow().core().name().to_string(),
        ));
    }
    if parent.borrow().core().is_disposed() {
        return Err(PluginError::Disposed(
            parent.borrow().core().name().to_string(),
        ));
    }

    let current_parent = child.borrow().core().parent();
    if let Some(current) = current_parent {
        if Rc::ptr_eq(&current, parent) {
            return Ok(());
        }
        detach(child);
    }

    parent.borrow_mut().core_mut().children.push(child.clone());
    child.borrow_mut().core_mut().parent = Some(Rc::downgrade(parent));
    Ok(())
}

/// Removes `child` from its parent's collection, if it has one.
pub fn detach(child: &WidgetRef) {
    let parent = child
        .borrow_mut()
        .core_mut()
        .parent
        .take()
        .and_then(|weak| weak.upgrade());
    if let Some(parent) = parent {
        parent
            .borrow_mut()
            .core_mut()
            .children
            .retain(|c| !Rc::ptr_eq(c, child));
    }
}

/*
 * Releases a control: detaches it from its parent, drops its event
 * subscriptions and marks it disposed. Children that nothing else holds
 * (pages created by the control tree) are disposed with it; children owned by
 * other measures are only orphaned and re-attach on their next reload.
 */
pub fn dispose(widget: &WidgetRef) {
    detach(widget);
    let children = {
        let mut guard = widget.borrow_mut();
        let core = guard.core_mut();
        core.disposed = true;
        core.events.clear();
        std::mem::take(&mut core.children)
    };
    for child in children {
        child.borrow_mut().core_mut().parent = None;
        if Rc::strong_count(&child) == 1 {
            dispose(&child);
        }
    }
}

fn core_int(member: &str, value: &Value) -> Result<i32> {
    value_as(member, value)
}

pub(crate) fn register(library: &mut WidgetLibrary) {
    let descriptor = TypeDescriptor::widget(FORMS_NAMESPACE, super::BASE_WIDGET_TYPE, None)
        .property(PropertyDescriptor::new(
            "Name",
            ValueType::String,
            |w| Ok(Value::from(w.core().name())),
            |w, v| {
                w.core_mut().set_name(value_as::<String>("Name", &v)?);
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Text",
            ValueType::String,
            |w| Ok(Value::from(w.core().text())),
            |w, v| {
                w.core_mut().set_text(value_as::<String>("Text", &v)?);
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Visible",
            ValueType::Bool,
            |w| Ok(Value::Bool(w.core().visible())),
            |w, v| {
                w.core_mut().set_visible(value_as("Visible", &v)?);
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Enabled",
            ValueType::Bool,
            |w| Ok(Value::Bool(w.core().enabled())),
            |w, v| {
                w.core_mut().set_enabled(value_as("Enabled", &v)?);
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Left",
            ValueType::Int,
            |w| Ok(Value::Int(w.core().location().x)),
            |w, v| {
                let y = w.core().location().y;
                w.core_mut().set_location(Point::new(core_int("Left", &v)?, y));
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Top",
            ValueType::Int,
            |w| Ok(Value::Int(w.core().location().y)),
            |w, v| {
                let x = w.core().location().x;
                w.core_mut().set_location(Point::new(x, core_int("Top", &v)?));
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Width",
            ValueType::Int,
            |w| Ok(Value::Int(w.core().size().width)),
            |w, v| {
                let height = w.core().size().height;
                w.core_mut()
                    .set_size(Size::new(core_int("Width", &v)?, height));
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Height",
            ValueType::Int,
            |w| Ok(Value::Int(w.core().size().height)),
            |w, v| {
                let width = w.core().size().width;
                w.core_mut()
                    .set_size(Size::new(width, core_int("Height", &v)?));
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "TabIndex",
            ValueType::Int,
            |w| Ok(Value::Int(w.core().tab_index)),
            |w, v| {
                let index = core_int("TabIndex", &v)?;
                if index < 0 {
                    return Err(PluginError::invocation("TabIndex", "must not be negative"));
                }
                w.core_mut().tab_index = index;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "BackColor",
            ValueType::Color,
            |w| Ok(Value::Color(w.core().back_color)),
            |w, v| {
                w.core_mut().back_color = value_as("BackColor", &v)?;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "ForeColor",
            ValueType::Color,
            |w| Ok(Value::Color(w.core().fore_color)),
            |w, v| {
                w.core_mut().fore_color = value_as("ForeColor", &v)?;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Font",
            ValueType::reference("Font"),
            |w| Ok(Value::from(w.core().font.clone())),
            |w, v| {
                w.core_mut().font = value_as("Font", &v)?;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Size",
            ValueType::reference("Size"),
            |w| Ok(Value::from(w.core().size())),
            |w, v| {
                w.core_mut().set_size(value_as("Size", &v)?);
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Location",
            ValueType::reference("Point"),
            |w| Ok(Value::from(w.core().location())),
            |w, v| {
                w.core_mut().set_location(value_as("Location", &v)?);
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Padding",
            ValueType::reference("Padding"),
            |w| Ok(Value::from(w.core().padding)),
            |w, v| {
                w.core_mut().padding = value_as("Padding", &v)?;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Dock",
            ValueType::enumeration("DockStyle"),
            |w| Ok(Value::enum_value("DockStyle", w.core().dock)),
            |w, v| {
                w.core_mut().dock = enum_bits("Dock", &v)?;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::new(
            "Anchor",
            ValueType::enumeration("AnchorStyles"),
            |w| Ok(Value::enum_value("AnchorStyles", w.core().anchor)),
            |w, v| {
                w.core_mut().anchor = enum_bits("Anchor", &v)?;
                Ok(())
            },
        ))
        .property(PropertyDescriptor::read_only(
            "Focused",
            ValueType::Bool,
            |w| Ok(Value::Bool(w.core().focused())),
        ))
        .event("Click")
        .event("DoubleClick")
        .event("TextChanged")
        .event("VisibleChanged")
        .event("EnabledChanged")
        .event("Move")
        .event("Resize")
        .event("Layout")
        .method(Callable::method("Show", vec![], |w, _| {
            w.core_mut().set_visible(true);
            Ok(None)
        }))
        .method(Callable::method("Hide", vec![], |w, _| {
            w.core_mut().set_visible(false);
            Ok(None)
        }))
        .method(Callable::method("Focus", vec![], |w, _| {
            let core = w.core_mut();
            core.focused = core.visible && core.enabled;
            Ok(Some(Value::Bool(core.focused)))
        }))
        .method(Callable::method("BringToFront", vec![], |w, _| {
            w.core().reorder_in_parent(true);
            Ok(None)
        }))
        .method(Callable::method("SendToBack", vec![], |w, _| {
            w.core().reorder_in_parent(false);
            Ok(None)
        }))
        .method(Callable::method("PerformLayout", vec![], |w, _| {
            w.core().raise("Layout");
            Ok(None)
        }))
        .method(Callable::method(
            "SetBounds",
            vec![
                Parameter::new("x", ValueType::Int),
                Parameter::new("y", ValueType::Int),
                Parameter::new("width", ValueType::Int),
                Parameter::new("height", ValueType::Int),
            ],
            |w, args| {
                let core = w.core_mut();
                core.set_location(Point::new(
                    arg("SetBounds", args, 0)?,
                    arg("SetBounds", args, 1)?,
                ));
                core.set_size(Size::new(
                    arg("SetBounds", args, 2)?,
                    arg("SetBounds", args, 3)?,
                ));
                Ok(None)
            },
        ));
    library.register(descriptor);
}

pub(crate) fn enum_bits(member: &str, value: &Value) -> Result<i64> {
    value.as_enum_bits().ok_or_else(|| {
        PluginError::invocation(
            member,
            format!("expected an enum value, got {}", value.kind_name()),
        )
    })
}
