/*
 * Measures and the registry that owns them. A measure is one configuration
 * section in a skin bound to one widget. The registry is an arena of slots
 * addressed by generation-checked `MeasureId`s, so a stale host handle is
 * reported instead of aliasing a newer measure.
 */
use std::rc::Rc;

use crate::controls::{self, WidgetRef};
use crate::error::{PluginError, Result};
use crate::host::Host;
use crate::property_binder::EventBindings;
use crate::types::{MeasureId, SkinId};

pub struct Measure {
    name: String,
    skin: SkinId,
    sequence: u64,
    pub(crate) host: Rc<dyn Host>,
    pub(crate) type_name: Option<String>,
    pub(crate) widget: Option<WidgetRef>,
    pub(crate) parent: Option<MeasureId>,
    pub(crate) tab_name: String,
    pub(crate) invalid: bool,
    pub(crate) bindings: EventBindings,
    pub(crate) string_value: String,
}

impl std::fmt::Debug for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Measure")
            .field("name", &self.name)
            .field("skin", &self.skin)
            .field("type_name", &self.type_name)
            .field("parent", &self.parent)
            .field("tab_name", &self.tab_name)
            .field("invalid", &self.invalid)
            .finish_non_exhaustive()
    }
}

impl Measure {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            name: host.measure_name(),
            skin: host.skin(),
            sequence: 0,
            host,
            type_name: None,
            widget: None,
            parent: None,
            tab_name: String::new(),
            invalid: false,
            bindings: EventBindings::default(),
            string_value: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skin(&self) -> SkinId {
        self.skin
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn tab_name(&self) -> &str {
        &self.tab_name
    }

    pub fn parent(&self) -> Option<MeasureId> {
        self.parent
    }

    pub fn widget(&self) -> Option<&WidgetRef> {
        self.widget.as_ref()
    }

    /// Disposes the owned widget and forgets the subscriptions made on it.
    pub(crate) fn release_widget(&mut self) {
        if let Some(widget) = self.widget.take() {
            log::debug!("Measure: Releasing widget of '{}'", self.name);
            controls::dispose(&widget);
        }
        self.bindings.clear();
        self.type_name = None;
        self.parent = None;
    }
}

struct Slot {
    generation: u32,
    measure: Option<Measure>,
}

#[derive(Default)]
pub struct MeasureRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_sequence: u64,
}

impl MeasureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut measure: Measure) -> MeasureId {
        self.next_sequence += 1;
        measure.sequence = self.next_sequence;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.measure = Some(measure);
                MeasureId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    measure: Some(measure),
                });
                MeasureId::new(index, 0)
            }
        }
    }

    pub fn get(&self, id: MeasureId) -> Result<&Measure> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.measure.as_ref())
            .ok_or_else(|| PluginError::InvalidHandle(format!("{id:?}")))
    }

    pub fn get_mut(&mut self, id: MeasureId) -> Result<&mut Measure> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.measure.as_mut())
            .ok_or_else(|| PluginError::InvalidHandle(format!("{id:?}")))
    }

    pub fn remove(&mut self, id: MeasureId) -> Result<Measure> {
        let measure = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.measure.take())
            .ok_or_else(|| PluginError::InvalidHandle(format!("{id:?}")))?;
        self.free.push(id.index() as u32);
        Ok(measure)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasureId, &Measure)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.measure
                .as_ref()
                .map(|measure| (MeasureId::new(index as u32, slot.generation), measure))
        })
    }

    /// The earliest-created live measure named `name` in `skin`. Names are
    /// compared exactly.
    pub fn find_in_skin(&self, skin: SkinId, name: &str) -> Option<MeasureId> {
        self.iter()
            .filter(|(_, measure)| measure.skin == skin && measure.name == name)
            .min_by_key(|(_, measure)| measure.sequence)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn measure(skin: usize, name: &str) -> Measure {
        Measure::new(Rc::new(MemoryHost::new(SkinId(skin), name)))
    }

    #[test]
    fn stale_handles_are_rejected_after_slot_reuse() {
        let mut registry = MeasureRegistry::new();
        let first = registry.insert(measure(1, "A"));
        registry.remove(first).unwrap();
        let second = registry.insert(measure(1, "B"));

        assert_eq!(first.index(), second.index());
        assert!(matches!(registry.get(first), Err(PluginError::InvalidHandle(_))));
        assert_eq!(registry.get(second).unwrap().name(), "B");
        assert!(registry.remove(first).is_err());
    }

    #[test]
    fn parent_lookup_is_scoped_to_the_skin_and_prefers_the_oldest() {
        let mut registry = MeasureRegistry::new();
        let other_skin = registry.insert(measure(2, "Form1"));
        let oldest = registry.insert(measure(1, "Form1"));
        let newer = registry.insert(measure(1, "Form1"));

        assert_eq!(registry.find_in_skin(SkinId(1), "Form1"), Some(oldest));
        assert_eq!(registry.find_in_skin(SkinId(2), "Form1"), Some(other_skin));
        assert_eq!(registry.find_in_skin(SkinId(1), "form1"), None);

        registry.remove(oldest).unwrap();
        assert_eq!(registry.find_in_skin(SkinId(1), "Form1"), Some(newer));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reused_slots_sort_after_older_measures() {
        let mut registry = MeasureRegistry::new();
        let a = registry.insert(measure(1, "Tmp"));
        let kept = registry.insert(measure(1, "Dup"));
        registry.remove(a).unwrap();
        let reused = registry.insert(measure(1, "Dup"));

        assert_eq!(reused.index(), 0);
        assert_eq!(registry.find_in_skin(SkinId(1), "Dup"), Some(kept));
    }
}
