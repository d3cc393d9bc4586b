/*
 * The widget library: an explicit registry of every type the plugin can bind.
 * Each `TypeDescriptor` carries the metadata a reflective runtime would
 * provide (settable properties with typed accessors, events, constructors,
 * instance and static methods) so the binding engine can work on type names
 * and strings alone. Members are inherited by walking the `base` chain.
 */
use crate::controls::{Widget, WidgetRef};
use crate::error::{PluginError, Result};
use crate::types::{Value, ValueType};

pub type Getter = fn(&dyn Widget) -> Result<Value>;
pub type Setter = fn(&mut dyn Widget, Value) -> Result<()>;
pub type StaticFn = fn(&[Value]) -> Result<Option<Value>>;
pub type InstanceFn = fn(&mut dyn Widget, &[Value]) -> Result<Option<Value>>;
pub type WidgetFactory = fn() -> WidgetRef;

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub value_type: ValueType,
    getter: Getter,
    setter: Option<Setter>,
}

impl PropertyDescriptor {
    pub fn new(name: &str, value_type: ValueType, getter: Getter, setter: Setter) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            getter,
            setter: Some(setter),
        }
    }

    pub fn read_only(name: &str, value_type: ValueType, getter: Getter) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            getter,
            setter: None,
        }
    }

    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    pub fn get(&self, widget: &dyn Widget) -> Result<Value> {
        (self.getter)(widget)
    }

    pub fn set(&self, widget: &mut dyn Widget, value: Value) -> Result<()> {
        let setter = self.setter.ok_or_else(|| {
            PluginError::OperationFailed(format!("property {} is read-only", self.name))
        })?;
        setter(widget, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value_type: ValueType,
    pub default: Option<Value>,
    /// Trailing parameter that absorbs every remaining token, joined by spaces.
    pub rest: bool,
}

impl Parameter {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            default: None,
            rest: false,
        }
    }

    pub fn optional(name: &str, value_type: ValueType, default: Value) -> Self {
        Self {
            default: Some(default),
            ..Self::new(name, value_type)
        }
    }

    pub fn rest(name: &str) -> Self {
        Self {
            default: Some(Value::Str(String::new())),
            rest: true,
            ..Self::new(name, ValueType::String)
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Constructor,
    Static,
    Instance,
}

#[derive(Debug, Clone, Copy)]
enum CallTarget {
    Static(StaticFn),
    Instance(InstanceFn),
}

/// A constructor, static factory or instance method.
#[derive(Debug, Clone)]
pub struct Callable {
    pub name: String,
    pub kind: CallableKind,
    pub params: Vec<Parameter>,
    /// Declared return type. `None` for void methods.
    pub returns: Option<ValueType>,
    target: CallTarget,
}

impl Callable {
    pub fn constructor(type_name: &str, params: Vec<Parameter>, f: StaticFn) -> Self {
        Self {
            name: type_name.to_string(),
            kind: CallableKind::Constructor,
            params,
            returns: Some(ValueType::reference(type_name)),
            target: CallTarget::Static(f),
        }
    }

    pub fn factory(name: &str, params: Vec<Parameter>, returns: ValueType, f: StaticFn) -> Self {
        Self {
            name: name.to_string(),
            kind: CallableKind::Static,
            params,
            returns: Some(returns),
            target: CallTarget::Static(f),
        }
    }

    pub fn method(name: &str, params: Vec<Parameter>, f: InstanceFn) -> Self {
        Self {
            name: name.to_string(),
            kind: CallableKind::Instance,
            params,
            returns: None,
            target: CallTarget::Instance(f),
        }
    }

    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.is_optional()).count()
    }

    pub fn has_rest(&self) -> bool {
        self.params.last().is_some_and(|p| p.rest)
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.required_count() && (self.has_rest() || count <= self.params.len())
    }

    /// True when every parameter can be produced from a single token.
    pub fn is_token_invocable(&self) -> bool {
        self.params.iter().all(|p| p.value_type.is_token_coercible())
    }

    /*
     * Invokes the callable with already-coerced arguments. Instance methods
     * need the live widget; static callables ignore it.
     */
    pub(crate) fn call(
        &self,
        target: Option<&mut dyn Widget>,
        args: &[Value],
    ) -> Result<Option<Value>> {
        match self.target {
            CallTarget::Static(f) => f(args),
            CallTarget::Instance(f) => {
                let widget = target.ok_or_else(|| {
                    PluginError::invocation(&self.name, "instance method called without a target")
                })?;
                f(widget, args)
            }
        }
    }

    pub fn signature(&self, owner: &str) -> String {
        let params = self
            .params
            .iter()
            .map(|p| {
                if p.rest {
                    format!("params {} {}", p.value_type, p.name)
                } else {
                    format!("{} {}", p.value_type, p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind {
            CallableKind::Constructor => format!("{owner}({params})"),
            CallableKind::Static | CallableKind::Instance => {
                format!("{owner}.{}({params})", self.name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub flags: bool,
    pub members: Vec<(String, i64)>,
}

impl EnumDescriptor {
    pub fn member(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find_map(|(member, bits)| member.eq_ignore_ascii_case(name).then_some(*bits))
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Widget { create: Option<WidgetFactory> },
    Enum(EnumDescriptor),
    Value,
}

#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub namespace: String,
    pub base: Option<String>,
    pub kind: TypeKind,
    pub properties: Vec<PropertyDescriptor>,
    pub events: Vec<EventDescriptor>,
    pub constructors: Vec<Callable>,
    pub methods: Vec<Callable>,
}

impl TypeDescriptor {
    fn new(namespace: &str, name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            base: None,
            kind,
            properties: Vec::new(),
            events: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn widget(namespace: &str, name: &str, create: Option<WidgetFactory>) -> Self {
        Self::new(namespace, name, TypeKind::Widget { create })
    }

    pub fn enumeration(namespace: &str, name: &str, flags: bool, members: &[(&str, i64)]) -> Self {
        Self::new(
            namespace,
            name,
            TypeKind::Enum(EnumDescriptor {
                flags,
                members: members
                    .iter()
                    .map(|(member, bits)| (member.to_string(), *bits))
                    .collect(),
            }),
        )
    }

    pub fn value(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Value)
    }

    pub fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn event(mut self, name: &str) -> Self {
        self.events.push(EventDescriptor {
            name: name.to_string(),
        });
        self
    }

    pub fn constructor(mut self, callable: Callable) -> Self {
        self.constructors.push(callable);
        self
    }

    pub fn method(mut self, callable: Callable) -> Self {
        self.methods.push(callable);
        self
    }

    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match &self.kind {
            TypeKind::Enum(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn widget_factory(&self) -> Option<WidgetFactory> {
        match self.kind {
            TypeKind::Widget { create } => create,
            _ => None,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self.kind, TypeKind::Widget { .. })
    }
}

/*
 * Registry of all known types. `base_widget` names the type every bindable
 * widget derives from; the top-level and tab container roles are answered by
 * the widgets themselves.
 */
#[derive(Debug, Clone)]
pub struct WidgetLibrary {
    types: Vec<TypeDescriptor>,
    base_widget: String,
}

impl WidgetLibrary {
    pub fn new(base_widget: &str) -> Self {
        Self {
            types: Vec::new(),
            base_widget: base_widget.to_string(),
        }
    }

    /// The built-in control set.
    pub fn standard() -> Self {
        let mut library = Self::new(crate::controls::BASE_WIDGET_TYPE);
        crate::controls::register_standard_controls(&mut library);
        library
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) {
        if let Some(existing) = self
            .types
            .iter_mut()
            .find(|t| t.full_name() == descriptor.full_name())
        {
            log::warn!(
                "WidgetLibrary: Replacing existing registration for {}",
                descriptor.full_name()
            );
            *existing = descriptor;
        } else {
            self.types.push(descriptor);
        }
    }

    pub fn base_widget(&self) -> &str {
        &self.base_widget
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Exact, case-sensitive lookup by simple name.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.name == name)
    }

    /// The type followed by each of its base types, nearest first.
    pub fn lineage(&self, name: &str) -> Vec<&TypeDescriptor> {
        let mut chain = Vec::new();
        let mut next = self.get(name);
        while let Some(descriptor) = next {
            if chain
                .iter()
                .any(|seen: &&TypeDescriptor| seen.name == descriptor.name)
            {
                log::warn!("WidgetLibrary: Base type cycle detected at {}", descriptor.name);
                break;
            }
            chain.push(descriptor);
            next = descriptor.base.as_deref().and_then(|base| self.get(base));
        }
        chain
    }

    pub fn derives_from(&self, name: &str, ancestor: &str) -> bool {
        self.lineage(name)
            .iter()
            .skip(1)
            .any(|descriptor| descriptor.name == ancestor)
    }

    /// Public properties including inherited ones. A derived declaration hides
    /// a base declaration with the same name.
    pub fn properties(&self, type_name: &str) -> Vec<&PropertyDescriptor> {
        let mut result: Vec<&PropertyDescriptor> = Vec::new();
        for descriptor in self.lineage(type_name) {
            for property in &descriptor.properties {
                if !result.iter().any(|p| p.name == property.name) {
                    result.push(property);
                }
            }
        }
        result
    }

    pub fn property(&self, type_name: &str, property: &str) -> Option<&PropertyDescriptor> {
        self.properties(type_name)
            .into_iter()
            .find(|p| p.name == property)
    }

    pub fn events(&self, type_name: &str) -> Vec<&EventDescriptor> {
        let mut result: Vec<&EventDescriptor> = Vec::new();
        for descriptor in self.lineage(type_name) {
            for event in &descriptor.events {
                if !result.iter().any(|e| e.name == event.name) {
                    result.push(event);
                }
            }
        }
        result
    }

    /// Public instance methods named `name`, derived declarations first.
    pub fn instance_methods(&self, type_name: &str, name: &str) -> Vec<&Callable> {
        self.lineage(type_name)
            .into_iter()
            .flat_map(|descriptor| descriptor.methods.iter())
            .filter(|m| m.kind == CallableKind::Instance && m.name == name)
            .collect()
    }

    pub fn constructors(&self, type_name: &str) -> Vec<&Callable> {
        self.get(type_name)
            .map(|descriptor| descriptor.constructors.iter().collect())
            .unwrap_or_default()
    }

    /// Static methods declared on the type that return the type itself.
    pub fn static_factories(&self, type_name: &str) -> Vec<&Callable> {
        self.get(type_name)
            .map(|descriptor| {
                descriptor
                    .methods
                    .iter()
                    .filter(|m| {
                        m.kind == CallableKind::Static
                            && m.returns.as_ref().is_some_and(|r| r.type_name() == type_name)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn enum_descriptor(&self, name: &str) -> Option<&EnumDescriptor> {
        self.get(name).and_then(TypeDescriptor::as_enum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_library() -> WidgetLibrary {
        let mut library = WidgetLibrary::new("Base");
        library.register(
            TypeDescriptor::widget("Test", "Base", None)
                .event("Click")
                .method(Callable::method("Hide", vec![], |_, _| Ok(None))),
        );
        library.register(
            TypeDescriptor::widget("Test", "Derived", None)
                .base("Base")
                .event("Click")
                .event("Toggled")
                .method(Callable::method(
                    "Hide",
                    vec![Parameter::new("fade", ValueType::Bool)],
                    |_, _| Ok(None),
                )),
        );
        library.register(
            TypeDescriptor::value("Test", "Extent")
                .constructor(Callable::constructor(
                    "Extent",
                    vec![Parameter::new("w", ValueType::Int)],
                    |_| Ok(None),
                ))
                .method(Callable::factory(
                    "Parse",
                    vec![Parameter::new("s", ValueType::String)],
                    ValueType::reference("Extent"),
                    |_| Ok(None),
                ))
                .method(Callable::factory(
                    "Describe",
                    vec![],
                    ValueType::String,
                    |_| Ok(None),
                )),
        );
        library
    }

    #[test]
    fn lineage_walks_base_types() {
        let library = sample_library();
        let names: Vec<_> = library
            .lineage("Derived")
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Derived", "Base"]);
        assert!(library.derives_from("Derived", "Base"));
        assert!(!library.derives_from("Base", "Base"));
    }

    #[test]
    fn inherited_events_are_not_duplicated() {
        let library = sample_library();
        let events: Vec<_> = library
            .events("Derived")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(events, vec!["Click", "Toggled"]);
    }

    #[test]
    fn overloads_are_collected_across_the_hierarchy_derived_first() {
        let library = sample_library();
        let methods = library.instance_methods("Derived", "Hide");
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].params.len(), 1);
        assert!(methods[1].params.is_empty());
    }

    #[test]
    fn static_factories_must_return_the_owning_type() {
        let library = sample_library();
        let factories = library.static_factories("Extent");
        assert_eq!(factories.len(), 1);
        assert_eq!(factories[0].name, "Parse");
    }

    #[test]
    fn arity_rules_respect_optional_and_rest_parameters() {
        let optional = Callable::method(
            "Select",
            vec![
                Parameter::new("start", ValueType::Int),
                Parameter::optional("length", ValueType::Int, Value::Int(0)),
            ],
            |_, _| Ok(None),
        );
        assert!(!optional.accepts_arity(0));
        assert!(optional.accepts_arity(1));
        assert!(optional.accepts_arity(2));
        assert!(!optional.accepts_arity(3));

        let rest = Callable::method("SetText", vec![Parameter::rest("text")], |_, _| Ok(None));
        assert!(rest.accepts_arity(0));
        assert!(rest.accepts_arity(5));
    }

    #[test]
    fn signature_formats_like_a_declaration() {
        let ctor = Callable::constructor(
            "Size",
            vec![
                Parameter::new("width", ValueType::Int),
                Parameter::new("height", ValueType::Int),
            ],
            |_| Ok(None),
        );
        assert_eq!(ctor.signature("Size"), "Size(int width, int height)");
    }
}
