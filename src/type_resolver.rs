//! Maps a type name from a skin to a registered type.

use crate::error::{PluginError, Result};
use crate::library::{TypeDescriptor, WidgetLibrary};

/*
 * Resolves a `Type=` value to a widget type. Only types deriving from the
 * library's base widget are candidates, and the simple name is matched
 * case-insensitively.
 */
pub fn resolve_widget<'a>(library: &'a WidgetLibrary, name: &str) -> Result<&'a TypeDescriptor> {
    let name = name.trim();
    library
        .types()
        .filter(|t| t.is_widget() && library.derives_from(&t.name, library.base_widget()))
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            log::debug!("TypeResolver: No widget type named '{name}'");
            PluginError::TypeNotFound(name.to_string())
        })
}

/// Resolves any registered type. A fully qualified name wins over a simple one.
pub fn resolve_any<'a>(library: &'a WidgetLibrary, name: &str) -> Result<&'a TypeDescriptor> {
    let name = name.trim();
    library
        .types()
        .find(|t| t.full_name().eq_ignore_ascii_case(name))
        .or_else(|| library.types().find(|t| t.name.eq_ignore_ascii_case(name)))
        .ok_or_else(|| PluginError::TypeNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_names_match_case_insensitively() {
        let library = WidgetLibrary::standard();
        assert_eq!(resolve_widget(&library, "checkbox").unwrap().name, "CheckBox");
        assert_eq!(resolve_widget(&library, " Button ").unwrap().name, "Button");
    }

    #[test]
    fn non_widgets_and_the_base_are_not_widget_types() {
        let library = WidgetLibrary::standard();
        assert!(matches!(
            resolve_widget(&library, "Font"),
            Err(PluginError::TypeNotFound(_))
        ));
        assert!(resolve_widget(&library, "DockStyle").is_err());
        assert!(resolve_widget(&library, "Control").is_err());
        assert!(resolve_widget(&library, "Gizmo").is_err());
    }

    #[test]
    fn resolve_any_accepts_full_and_simple_names() {
        let library = WidgetLibrary::standard();
        assert_eq!(
            resolve_any(&library, "rainforms.drawing.font").unwrap().name,
            "Font"
        );
        assert_eq!(resolve_any(&library, "AnchorStyles").unwrap().name, "AnchorStyles");
        assert!(resolve_any(&library, "Nope").is_err());
    }
}
