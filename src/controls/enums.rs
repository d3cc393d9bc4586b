/*
 * Enum types of the control set. Flags enums combine members with `|` in
 * skin files, e.g. `Anchor=Top|Left|Right`.
 */
use super::FORMS_NAMESPACE;
use crate::library::{TypeDescriptor, WidgetLibrary};

pub(crate) const DOCK_NONE: i64 = 0;
pub(crate) const ANCHOR_TOP_LEFT: i64 = 1 | 4;
pub(crate) const CHECK_STATE_UNCHECKED: i64 = 0;
pub(crate) const CHECK_STATE_CHECKED: i64 = 1;
pub(crate) const CHECK_STATE_INDETERMINATE: i64 = 2;
pub(crate) const BORDER_STYLE_NONE: i64 = 0;
pub(crate) const FORM_BORDER_SIZABLE: i64 = 4;
pub(crate) const START_POSITION_DEFAULT_LOCATION: i64 = 2;
pub(crate) const TAB_ALIGNMENT_TOP: i64 = 0;

pub(crate) fn register(library: &mut WidgetLibrary) {
    let enums: [(&str, bool, &[(&str, i64)]); 8] = [
        (
            "DockStyle",
            false,
            &[
                ("None", DOCK_NONE),
                ("Top", 1),
                ("Bottom", 2),
                ("Left", 3),
                ("Right", 4),
                ("Fill", 5),
            ],
        ),
        (
            "AnchorStyles",
            true,
            &[
                ("None", 0),
                ("Top", 1),
                ("Bottom", 2),
                ("Left", 4),
                ("Right", 8),
            ],
        ),
        (
            "FormBorderStyle",
            false,
            &[
                ("None", 0),
                ("FixedSingle", 1),
                ("Fixed3D", 2),
                ("FixedDialog", 3),
                ("Sizable", FORM_BORDER_SIZABLE),
                ("FixedToolWindow", 5),
                ("SizableToolWindow", 6),
            ],
        ),
        (
            "FormStartPosition",
            false,
            &[
                ("Manual", 0),
                ("CenterScreen", 1),
                ("WindowsDefaultLocation", START_POSITION_DEFAULT_LOCATION),
                ("WindowsDefaultBounds", 3),
                ("CenterParent", 4),
            ],
        ),
        (
            "FlatStyle",
            false,
            &[("Flat", 0), ("Popup", 1), ("Standard", 2), ("System", 3)],
        ),
        (
            "BorderStyle",
            false,
            &[("None", BORDER_STYLE_NONE), ("FixedSingle", 1), ("Fixed3D", 2)],
        ),
        (
            "CheckState",
            false,
            &[
                ("Unchecked", CHECK_STATE_UNCHECKED),
                ("Checked", CHECK_STATE_CHECKED),
                ("Indeterminate", CHECK_STATE_INDETERMINATE),
            ],
        ),
        (
            "TabAlignment",
            false,
            &[
                ("Top", TAB_ALIGNMENT_TOP),
                ("Bottom", 1),
                ("Left", 2),
                ("Right", 3),
            ],
        ),
    ];

    for (name, flags, members) in enums {
        library.register(TypeDescriptor::enumeration(
            FORMS_NAMESPACE,
            name,
            flags,
            members,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_styles_is_the_only_flags_enum() {
        let mut library = WidgetLibrary::new("Control");
        register(&mut library);
        let flags: Vec<_> = library
            .types()
            .filter(|t| t.as_enum().is_some_and(|e| e.flags))
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(flags, vec!["AnchorStyles"]);
        assert_eq!(
            library.enum_descriptor("AnchorStyles").unwrap().member("left"),
            Some(4)
        );
    }
}
