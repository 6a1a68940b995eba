//! The fixed UVOT instrument mode table.
//!
//! The platform form presents the descriptive labels; the facility wants
//! the hex codes. The table is fixed by the facility and changes rarely.

/// The default mode ("Filter of the day"). Selecting any other mode
/// requires a justification on the request.
pub const DEFAULT_MODE: &str = "0x9999";

/// `(hex code, display label)` pairs, in facility order.
pub const MODES: [(&str, &str); 16] = [
    ("0x9999", "0x9999 - Default (Filter of the day)"),
    ("0x30ed", "0x30ed - U+B+V+All UV"),
    ("0x223f", "0x223f - U+B+V+All UV (UV weighted, SN Mode)"),
    ("0x0270", "0x0270 - U+B+V+All UV (ToO Upload Mode)"),
    ("0x209a", "0x209a - U+B+V"),
    ("0x308f", "0x308f - All UV"),
    ("0x2019", "0x2019 - White"),
    ("0x018c", "0x018c - UVW1"),
    ("0x011e", "0x011e - UVW2"),
    ("0x015a", "0x015a - UVM2"),
    ("0x01aa", "0x01aa - U band"),
    ("0x2016", "0x2016 - B band"),
    ("0x2005", "0x2005 - V band"),
    ("0x122f", "0x122f - Grism 1 (UV)"),
    ("0x1230", "0x1230 - Grism 2 (Visible)"),
    ("0x0ff3", "0x0ff3 - Blocked (in case of too bright star)"),
];

/// Resolve a display label to its hex mode code.
pub fn code_for_label(label: &str) -> Option<&'static str> {
    MODES.iter().find(|(_, l)| *l == label).map(|(c, _)| *c)
}

/// Resolve a hex mode code to its display label.
pub fn label_for_code(code: &str) -> Option<&'static str> {
    MODES.iter().find(|(c, _)| *c == code).map(|(_, l)| *l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_sixteen_entries() {
        assert_eq!(MODES.len(), 16);
    }

    #[test]
    fn test_label_resolves_to_code() {
        assert_eq!(code_for_label("0x2019 - White"), Some("0x2019"));
        assert_eq!(
            code_for_label("0x9999 - Default (Filter of the day)"),
            Some(DEFAULT_MODE)
        );
    }

    #[test]
    fn test_unknown_label_resolves_to_none() {
        assert_eq!(code_for_label("0xffff - Imaginary"), None);
        assert_eq!(code_for_label(""), None);
    }

    #[test]
    fn test_code_resolves_to_label() {
        assert_eq!(label_for_code("0x0ff3"), Some("0x0ff3 - Blocked (in case of too bright star)"));
        assert_eq!(label_for_code("0x0000"), None);
    }
}
