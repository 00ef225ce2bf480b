// ABOUTME: Theme resolution for the smart-slides application
// ABOUTME: Maps a style name to a fixed palette and font record

/// A named presentation palette. Colors are hex RGB without a leading `#`,
/// ready for OOXML `srgbClr` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSpec {
    pub name: &'static str,
    pub font_family: &'static str,
    pub text_color: &'static str,
    pub subtext_color: &'static str,
    pub background_color: &'static str,
    pub accent_color: &'static str,
    pub accent_secondary: &'static str,
}

const DARK: ThemeSpec = ThemeSpec {
    name: "dark",
    font_family: "Calibri",
    text_color: "FFFFFF",
    subtext_color: "C9CAD1",
    background_color: "1F1F2E",
    accent_color: "4FC3F7",
    accent_secondary: "FFB74D",
};

const LIGHT: ThemeSpec = ThemeSpec {
    name: "light",
    font_family: "Calibri",
    text_color: "212121",
    subtext_color: "5F5F6B",
    background_color: "FAFAF5",
    accent_color: "1565C0",
    accent_secondary: "E65100",
};

/// Resolve a style name to its palette. Unknown names fall back to `dark`;
/// there is no error path.
pub fn resolve(style: &str) -> ThemeSpec {
    match style.trim().to_lowercase().as_str() {
        "light" => LIGHT,
        _ => DARK,
    }
}
