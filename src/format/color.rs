// Color values: raw ARGB, known (named) colors, and the empty color.

use std::fmt;

const ARGB_ALPHA_SHIFT: u32 = 24;
const ARGB_RED_SHIFT: u32 = 16;
const ARGB_GREEN_SHIFT: u32 = 8;
const ARGB_BLUE_SHIFT: u32 = 0;

/// Known color names, ordered by code. Code 1 is the first entry: the
/// system colors come first, then `Transparent` and the web colors, then
/// the system colors appended by later producer releases.
pub const KNOWN_COLOR_NAMES: [&str; 174] = [
    "ActiveBorder",
    "ActiveCaption",
    "ActiveCaptionText",
    "AppWorkspace",
    "Control",
    "ControlDark",
    "ControlDarkDark",
    "ControlLight",
    "ControlLightLight",
    "ControlText",
    "Desktop",
    "GrayText",
    "Highlight",
    "HighlightText",
    "HotTrack",
    "InactiveBorder",
    "InactiveCaption",
    "InactiveCaptionText",
    "Info",
    "InfoText",
    "Menu",
    "MenuText",
    "ScrollBar",
    "Window",
    "WindowFrame",
    "WindowText",
    "Transparent",
    "AliceBlue",
    "AntiqueWhite",
    "Aqua",
    "Aquamarine",
    "Azure",
    "Beige",
    "Bisque",
    "Black",
    "BlanchedAlmond",
    "Blue",
    "BlueViolet",
    "Brown",
    "BurlyWood",
    "CadetBlue",
    "Chartreuse",
    "Chocolate",
    "Coral",
    "CornflowerBlue",
    "Cornsilk",
    "Crimson",
    "Cyan",
    "DarkBlue",
    "DarkCyan",
    "DarkGoldenrod",
    "DarkGray",
    "DarkGreen",
    "DarkKhaki",
    "DarkMagenta",
    "DarkOliveGreen",
    "DarkOrange",
    "DarkOrchid",
    "DarkRed",
    "DarkSalmon",
    "DarkSeaGreen",
    "DarkSlateBlue",
    "DarkSlateGray",
    "DarkTurquoise",
    "DarkViolet",
    "DeepPink",
    "DeepSkyBlue",
    "DimGray",
    "DodgerBlue",
    "Firebrick",
    "FloralWhite",
    "ForestGreen",
    "Fuchsia",
    "Gainsboro",
    "GhostWhite",
    "Gold",
    "Goldenrod",
    "Gray",
    "Green",
    "GreenYellow",
    "Honeydew",
    "HotPink",
    "IndianRed",
    "Indigo",
    "Ivory",
    "Khaki",
    "Lavender",
    "LavenderBlush",
    "LawnGreen",
    "LemonChiffon",
    "LightBlue",
    "LightCoral",
    "LightCyan",
    "LightGoldenrodYellow",
    "LightGray",
    "LightGreen",
    "LightPink",
    "LightSalmon",
    "LightSeaGreen",
    "LightSkyBlue",
    "LightSlateGray",
    "LightSteelBlue",
    "LightYellow",
    "Lime",
    "LimeGreen",
    "Linen",
    "Magenta",
    "Maroon",
    "MediumAquamarine",
    "MediumBlue",
    "MediumOrchid",
    "MediumPurple",
    "MediumSeaGreen",
    "MediumSlateBlue",
    "MediumSpringGreen",
    "MediumTurquoise",
    "MediumVioletRed",
    "MidnightBlue",
    "MintCream",
    "MistyRose",
    "Moccasin",
    "NavajoWhite",
    "Navy",
    "OldLace",
    "Olive",
    "OliveDrab",
    "Orange",
    "OrangeRed",
    "Orchid",
    "PaleGoldenrod",
    "PaleGreen",
    "PaleTurquoise",
    "PaleVioletRed",
    "PapayaWhip",
    "PeachPuff",
    "Peru",
    "Pink",
    "Plum",
    "PowderBlue",
    "Purple",
    "Red",
    "RosyBrown",
    "RoyalBlue",
    "SaddleBrown",
    "Salmon",
    "SandyBrown",
    "SeaGreen",
    "SeaShell",
    "Sienna",
    "Silver",
    "SkyBlue",
    "SlateBlue",
    "SlateGray",
    "Snow",
    "SpringGreen",
    "SteelBlue",
    "Tan",
    "Teal",
    "Thistle",
    "Tomato",
    "Turquoise",
    "Violet",
    "Wheat",
    "White",
    "WhiteSmoke",
    "Yellow",
    "YellowGreen",
    "ButtonFace",
    "ButtonHighlight",
    "ButtonShadow",
    "GradientActiveCaption",
    "GradientInactiveCaption",
    "MenuBar",
    "MenuHighlight",
];

/// Look up a known color by code. Codes start at 1.
pub fn known_color_name(code: u32) -> Option<&'static str> {
    let idx = usize::try_from(code).ok()?.checked_sub(1)?;
    KNOWN_COLOR_NAMES.get(idx).copied()
}

/// A decoded color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Packed 32-bit ARGB.
    Argb(u32),
    /// Index into the known-color table. Unknown codes are kept.
    Known(u32),
    /// The "no color" sentinel.
    Empty,
}

impl Color {
    /// Packed ARGB value. Known and empty colors carry none, so this is 0.
    pub fn argb(&self) -> u32 {
        match *self {
            Color::Argb(v) => v,
            Color::Known(_) | Color::Empty => 0,
        }
    }

    pub fn a(&self) -> u8 {
        (self.argb() >> ARGB_ALPHA_SHIFT) as u8
    }

    pub fn r(&self) -> u8 {
        (self.argb() >> ARGB_RED_SHIFT) as u8
    }

    pub fn g(&self) -> u8 {
        (self.argb() >> ARGB_GREEN_SHIFT) as u8
    }

    pub fn b(&self) -> u8 {
        (self.argb() >> ARGB_BLUE_SHIFT) as u8
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Color::Empty)
    }

    /// Display name: the table name for known colors, otherwise the
    /// decimal numeral of the code or packed value.
    pub fn name(&self) -> String {
        match *self {
            Color::Known(code) => known_color_name(code)
                .map(str::to_owned)
                .unwrap_or_else(|| code.to_string()),
            Color::Argb(v) => v.to_string(),
            Color::Empty => "Empty".to_owned(),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Known(_) => write!(f, "Color [{}]", self.name()),
            Color::Argb(_) => write!(
                f,
                "Color [A={}, R={}, G={}, B={}]",
                self.a(),
                self.r(),
                self.g(),
                self.b()
            ),
            Color::Empty => f.write_str("Color [Empty]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_boundaries() {
        assert_eq!(known_color_name(0), None);
        assert_eq!(known_color_name(1), Some("ActiveBorder"));
        assert_eq!(known_color_name(26), Some("WindowText"));
        assert_eq!(known_color_name(27), Some("Transparent"));
        assert_eq!(known_color_name(28), Some("AliceBlue"));
        assert_eq!(known_color_name(141), Some("Red"));
        assert_eq!(known_color_name(167), Some("YellowGreen"));
        assert_eq!(known_color_name(174), Some("MenuHighlight"));
        assert_eq!(known_color_name(175), None);
    }

    #[test]
    fn argb_components() {
        let c = Color::Argb(0x80FF_4020);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x80, 0xFF, 0x40, 0x20));
        assert_eq!(c.to_string(), "Color [A=128, R=255, G=64, B=32]");
    }

    #[test]
    fn known_color_display() {
        assert_eq!(Color::Known(141).to_string(), "Color [Red]");
        assert_eq!(Color::Known(9999).to_string(), "Color [9999]");
        assert_eq!(Color::Known(9999).argb(), 0);
    }

    #[test]
    fn empty_color() {
        assert!(Color::Empty.is_empty());
        assert_eq!(Color::Empty.to_string(), "Color [Empty]");
    }
}
