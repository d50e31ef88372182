// Measurement units: a magnitude plus a unit-type code.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::value::hash_f64;

/// Unit kinds, indexed by their wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    NotSet,
    Pixel,
    Point,
    Pica,
    Inch,
    Mm,
    Cm,
    Percentage,
    Em,
    Ex,
}

impl UnitType {
    const TABLE: [UnitType; 10] = [
        UnitType::NotSet,
        UnitType::Pixel,
        UnitType::Point,
        UnitType::Pica,
        UnitType::Inch,
        UnitType::Mm,
        UnitType::Cm,
        UnitType::Percentage,
        UnitType::Em,
        UnitType::Ex,
    ];

    /// Resolve a wire code. Codes outside the table yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::TABLE.get(i))
            .copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitType::NotSet => "NotSet",
            UnitType::Pixel => "Pixel",
            UnitType::Point => "Point",
            UnitType::Pica => "Pica",
            UnitType::Inch => "Inch",
            UnitType::Mm => "Mm",
            UnitType::Cm => "Cm",
            UnitType::Percentage => "Percentage",
            UnitType::Em => "Em",
            UnitType::Ex => "Ex",
        }
    }

    /// Suffix used when rendering a magnitude of this kind.
    pub fn suffix(self) -> &'static str {
        match self {
            UnitType::NotSet => "",
            UnitType::Pixel => "px",
            UnitType::Point => "pt",
            UnitType::Pica => "pc",
            UnitType::Inch => "in",
            UnitType::Mm => "mm",
            UnitType::Cm => "cm",
            UnitType::Percentage => "%",
            UnitType::Em => "em",
            UnitType::Ex => "ex",
        }
    }
}

/// A decoded unit value. The raw type code is kept so out-of-table codes
/// survive decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub value: f64,
    pub type_code: i32,
}

impl Unit {
    /// The empty unit: zero magnitude, unset type.
    pub const EMPTY: Unit = Unit {
        value: 0.0,
        type_code: 0,
    };

    pub fn kind(&self) -> Option<UnitType> {
        UnitType::from_code(self.type_code)
    }

    pub fn is_empty(&self) -> bool {
        self.type_code == 0
    }

    /// Name of the unit kind, or the numeral of an unknown code.
    pub fn kind_name(&self) -> String {
        match self.kind() {
            Some(kind) => kind.name().to_owned(),
            None => self.type_code.to_string(),
        }
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_f64(self.value, state);
        self.type_code.hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(UnitType::NotSet) => f.write_str(""),
            Some(kind) => write!(f, "{}{}", self.value, kind.suffix()),
            None => write!(f, "{} ({})", self.value, self.type_code),
        }
    }
}
