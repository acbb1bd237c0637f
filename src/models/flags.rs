//! Diagnostic flag catalog and the per-record flag set.
//!
//! The catalog is closed: every code a rule can raise is a [`FlagCode`]
//! variant, so raising an unknown code cannot happen at runtime. Codes parsed
//! from text (CLI filters, stored results) go through [`FlagCode::from_str`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlagCode {
    CI,
    CM,
    CX,
    DF,
    DI,
    DO,
    DX,
    DZ,
    EI,
    EM,
    ER,
    EX,
    HC,
    HO,
    HX,
    LI,
    LW,
    LZ,
    MI,
    MR,
    MX,
    NI,
    NR,
    OC,
    OD,
    OO,
    OP,
    OR,
    OX,
    TI,
    TM,
    TR,
    TX,
    PI,
}

impl FlagCode {
    pub const ALL: [FlagCode; 34] = [
        FlagCode::CI,
        FlagCode::CM,
        FlagCode::CX,
        FlagCode::DF,
        FlagCode::DI,
        FlagCode::DO,
        FlagCode::DX,
        FlagCode::DZ,
        FlagCode::EI,
        FlagCode::EM,
        FlagCode::ER,
        FlagCode::EX,
        FlagCode::HC,
        FlagCode::HO,
        FlagCode::HX,
        FlagCode::LI,
        FlagCode::LW,
        FlagCode::LZ,
        FlagCode::MI,
        FlagCode::MR,
        FlagCode::MX,
        FlagCode::NI,
        FlagCode::NR,
        FlagCode::OC,
        FlagCode::OD,
        FlagCode::OO,
        FlagCode::OP,
        FlagCode::OR,
        FlagCode::OX,
        FlagCode::TI,
        FlagCode::TM,
        FlagCode::TR,
        FlagCode::TX,
        FlagCode::PI,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagCode::CI => "CI",
            FlagCode::CM => "CM",
            FlagCode::CX => "CX",
            FlagCode::DF => "DF",
            FlagCode::DI => "DI",
            FlagCode::DO => "DO",
            FlagCode::DX => "DX",
            FlagCode::DZ => "DZ",
            FlagCode::EI => "EI",
            FlagCode::EM => "EM",
            FlagCode::ER => "ER",
            FlagCode::EX => "EX",
            FlagCode::HC => "HC",
            FlagCode::HO => "HO",
            FlagCode::HX => "HX",
            FlagCode::LI => "LI",
            FlagCode::LW => "LW",
            FlagCode::LZ => "LZ",
            FlagCode::MI => "MI",
            FlagCode::MR => "MR",
            FlagCode::MX => "MX",
            FlagCode::NI => "NI",
            FlagCode::NR => "NR",
            FlagCode::OC => "OC",
            FlagCode::OD => "OD",
            FlagCode::OO => "OO",
            FlagCode::OP => "OP",
            FlagCode::OR => "OR",
            FlagCode::OX => "OX",
            FlagCode::TI => "TI",
            FlagCode::TM => "TM",
            FlagCode::TR => "TR",
            FlagCode::TX => "TX",
            FlagCode::PI => "PI",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FlagCode::CI => "Cloud cover is invalid (not a proper category)",
            FlagCode::CM => "Cloud cover is coded as missing",
            FlagCode::CX => "Cloud cover attribute is missing",
            FlagCode::DF => "Datetime of measurement is in the future",
            FlagCode::DI => {
                "Datetime of measurement is invalid (string malformed, or not a real datetime)"
            }
            FlagCode::DO => "Datetime of measurement is before 1995",
            FlagCode::DX => "Datetime of measurement attribute is missing",
            FlagCode::DZ => "Datetime of measurement is at midnight UTC",
            FlagCode::EI => "Elevation is invalid (not a number)",
            FlagCode::EM => "Elevation is coded as missing",
            FlagCode::ER => "Elevation is outside of expected range (-300m to 6000m)",
            FlagCode::EX => "Elevation attribute is missing",
            FlagCode::HC => "Extreme haze reported in sky clarity but not as an obstruction",
            FlagCode::HO => "Haze reported as an obstruction but not as extreme haze in sky clarity",
            FlagCode::HX => "Sky clarity is missing",
            FlagCode::LI => "Location is not a valid lat-lon pair",
            FlagCode::LW => "Location may be over water",
            FlagCode::LZ => "Location is at 0 N, 0 E",
            FlagCode::MI => "Mosquito larvae count is invalid (not a number or app range)",
            FlagCode::MR => "Mosquito larvae count (specific) outside of normal range (0 - 199)",
            FlagCode::MX => "Mosquito larvae count attribute is missing",
            FlagCode::NI => "Contrail count is invalid (not a number)",
            FlagCode::NR => "Contrail count outside of normal range (0 - 19)",
            FlagCode::OC => "Obscuration reported but cloud types also reported",
            FlagCode::OD => "Two obscurations reported",
            FlagCode::OO => "Obscuration types selected but cover not obscured",
            FlagCode::OP => "Spray reported possibly over land",
            FlagCode::OR => "More than two obscurations reported",
            FlagCode::OX => "Obscured cover reported but obscuration type missing",
            FlagCode::TI => "Tree height is invalid (not a number)",
            FlagCode::TM => "Tree height is coded as missing",
            FlagCode::TR => "Tree height outside of normal range (0m - 99m)",
            FlagCode::TX => "Tree height attribute is missing",
            FlagCode::PI => "Protocol invalid or not yet implemented",
        }
    }
}

impl fmt::Display for FlagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagCode {
    type Err = QaError;

    /// Accepts the historical aliases `OT`/`O2` (two obscurations) and `OM`
    /// (more than two) used by older exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        match code.as_str() {
            "OT" | "O2" => return Ok(FlagCode::OD),
            "OM" => return Ok(FlagCode::OR),
            _ => {}
        }
        FlagCode::ALL
            .into_iter()
            .find(|f| f.as_str() == code)
            .ok_or_else(|| QaError::UnknownFlag(s.to_string()))
    }
}

/// Ordered, deduplicated flags raised on one observation.
///
/// Flags are only ever added; nothing clears them implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    codes: Vec<FlagCode>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `code`. Returns `true` if it was not already present.
    pub fn raise(&mut self, code: FlagCode) -> bool {
        if self.codes.contains(&code) {
            return false;
        }
        self.codes.push(code);
        true
    }

    pub fn has(&self, code: FlagCode) -> bool {
        self.codes.contains(&code)
    }

    pub fn any(&self) -> bool {
        !self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FlagCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn as_slice(&self) -> &[FlagCode] {
        &self.codes
    }

    /// English description of every raised flag, in raise order.
    pub fn descriptions(&self) -> Vec<&'static str> {
        self.codes.iter().map(FlagCode::description).collect()
    }

    /// Codes joined with `sep`, e.g. `"CM;DZ"`.
    pub fn joined(&self, sep: &str) -> String {
        self.codes
            .iter()
            .map(FlagCode::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a FlagCode;
    type IntoIter = std::slice::Iter<'a, FlagCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.codes.iter()
    }
}
