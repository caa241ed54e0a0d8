//! Named color palettes for table styling.

use serde::Serialize;

/// Resolved palette: header color plus two alternating band colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub header_color: &'static str,
    pub color1: &'static str,
    pub color2: &'static str,
}

/// Supported scheme names. Anything else is a caller defect.
const SCHEMES: &[(&str, Palette)] = &[
    (
        "red",
        Palette {
            header_color: "#E53935",
            color1: "#FFCDD2",
            color2: "#FFEBEE",
        },
    ),
    (
        "blue",
        Palette {
            header_color: "#1E88E5",
            color1: "#BBDEFB",
            color2: "#E3F2FD",
        },
    ),
    (
        "green",
        Palette {
            header_color: "#43A047",
            color1: "#C8E6C9",
            color2: "#E8F5E9",
        },
    ),
    (
        "orange",
        Palette {
            header_color: "#FB8C00",
            color1: "#FFE0B2",
            color2: "#FFF3E0",
        },
    ),
    (
        "purple",
        Palette {
            header_color: "#8E24AA",
            color1: "#E1BEE7",
            color2: "#F3E5F5",
        },
    ),
];

/// Looks up a palette by scheme name.
pub fn scheme_by_name(name: &str) -> Option<&'static Palette> {
    SCHEMES
        .iter()
        .find(|(scheme, _)| *scheme == name)
        .map(|(_, palette)| palette)
}
