//! Layout catalog
//!
//! A closed set of fixed template skeletons. Five EPL layouts share the
//! 57x70 mm label geometry (456x560 dots at 203 DPI, 24-dot gap); the TSPL
//! ticket layout targets the 57 mm event-ticket stock with a tear-off stub.

use serde::{Deserialize, Serialize};

/// Label width in dots for the 57x70 mm stock
pub(crate) const WIDTH_DOTS: u32 = 456;
/// Label height in dots for the 57x70 mm stock
pub(crate) const HEIGHT_DOTS: u32 = 560;
/// Gap between labels in dots
pub(crate) const GAP_DOTS: u32 = 24;

/// The available template skeletons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketLayout {
    /// Barcode on top, then name, price, SKU and date. The default.
    Receipt,
    /// Name first, barcode in the middle
    Standard,
    /// Tighter coordinates, SKU and date share a line
    Compact,
    /// Barcode above everything else
    BarcodeTop,
    /// Name, price and barcode only
    Minimal,
    /// TSPL event ticket with a mirrored tear-off stub
    Ticket,
}

impl TicketLayout {
    /// Resolve a layout by name. Unknown names fall back to the default
    /// layout rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "standard" => Self::Standard,
            "compact" => Self::Compact,
            "barcode-top" => Self::BarcodeTop,
            "minimal" => Self::Minimal,
            "ticket" | "ticket-default" => Self::Ticket,
            _ => Self::Receipt,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Standard => "standard",
            Self::Compact => "compact",
            Self::BarcodeTop => "barcode-top",
            Self::Minimal => "minimal",
            Self::Ticket => "ticket-default",
        }
    }

    /// Character cap applied to the product name, for layouts that print it.
    pub fn name_limit(&self) -> Option<usize> {
        match self {
            Self::Receipt => Some(20),
            Self::Standard | Self::Compact | Self::BarcodeTop | Self::Minimal => Some(18),
            Self::Ticket => None,
        }
    }
}

impl Default for TicketLayout {
    fn default() -> Self {
        Self::Receipt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(TicketLayout::from_name("standard"), TicketLayout::Standard);
        assert_eq!(TicketLayout::from_name("COMPACT"), TicketLayout::Compact);
        assert_eq!(
            TicketLayout::from_name("barcode_top"),
            TicketLayout::BarcodeTop
        );
        assert_eq!(
            TicketLayout::from_name("barcode-top"),
            TicketLayout::BarcodeTop
        );
        assert_eq!(
            TicketLayout::from_name("ticket-default"),
            TicketLayout::Ticket
        );
    }

    #[test]
    fn unknown_names_fall_back_to_default() {
        assert_eq!(TicketLayout::from_name("fancy"), TicketLayout::Receipt);
        assert_eq!(TicketLayout::from_name(""), TicketLayout::Receipt);
    }

    #[test]
    fn serde_uses_kebab_case() {
        let layout: TicketLayout = serde_json::from_str("\"barcode-top\"").unwrap();
        assert_eq!(layout, TicketLayout::BarcodeTop);
    }
}
