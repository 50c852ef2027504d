//! Ticket field values
//!
//! A flat record of the dynamic values a template can substitute. Every
//! field is optional; the renderer falls back to fixed defaults for
//! whatever the chosen layout references but the caller left out.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Dynamic values substituted into a ticket template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFields {
    /// Product name, truncated to the layout's cap
    pub name: Option<String>,
    pub price: Option<String>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    /// Day/month/year; defaults to the current local date
    pub date: Option<String>,
    pub section: Option<String>,
    pub order: Option<String>,
    pub row: Option<String>,
    pub seat: Option<String>,
}

impl TicketFields {
    pub(crate) fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("PRODUCTO")
    }

    pub(crate) fn price(&self) -> &str {
        self.price.as_deref().unwrap_or("0.00")
    }

    pub(crate) fn barcode(&self) -> &str {
        self.barcode.as_deref().unwrap_or("000000000000")
    }

    pub(crate) fn sku(&self) -> &str {
        self.sku.as_deref().unwrap_or("N/A")
    }

    pub(crate) fn date(&self) -> String {
        self.date
            .clone()
            .unwrap_or_else(|| Local::now().format("%d/%m/%Y").to_string())
    }

    pub(crate) fn section(&self) -> &str {
        self.section.as_deref().unwrap_or("")
    }

    pub(crate) fn order(&self) -> &str {
        self.order.as_deref().unwrap_or("")
    }

    pub(crate) fn row(&self) -> &str {
        self.row.as_deref().unwrap_or("")
    }

    pub(crate) fn seat(&self) -> &str {
        self.seat.as_deref().unwrap_or("")
    }
}

/// Structured print request as the HTTP boundary delivers it.
///
/// Wire names are the ones the front end already sends; `tipo` is carried
/// for the boundary's own bookkeeping and is not substituted into any
/// template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintTicketRequest {
    pub seccion: String,
    pub orden: String,
    pub precio: String,
    pub tipo: String,
    pub fila: String,
    pub asiento: String,
    #[serde(default = "default_printer_name")]
    pub printer_name: String,
}

fn default_printer_name() -> String {
    "BP500".to_string()
}

impl PrintTicketRequest {
    /// Map the request onto template field values.
    pub fn fields(&self) -> TicketFields {
        TicketFields {
            price: Some(self.precio.clone()),
            section: Some(self.seccion.clone()),
            order: Some(self.orden.clone()),
            row: Some(self.fila.clone()),
            seat: Some(self.asiento.clone()),
            ..TicketFields::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_deserializes_from_wire_names() {
        let request: PrintTicketRequest = serde_json::from_str(
            r#"{
                "seccion": "GENERAL",
                "orden": "1A2B3C4D",
                "precio": "300",
                "tipo": "adulto",
                "fila": "1",
                "asiento": "1"
            }"#,
        )
        .unwrap();

        assert_eq!(request.printer_name, "BP500");
        assert_eq!(request.precio, "300");
    }

    #[test]
    fn request_maps_onto_ticket_fields() {
        let request = PrintTicketRequest {
            seccion: "VIP".to_string(),
            orden: "X1".to_string(),
            precio: "120".to_string(),
            tipo: "adulto".to_string(),
            fila: "2".to_string(),
            asiento: "14".to_string(),
            printer_name: "BP500".to_string(),
        };

        let fields = request.fields();
        assert_eq!(fields.price(), "120");
        assert_eq!(fields.section(), "VIP");
        assert_eq!(fields.row(), "2");
        assert_eq!(fields.seat(), "14");
        // Not part of the request; renderer defaults apply
        assert_eq!(fields.barcode(), "000000000000");
    }

    #[test]
    fn missing_fields_take_documented_defaults() {
        let fields = TicketFields::default();
        assert_eq!(fields.name(), "PRODUCTO");
        assert_eq!(fields.price(), "0.00");
        assert_eq!(fields.barcode(), "000000000000");
        assert_eq!(fields.sku(), "N/A");
        assert_eq!(fields.section(), "");

        let date = fields.date();
        assert_eq!(date, Local::now().format("%d/%m/%Y").to_string());
    }
}
