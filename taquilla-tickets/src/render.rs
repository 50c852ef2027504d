//! Template rendering
//!
//! Substitutes field values into the fixed EPL/TSPL skeletons and
//! normalizes the result for the printer's line-oriented interpreter.
//! The dialect text is opaque here: no parsing, no validation, just
//! substitution and line discipline.

use std::fmt;

use crate::fields::TicketFields;
use crate::layout::{GAP_DOTS, HEIGHT_DOTS, TicketLayout, WIDTH_DOTS};

/// A normalized, ready-to-transmit command string.
///
/// Every line is trimmed and CR-LF terminated; empty lines are gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand(String);

impl RenderedCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim every line, drop the empty ones and terminate each with CR-LF.
///
/// The printer's interpreter chokes on stray blank lines and bare LF
/// terminators, so this runs on every template before transmission.
/// Idempotent.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}

/// Render a ticket with the given layout.
pub fn render(fields: &TicketFields, layout: TicketLayout) -> RenderedCommand {
    let name = layout
        .name_limit()
        .map(|cap| truncate(fields.name(), cap))
        .unwrap_or_default();

    let raw = match layout {
        TicketLayout::Receipt => receipt(fields, &name),
        TicketLayout::Standard => standard(fields, &name),
        TicketLayout::Compact => compact(fields, &name),
        TicketLayout::BarcodeTop => barcode_top(fields, &name),
        TicketLayout::Minimal => minimal(fields, &name),
        TicketLayout::Ticket => ticket(fields),
    };

    RenderedCommand(normalize(&raw))
}

/// Render with a layout resolved by name; unknown names use the default.
pub fn render_named(fields: &TicketFields, layout_name: &str) -> RenderedCommand {
    render(fields, TicketLayout::from_name(layout_name))
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn receipt(f: &TicketFields, name: &str) -> String {
    format!(
        r#"
N
q{width}
Q{height},{gap}
B30,40,0,1,2,3,80,B,"{barcode}"
A30,130,0,2,1,1,N,"{name}"
A30,160,0,1,1,1,N,"Precio: ${price}"
A30,185,0,1,1,1,N,"SKU: {sku}"
A30,210,0,1,1,1,N,"Fecha: {date}"
P1,1
"#,
        width = WIDTH_DOTS,
        height = HEIGHT_DOTS,
        gap = GAP_DOTS,
        barcode = f.barcode(),
        name = name,
        price = f.price(),
        sku = f.sku(),
        date = f.date(),
    )
}

fn standard(f: &TicketFields, name: &str) -> String {
    format!(
        r#"
N
q{width}
Q{height},{gap}
A30,20,0,2,1,1,N,"{name}"
A30,50,0,1,1,1,N,"Precio: ${price}"
B30,80,0,1,2,3,80,B,"{barcode}"
A30,170,0,1,1,1,N,"SKU: {sku}"
A30,195,0,1,1,1,N,"{date}"
P1,1
"#,
        width = WIDTH_DOTS,
        height = HEIGHT_DOTS,
        gap = GAP_DOTS,
        name = name,
        price = f.price(),
        barcode = f.barcode(),
        sku = f.sku(),
        date = f.date(),
    )
}

fn compact(f: &TicketFields, name: &str) -> String {
    format!(
        r#"
N
q{width}
Q{height},{gap}
A25,15,0,1,1,1,N,"{name}"
A25,35,0,1,1,1,N,"${price}"
B25,55,0,1,1,2,60,B,"{barcode}"
A25,125,0,1,1,1,N,"{sku} - {date}"
P1,1
"#,
        width = WIDTH_DOTS,
        height = HEIGHT_DOTS,
        gap = GAP_DOTS,
        name = name,
        price = f.price(),
        barcode = f.barcode(),
        sku = f.sku(),
        date = f.date(),
    )
}

fn barcode_top(f: &TicketFields, name: &str) -> String {
    format!(
        r#"
N
q{width}
Q{height},{gap}
B30,20,0,1,2,3,80,B,"{barcode}"
A30,110,0,2,1,1,N,"{name}"
A30,140,0,1,1,1,N,"Precio: ${price}"
A30,165,0,1,1,1,N,"SKU: {sku}"
A30,190,0,1,1,1,N,"{date}"
P1,1
"#,
        width = WIDTH_DOTS,
        height = HEIGHT_DOTS,
        gap = GAP_DOTS,
        barcode = f.barcode(),
        name = name,
        price = f.price(),
        sku = f.sku(),
        date = f.date(),
    )
}

fn minimal(f: &TicketFields, name: &str) -> String {
    format!(
        r#"
N
q{width}
Q{height},{gap}
A30,30,0,2,1,1,N,"{name}"
A30,60,0,2,1,1,N,"${price}"
B30,90,0,1,2,2,70,B,"{barcode}"
P1,1
"#,
        width = WIDTH_DOTS,
        height = HEIGHT_DOTS,
        gap = GAP_DOTS,
        name = name,
        price = f.price(),
        barcode = f.barcode(),
    )
}

/// TSPL event ticket. Section, order, row, seat and price repeat at two
/// coordinate sets: the ticket body and the tear-off stub below the `Lo`
/// rule. The `W` command's QR payload is the barcode field.
fn ticket(f: &TicketFields) -> String {
    format!(
        r#"
^Q140,0,0
^W57
^H5
^P1
^S2
^AD
^C1
^R0
~Q+0
^O0
^D0
^E12
~R255
^XSET,ROTATION,0
^L
Dy2-me-dd
Th:m:s
Y192,464,WindowText25-14
Y46,286,WindowText22-5
Y143,315,WindowText20-33
Y210,264,WindowText18-68
Y267,335,WindowText16-10
Y334,269,WindowText14-76
Y69,466,WindowText12-94
Y166,489,WindowText11-37
Y45,934,WindowText10-2
Y142,963,WindowText9-96
Y209,912,WindowText8-9
Y266,983,WindowText7-8
Y333,917,WindowText6-7
W213,212,5,2,M,8,5,55,3
{qr}
VD,67,376,1,1,0,3E,{price}
VD,169,396,1,1,0,3E,{order}
VD,234,397,1,1,0,3E,{section}
VD,291,397,1,1,0,3E,{row}
VD,358,397,1,1,0,3E,{seat}
VD,66,1024,1,1,0,3E,{price}
VD,168,1044,1,1,0,3E,{order}
VD,233,1045,1,1,0,3E,{section}
VD,290,1045,1,1,0,3E,{row}
VD,357,1045,1,1,0,3E,{seat}
Lo,4,864,452,875
E
"#,
        qr = f.barcode(),
        price = f.price(),
        order = f.order(),
        section = f.section(),
        row = f.row(),
        seat = f.seat(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LAYOUTS: [TicketLayout; 6] = [
        TicketLayout::Receipt,
        TicketLayout::Standard,
        TicketLayout::Compact,
        TicketLayout::BarcodeTop,
        TicketLayout::Minimal,
        TicketLayout::Ticket,
    ];

    fn full_fields() -> TicketFields {
        TicketFields {
            name: Some("PRODUCTO DEMO".to_string()),
            price: Some("25.50".to_string()),
            barcode: Some("7501234567890".to_string()),
            sku: Some("DEMO001".to_string()),
            date: Some("04/06/2025".to_string()),
            section: Some("GENERAL".to_string()),
            order: Some("1A2B3C4D".to_string()),
            row: Some("1".to_string()),
            seat: Some("1".to_string()),
        }
    }

    fn lines(command: &RenderedCommand) -> Vec<&str> {
        let text = command.as_str();
        assert!(text.ends_with("\r\n"));
        text.split("\r\n").filter(|l| !l.is_empty()).collect()
    }

    #[test]
    fn every_line_is_trimmed_and_crlf_terminated() {
        let fields = full_fields();
        for layout in ALL_LAYOUTS {
            let out = render(&fields, layout);
            let text = out.as_str();

            // Every LF is part of a CR-LF pair, and no CR stands alone
            assert_eq!(
                text.matches('\n').count(),
                text.matches("\r\n").count(),
                "{}",
                layout.name()
            );
            assert_eq!(text.matches('\r').count(), text.matches("\r\n").count());

            for line in lines(&out) {
                assert_eq!(line, line.trim(), "{}", layout.name());
                assert!(!line.is_empty());
            }
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let messy = "\n  N \n\nq456\r\n\t A30,20,0,2,1,1,N,\"X\"  \n\nP1,1\n\n";
        let once = normalize(messy);
        assert_eq!(normalize(&once), once);
        assert_eq!(once, "N\r\nq456\r\nA30,20,0,2,1,1,N,\"X\"\r\nP1,1\r\n");
    }

    #[test]
    fn unknown_layout_matches_default_byte_for_byte() {
        let fields = full_fields();
        let unknown = render_named(&fields, "no-such-layout");
        let default = render(&fields, TicketLayout::Receipt);
        assert_eq!(unknown, default);
    }

    #[test]
    fn name_never_exceeds_the_layout_cap() {
        let long_name = "ENTRADA GENERAL CONCIERTO PRINCIPAL DE VERANO";
        let fields = TicketFields {
            name: Some(long_name.to_string()),
            ..full_fields()
        };

        for layout in ALL_LAYOUTS {
            let Some(cap) = layout.name_limit() else {
                continue;
            };
            let out = render(&fields, layout);
            let expected: String = long_name.chars().take(cap).collect();

            assert!(!out.as_str().contains(long_name), "{}", layout.name());
            assert!(
                out.as_str().contains(&format!("\"{}\"", expected)),
                "{}",
                layout.name()
            );
        }
    }

    #[test]
    fn missing_fields_take_documented_defaults() {
        let out = render(&TicketFields::default(), TicketLayout::Receipt);
        let text = out.as_str();

        assert!(text.contains("\"000000000000\""));
        assert!(text.contains("\"PRODUCTO\""));
        assert!(text.contains("Precio: $0.00"));
        assert!(text.contains("SKU: N/A"));

        let today = chrono::Local::now().format("%d/%m/%Y").to_string();
        assert!(text.contains(&format!("Fecha: {}", today)));
    }

    #[test]
    fn epl_layouts_end_with_print_one_copy() {
        let fields = full_fields();
        for layout in ALL_LAYOUTS {
            if layout == TicketLayout::Ticket {
                continue;
            }
            let out = render(&fields, layout);
            assert_eq!(lines(&out).last(), Some(&"P1,1"), "{}", layout.name());
        }
    }

    #[test]
    fn ticket_places_price_at_both_mirrored_coordinates() {
        let fields = TicketFields {
            price: Some("300".to_string()),
            order: Some("1A2B3C4D".to_string()),
            section: Some("GENERAL".to_string()),
            row: Some("1".to_string()),
            seat: Some("1".to_string()),
            ..TicketFields::default()
        };

        let out = render_named(&fields, "ticket-default");
        let lines = lines(&out);

        assert!(lines.contains(&"VD,67,376,1,1,0,3E,300"));
        assert!(lines.contains(&"VD,66,1024,1,1,0,3E,300"));
        assert!(lines.contains(&"VD,234,397,1,1,0,3E,GENERAL"));
        assert!(lines.contains(&"VD,233,1045,1,1,0,3E,GENERAL"));

        // Exactly one terminator line, and it closes the command
        assert_eq!(lines.iter().filter(|&&l| l == "E").count(), 1);
        assert_eq!(lines.last(), Some(&"E"));
    }

    #[test]
    fn ticket_qr_payload_is_the_barcode_field() {
        let fields = TicketFields {
            barcode: Some("https://tickets.example/checkin/?id=MTMzNQ".to_string()),
            ..full_fields()
        };

        let out = render(&fields, TicketLayout::Ticket);
        let lines = lines(&out);
        let qr_cmd = lines.iter().position(|l| l.starts_with("W213,212")).unwrap();
        assert_eq!(lines[qr_cmd + 1], "https://tickets.example/checkin/?id=MTMzNQ");
    }

    #[test]
    fn ticket_defaults_leave_seat_fields_empty() {
        let out = render(&TicketFields::default(), TicketLayout::Ticket);
        assert!(out.as_str().contains("VD,67,376,1,1,0,3E,0.00"));
        assert!(out.as_str().contains("VD,358,397,1,1,0,3E,"));
    }
}
