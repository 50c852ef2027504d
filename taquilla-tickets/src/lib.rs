//! # taquilla-tickets
//!
//! Ticket template rendering for Godex-class label printers.
//!
//! ## Scope
//!
//! This crate decides WHAT goes to the printer:
//! - A closed catalog of EPL and TSPL template skeletons
//! - Field substitution with fixed defaults for missing values
//! - Line normalization (trim, drop blanks, CR-LF terminators)
//!
//! The command dialects are opaque text: nothing here parses or validates
//! EPL/TSPL syntax. Transports live in `taquilla-printer`; the two crates
//! are independent and meet on plain command text.
//!
//! ## Example
//!
//! ```
//! use taquilla_tickets::{TicketFields, render_named};
//!
//! let fields = TicketFields {
//!     name: Some("PRODUCTO DEMO".to_string()),
//!     price: Some("25.50".to_string()),
//!     ..TicketFields::default()
//! };
//!
//! let command = render_named(&fields, "barcode-top");
//! assert!(command.as_str().ends_with("P1,1\r\n"));
//! ```

mod fields;
mod layout;
mod render;

// Re-exports
pub use fields::{PrintTicketRequest, TicketFields};
pub use layout::TicketLayout;
pub use render::{RenderedCommand, normalize, render, render_named};
