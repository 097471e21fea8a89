//! Checkout handoff.
//!
//! There is no payment flow: checkout turns the cart into a plain-text order
//! summary and a WhatsApp deep link that opens a chat with the shop with the
//! summary pre-filled.

use askama::Template;
use cyborgtech_core::{Cart, format_amount};
use serde::Serialize;
use thiserror::Error;
use url::Url;

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Errors raised while preparing a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cannot check out an empty cart")]
    EmptyCart,
    #[error("failed to render order summary: {0}")]
    Render(#[from] askama::Error),
    #[error("failed to build checkout link: {0}")]
    Link(#[from] url::ParseError),
}

struct SummaryLine<'a> {
    name: &'a str,
    quantity: u32,
    subtotal: String,
}

#[derive(Template)]
#[template(path = "order_summary.txt")]
struct OrderSummaryTemplate<'a> {
    lines: Vec<SummaryLine<'a>>,
    total: String,
}

/// A prepared checkout: the summary text and the link that carries it.
#[derive(Debug, Clone, Serialize)]
pub struct Checkout {
    pub url: String,
    pub summary: String,
}

/// Render the plain-text order summary for `cart`.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart.
pub fn order_summary(cart: &Cart) -> Result<String, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let template = OrderSummaryTemplate {
        lines: cart
            .items()
            .iter()
            .map(|line| SummaryLine {
                name: &line.name,
                quantity: line.quantity,
                subtotal: format_amount(line.subtotal()),
            })
            .collect(),
        total: format_amount(cart.total()),
    };

    Ok(template.render()?.trim_end().to_string())
}

/// WhatsApp link carrying `message`, addressed to `phone` when given.
///
/// Non-digit characters in `phone` are ignored.
///
/// # Errors
///
/// Returns an error if the resulting URL does not parse.
pub fn whatsapp_link(phone: Option<&str>, message: &str) -> Result<Url, CheckoutError> {
    let digits: String = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let link = format!(
        "{WHATSAPP_BASE}{digits}?text={}",
        urlencoding::encode(message)
    );
    Ok(Url::parse(&link)?)
}

/// Summary plus link for `cart`.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart.
pub fn prepare(cart: &Cart, phone: Option<&str>) -> Result<Checkout, CheckoutError> {
    let summary = order_summary(cart)?;
    let url = whatsapp_link(phone, &summary)?;
    Ok(Checkout {
        url: url.into(),
        summary,
    })
}
