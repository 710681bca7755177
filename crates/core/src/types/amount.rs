//! Amounts that the listing form stores as typed text.
//!
//! Price and odometer readings are persisted exactly as the seller entered
//! them. Older documents carry plain numbers, newer ones carry formatted text
//! such as `"R$ 2.000.000,00"` or `"8.800km"`, so readers must accept both.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored price or odometer value: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Default for Amount {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Amount {
    /// The numeric value, when stored as a number.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => {
                let raw = n.to_string();
                Decimal::from_str(&raw)
                    .or_else(|_| Decimal::from_scientific(&raw))
                    .ok()
            }
            Self::Text(_) => None,
        }
    }

    /// Whether the stored value is empty text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Render a price for display.
///
/// Numbers render as Brazilian reais with two decimals; text is shown as
/// entered.
///
/// ```
/// use drivex_core::{Amount, format_price};
///
/// assert_eq!(format_price(&Amount::from(5_550_000_u64)), "R$ 5.550.000,00");
/// assert_eq!(format_price(&Amount::from("R$ 90.000,00")), "R$ 90.000,00");
/// ```
#[must_use]
pub fn format_price(amount: &Amount) -> String {
    match amount.as_decimal() {
        Some(value) => {
            let fixed = format!("{:.2}", value.abs().round_dp(2));
            let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
            let sign = if value.is_sign_negative() && !value.is_zero() {
                "-"
            } else {
                ""
            };
            format!("{sign}R$ {},{frac_part}", group_thousands(int_part))
        }
        None => amount.to_string(),
    }
}

/// Render an odometer reading for display.
///
/// ```
/// use drivex_core::{Amount, format_odometer};
///
/// assert_eq!(format_odometer(&Amount::from(23_000_u64)), "23.000 km");
/// assert_eq!(format_odometer(&Amount::from("8.800km")), "8.800km");
/// ```
#[must_use]
pub fn format_odometer(amount: &Amount) -> String {
    match amount.as_decimal() {
        Some(value) => {
            let plain = value.abs().normalize().to_string();
            let grouped = match plain.split_once('.') {
                Some((int_part, frac_part)) => {
                    format!("{},{frac_part}", group_thousands(int_part))
                }
                None => group_thousands(&plain),
            };
            format!("{grouped} km")
        }
        None => amount.to_string(),
    }
}

/// Insert `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
