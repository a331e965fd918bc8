//! Input Normalization - Canonical Display Values
//!
//! Three independent, idempotent derivations. The cutoff year is evaluated
//! fresh on every call; a long-running process must never print a stale year.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::RawInput;

/// Fixed tag prepended to the raw membership ID.
pub const MEMBERSHIP_PREFIX: &str = "ZIG";

/// Registrations run to 31 August; the printed year rolls over on 1 June.
const CUTOFF_MONTH: u32 = 6;
const CUTOFF_DAY: u32 = 1;

/// Normalized values as they appear on the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateFields {
    pub display_name: String,
    pub category_statement: String,
    pub membership_number: String,
}

impl CertificateFields {
    /// Derive display values from the raw fields using today's date.
    pub fn derive(raw: &RawInput) -> Self {
        Self::derive_at(raw, Local::now().date_naive())
    }

    /// Date-explicit variant; `derive` delegates here.
    pub fn derive_at(raw: &RawInput, today: NaiveDate) -> Self {
        Self {
            display_name: capitalize_words(&raw.name),
            category_statement: category_statement(&raw.category_code, today),
            membership_number: membership_number(&raw.membership_id),
        }
    }
}

/// Capitalize the first letter of every space-delimited word and lower-case
/// the remainder. Empty input yields empty output.
pub fn capitalize_words(sentence: &str) -> String {
    sentence
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut out: String = first.to_uppercase().collect();
                    out.push_str(&chars.as_str().to_lowercase());
                    out
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prefix the raw ID verbatim; the ID format itself is not validated here.
pub fn membership_number(membership_id: &str) -> String {
    format!("{}{}", MEMBERSHIP_PREFIX, membership_id)
}

/// The printed expiry year: current year before 1 June, next year on or
/// after it.
pub fn expiry_year(today: NaiveDate) -> i32 {
    let cutoff = NaiveDate::from_ymd_opt(today.year(), CUTOFF_MONTH, CUTOFF_DAY)
        .expect("June 1 exists in every year");
    if today >= cutoff {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Build the registration sentence. The category code is embedded with its
/// case unmodified.
pub fn category_statement(category_code: &str, today: NaiveDate) -> String {
    format!(
        "REGISTERED AS A GEOMATICS {} UNTIL 31 AUGUST {}",
        category_code,
        expiry_year(today)
    )
}
