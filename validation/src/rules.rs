//! Type-specific field rules.
//!
//! Each rule receives an already trimmed, non-empty value and is only invoked
//! once the presence check has passed.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use idgate_types::field::names;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_DECLARATION: &str = "Please accept this declaration.";
pub const MSG_UNDERAGE: &str = "You must be at least 18 years old to verify.";
pub const MSG_PO_BOX: &str = "PO Boxes cannot be used for verification.";
pub const MSG_MOBILE: &str = "Enter a valid mobile number (digits only, at least 7 digits).";
pub const MSG_LETTERS: &str = "Use letters and spaces only.";
pub const MSG_POSTCODE: &str = "Enter a 4-digit postcode.";

pub const MINIMUM_AGE: i32 = 18;

fn po_box_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bP(?:ost)?\.?\s*O(?:ffice)?\.?\s*Box\b").expect("PO Box pattern is valid")
    })
}

fn mobile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{7,}$").expect("mobile pattern is valid"))
}

fn letters_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]+(?: [A-Za-z]+)*$").expect("letters pattern is valid")
    })
}

fn postcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").expect("postcode pattern is valid"))
}

/// Whole years between `dob` and `today`, counting a birthday only once its
/// month and day have been reached.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Date of birth must make the customer at least 18. Unparseable dates pass.
pub fn is_adult(value: &str, today: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(dob) => age_on(dob, today) >= MINIMUM_AGE,
        Err(_) => {
            tracing::debug!(value, "unparseable date of birth, not blocking");
            true
        }
    }
}

pub fn is_po_box(value: &str) -> bool {
    po_box_pattern().is_match(value)
}

pub fn is_valid_mobile(value: &str) -> bool {
    mobile_pattern().is_match(value)
}

pub fn is_letters_and_spaces(value: &str) -> bool {
    letters_pattern().is_match(value)
}

pub fn is_valid_postcode(value: &str) -> bool {
    postcode_pattern().is_match(value)
}

/// Run the rule registered for `name`, returning the message on failure.
pub fn check(name: &str, value: &str, today: NaiveDate) -> Result<(), &'static str> {
    let (ok, message) = match name {
        names::DOB => (is_adult(value, today), MSG_UNDERAGE),
        names::ADDRESS_LINE1 => (!is_po_box(value), MSG_PO_BOX),
        names::MOBILE => (is_valid_mobile(value), MSG_MOBILE),
        names::SUBURB | names::CITY => (is_letters_and_spaces(value), MSG_LETTERS),
        names::POSTCODE => (is_valid_postcode(value), MSG_POSTCODE),
        _ => (true, ""),
    };
    if ok {
        Ok(())
    } else {
        Err(message)
    }
}
