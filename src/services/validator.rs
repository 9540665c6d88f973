use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::common::MAX_GUESTS;
use crate::models::reservation::{ReservationRecord, ValidationErrors};

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const DATE_REQUIRED: &str = "Date is required";
pub const DATE_INVALID: &str = "Please enter a valid date";
pub const DATE_IN_PAST: &str = "Please select a future date";
pub const TIME_REQUIRED: &str = "Time is required";
pub const GUESTS_REQUIRED: &str = "Number of guests is required";
pub const GUESTS_OUT_OF_RANGE: &str = "Please select between 1 and 8 guests";

// Shape check only: something@something.something, no whitespace, one '@'
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

pub fn validate_name(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some(NAME_REQUIRED.to_string());
    }
    None
}

pub fn validate_email(email: &str) -> Option<String> {
    if email.trim().is_empty() {
        Some(EMAIL_REQUIRED.to_string())
    } else if !email_pattern().is_match(email) {
        Some(EMAIL_INVALID.to_string())
    } else {
        None
    }
}

/// Checks a `YYYY-MM-DD` date against `today`. Dates equal to `today` pass.
pub fn validate_date(date: &str, today: NaiveDate) -> Option<String> {
    if date.is_empty() {
        return Some(DATE_REQUIRED.to_string());
    }

    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(selected) if selected < today => Some(DATE_IN_PAST.to_string()),
        Ok(_) => None,
        Err(e) => {
            debug!("Could not parse reservation date '{}': {}", date, e);
            Some(DATE_INVALID.to_string())
        }
    }
}

pub fn validate_time(time: &str) -> Option<String> {
    time.is_empty().then(|| TIME_REQUIRED.to_string())
}

pub fn validate_guests(guests: &str) -> Option<String> {
    if guests.is_empty() {
        return Some(GUESTS_REQUIRED.to_string());
    }

    match guests.parse::<u8>() {
        Ok(count) if (1..=MAX_GUESTS).contains(&count) => None,
        _ => Some(GUESTS_OUT_OF_RANGE.to_string()),
    }
}

/// Validates every checked field of `record`, relative to `today`.
///
/// The returned mapping only contains fields that failed; the record is
/// valid when it is empty. `phone`, `occasion` and `special_requests`
/// are never checked.
pub fn validate(record: &ReservationRecord, today: NaiveDate) -> ValidationErrors {
    ValidationErrors {
        name: validate_name(&record.name),
        email: validate_email(&record.email),
        date: validate_date(&record.date, today),
        time: validate_time(&record.time),
        guests: validate_guests(&record.guests),
    }
}

/// [`validate`] against the local calendar date.
pub fn validate_now(record: &ReservationRecord) -> ValidationErrors {
    validate(record, Local::now().date_naive())
}
