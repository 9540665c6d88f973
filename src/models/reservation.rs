use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownField;

/// The single record a guest fills in to request a table.
///
/// Every field is kept as the raw string the form sent; validation happens
/// separately so that half-typed input can always be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,   // YYYY-MM-DD
    pub time: String,   // HH:MM, 24h
    pub guests: String, // "1".."8" or empty
    pub occasion: String,
    pub special_requests: String,
}

impl ReservationRecord {
    pub fn get(&self, field: ReservationField) -> &str {
        match field {
            ReservationField::Name => &self.name,
            ReservationField::Email => &self.email,
            ReservationField::Phone => &self.phone,
            ReservationField::Date => &self.date,
            ReservationField::Time => &self.time,
            ReservationField::Guests => &self.guests,
            ReservationField::Occasion => &self.occasion,
            ReservationField::SpecialRequests => &self.special_requests,
        }
    }

    pub fn set(&mut self, field: ReservationField, value: String) {
        let slot = match field {
            ReservationField::Name => &mut self.name,
            ReservationField::Email => &mut self.email,
            ReservationField::Phone => &mut self.phone,
            ReservationField::Date => &mut self.date,
            ReservationField::Time => &mut self.time,
            ReservationField::Guests => &mut self.guests,
            ReservationField::Occasion => &mut self.occasion,
            ReservationField::SpecialRequests => &mut self.special_requests,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Identifies one field of a [`ReservationRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReservationField {
    Name,
    Email,
    Phone,
    Date,
    Time,
    Guests,
    Occasion,
    SpecialRequests,
}

impl ReservationField {
    pub const ALL: [ReservationField; 8] = [
        ReservationField::Name,
        ReservationField::Email,
        ReservationField::Phone,
        ReservationField::Date,
        ReservationField::Time,
        ReservationField::Guests,
        ReservationField::Occasion,
        ReservationField::SpecialRequests,
    ];

    /// Wire name used by the form and the JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationField::Name => "name",
            ReservationField::Email => "email",
            ReservationField::Phone => "phone",
            ReservationField::Date => "date",
            ReservationField::Time => "time",
            ReservationField::Guests => "guests",
            ReservationField::Occasion => "occasion",
            ReservationField::SpecialRequests => "specialRequests",
        }
    }
}

impl fmt::Display for ReservationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Per-field validation messages. Only `name`, `email`, `date`, `time` and
/// `guests` are ever validated; a `None` means the field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guests: Option<String>,
}

impl ValidationErrors {
    fn slot_mut(&mut self, field: ReservationField) -> Option<&mut Option<String>> {
        match field {
            ReservationField::Name => Some(&mut self.name),
            ReservationField::Email => Some(&mut self.email),
            ReservationField::Date => Some(&mut self.date),
            ReservationField::Time => Some(&mut self.time),
            ReservationField::Guests => Some(&mut self.guests),
            ReservationField::Phone
            | ReservationField::Occasion
            | ReservationField::SpecialRequests => None,
        }
    }

    pub fn get(&self, field: ReservationField) -> Option<&str> {
        let message = match field {
            ReservationField::Name => &self.name,
            ReservationField::Email => &self.email,
            ReservationField::Date => &self.date,
            ReservationField::Time => &self.time,
            ReservationField::Guests => &self.guests,
            ReservationField::Phone
            | ReservationField::Occasion
            | ReservationField::SpecialRequests => return None,
        };
        message.as_deref()
    }

    /// Drops the message for `field`, returning whether one was present.
    pub fn clear(&mut self, field: ReservationField) -> bool {
        self.slot_mut(field)
            .and_then(|slot| slot.take())
            .is_some()
    }

    /// Fields that currently carry a message, in form order.
    pub fn fields(&self) -> Vec<ReservationField> {
        ReservationField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
