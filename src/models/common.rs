use serde::{Deserialize, Serialize};

pub const MAX_GUESTS: u8 = 8;

// One entry of a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Choices offered by the guests and occasion selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOptions {
    pub guests: Vec<SelectOption>,
    pub occasions: Vec<SelectOption>,
}

impl FormOptions {
    pub fn standard() -> Self {
        let guests = (1..=MAX_GUESTS)
            .map(|count| SelectOption {
                value: count.to_string(),
                label: if count == 1 {
                    "1 Guest".to_string()
                } else {
                    format!("{} Guests", count)
                },
            })
            .collect();

        let occasions = [
            ("birthday", "Birthday"),
            ("anniversary", "Anniversary"),
            ("business", "Business Dinner"),
            ("other", "Other"),
        ]
        .into_iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect();

        Self { guests, occasions }
    }
}
