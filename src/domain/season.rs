use time::{Month, OffsetDateTime};

/// Cropping season used to frame advisory prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Season {
    Summer,
    Kharif,
    Rabi,
}

impl Season {
    pub fn for_month(month: Month) -> Self {
        match month {
            Month::April | Month::May | Month::June => Season::Summer,
            Month::July | Month::August | Month::September | Month::October => Season::Kharif,
            _ => Season::Rabi,
        }
    }

    pub fn current() -> Self {
        Self::for_month(OffsetDateTime::now_utc().month())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Kharif => "Monsoon/Kharif",
            Season::Rabi => "Winter/Rabi",
        }
    }
}

pub const COMMON_CROPS: [&str; 6] = ["wheat", "rice", "cotton", "sugarcane", "maize", "pulses"];

pub const MAJOR_REGIONS: [&str; 6] = [
    "Punjab",
    "Haryana",
    "UP",
    "Maharashtra",
    "Karnataka",
    "Gujarat",
];
