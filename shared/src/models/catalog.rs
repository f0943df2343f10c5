//! Closed catalogues of sports and amenities a turf can offer

use serde::{Deserialize, Serialize};

/// Sports a turf can be booked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sport {
    Football,
    Cricket,
    Basketball,
    Tennis,
    Badminton,
    Volleyball,
    Hockey,
    /// Free-text sport carried in `custom_sport`
    Other,
}

impl Sport {
    pub const ALL: [Sport; 8] = [
        Sport::Football,
        Sport::Cricket,
        Sport::Basketball,
        Sport::Tennis,
        Sport::Badminton,
        Sport::Volleyball,
        Sport::Hockey,
        Sport::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "Football",
            Sport::Cricket => "Cricket",
            Sport::Basketball => "Basketball",
            Sport::Tennis => "Tennis",
            Sport::Badminton => "Badminton",
            Sport::Volleyball => "Volleyball",
            Sport::Hockey => "Hockey",
            Sport::Other => "Other",
        }
    }

    /// Case-insensitive lookup by name
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Sport::ALL
            .into_iter()
            .find(|sport| sport.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facilities available at a turf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Parking,
    Washroom,
    ChangingRoom,
    DrinkingWater,
    Floodlights,
    Cafeteria,
    FirstAid,
    Seating,
    Showers,
    EquipmentRental,
}

impl std::fmt::Display for Amenity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Amenity::Parking => write!(f, "Parking"),
            Amenity::Washroom => write!(f, "Washroom"),
            Amenity::ChangingRoom => write!(f, "Changing Room"),
            Amenity::DrinkingWater => write!(f, "Drinking Water"),
            Amenity::Floodlights => write!(f, "Floodlights"),
            Amenity::Cafeteria => write!(f, "Cafeteria"),
            Amenity::FirstAid => write!(f, "First Aid"),
            Amenity::Seating => write!(f, "Seating"),
            Amenity::Showers => write!(f, "Showers"),
            Amenity::EquipmentRental => write!(f, "Equipment Rental"),
        }
    }
}

/// `custom_sport` must be filled exactly when `Other` is offered
pub fn validate_sports(
    sports: &[Sport],
    custom_sport: Option<&str>,
) -> Result<(), crate::validation::FieldError> {
    use crate::validation::FieldError;

    if sports.is_empty() {
        return Err(FieldError::new("sports", "Select at least one sport"));
    }
    if has_duplicates(sports) {
        return Err(FieldError::new("sports", "Each sport may be listed only once"));
    }
    let custom = custom_sport.map(str::trim).filter(|s| !s.is_empty());
    if sports.contains(&Sport::Other) && custom.is_none() {
        return Err(FieldError::new(
            "custom_sport",
            "Name the sport when selecting Other",
        ));
    }
    Ok(())
}

pub fn validate_amenities(amenities: &[Amenity]) -> Result<(), crate::validation::FieldError> {
    if has_duplicates(amenities) {
        return Err(crate::validation::FieldError::new(
            "amenities",
            "Each amenity may be listed only once",
        ));
    }
    Ok(())
}

fn has_duplicates<T: PartialEq>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, item)| items[..i].contains(item))
}
