//! Postal address value object.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Postal address with optional geocoordinates.
///
/// Immutable: a seller's address is replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    city: String,
    zip_code: Option<String>,
    country: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl ValueObject for Address {}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        zip_code: Option<String>,
        country: impl Into<String>,
    ) -> DomainResult<Self> {
        let street = street.into();
        let city = city.into();
        let country = country.into();

        if street.trim().is_empty() {
            return Err(DomainError::validation("street cannot be empty"));
        }
        if city.trim().is_empty() {
            return Err(DomainError::validation("city cannot be empty"));
        }
        if country.trim().is_empty() {
            return Err(DomainError::validation("country cannot be empty"));
        }

        Ok(Self {
            street: street.trim().to_string(),
            city: city.trim().to_string(),
            zip_code: zip_code
                .map(|z| z.trim().to_string())
                .filter(|z| !z.is_empty()),
            country: country.trim().to_string(),
            latitude: None,
            longitude: None,
        })
    }

    /// Return a copy of this address pinned to the given coordinates.
    pub fn with_coordinates(self, latitude: f64, longitude: f64) -> DomainResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation("longitude must be within [-180, 180]"));
        }
        Ok(Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..self
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn zip_code(&self) -> Option<&str> {
        self.zip_code.as_deref()
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_city_is_rejected() {
        let err = Address::new("1 Rue A", "  ", None, "MA").unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("city")));
    }

    #[test]
    fn blank_zip_code_is_dropped() {
        let addr = Address::new("1 Rue A", "Rabat", Some(" ".into()), "MA").unwrap();
        assert_eq!(addr.zip_code(), None);
    }

    #[test]
    fn coordinates_are_range_checked() {
        let addr = Address::new("1 Rue A", "Rabat", None, "MA").unwrap();
        assert!(addr.clone().with_coordinates(91.0, 0.0).is_err());
        assert!(addr.clone().with_coordinates(0.0, -181.0).is_err());

        let pinned = addr.with_coordinates(34.02, -6.83).unwrap();
        assert_eq!(pinned.latitude(), Some(34.02));
        assert_eq!(pinned.longitude(), Some(-6.83));
    }
}
