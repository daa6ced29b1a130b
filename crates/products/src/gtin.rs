//! GS1 Global Trade Item Number (barcode) value object.

use serde::{Deserialize, Serialize};

use antiwaste_core::{DomainError, DomainResult, ValueObject};

/// A GTIN-8/12/13/14 with a verified check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gtin(String);

impl ValueObject for Gtin {}

impl Gtin {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();

        if !matches!(raw.len(), 8 | 12 | 13 | 14) {
            return Err(DomainError::validation("GTIN must have 8, 12, 13 or 14 digits"));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation("GTIN must contain digits only"));
        }

        let digits: Vec<u32> = raw.bytes().map(|b| u32::from(b - b'0')).collect();
        let (body, check) = digits.split_at(digits.len() - 1);

        // Weights alternate 3,1,3,... starting from the digit left of the check digit.
        let sum: u32 = body
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
            .sum();
        if (10 - sum % 10) % 10 != check[0] {
            return Err(DomainError::validation("GTIN check digit mismatch"));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Gtin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
