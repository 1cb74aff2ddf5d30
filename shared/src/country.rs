//! Country routing: which collection holds the postal codes of a country.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Countries with a postal code collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
    UnitedStates,
    Canada,
    Spain,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::UnitedStates, Country::Canada, Country::Spain];

    /// Three-letter code used by callers.
    pub fn code(self) -> &'static str {
        match self {
            Country::UnitedStates => "USA",
            Country::Canada => "CAD",
            Country::Spain => "ESP",
        }
    }

    /// Name of the collection holding this country's postal codes.
    pub fn collection(self) -> &'static str {
        match self {
            Country::UnitedStates => "us_zip_codes",
            Country::Canada => "ca_zip_codes",
            Country::Spain => "es_zip_codes",
        }
    }
}

impl FromStr for Country {
    type Err = Error;

    /// Case-insensitive, exact. There is no fallback collection.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Country::ALL
            .into_iter()
            .find(|country| country.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| Error::UnsupportedCountry(code.to_string()))
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolve a caller-supplied country code to its collection name.
pub fn resolve_collection(country_code: &str) -> crate::Result<&'static str> {
    country_code.parse::<Country>().map(Country::collection)
}
