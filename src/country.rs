//! Country catalogue
//!
//! Country-shaped editions store a bare index into a fixed, process-wide
//! table of ISO codes and English names. Index 0 is reserved for the unknown
//! country (`--` / `N/A`).

use crate::error::{GeoIpError, Result};
use serde::Serialize;

/// Built-in country codes, index-aligned with [`COUNTRY_NAMES`]
pub const COUNTRY_CODES: &[&str] = &[
    "--", "AP", "EU", "AD", "AE", "AF", "AG", "AI", "AL", "AM", "CW", "AO", "AQ", "AR", "AS",
    "AT", "AU", "AW", "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BM", "BN",
    "BO", "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI",
    "CK", "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "SX", "GA", "GB", "GD", "GE", "GF", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IN", "IO",
    "IQ", "IR", "IS", "IT", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR",
    "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA",
    "MC", "MD", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU",
    "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR",
    "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT",
    "PW", "PY", "QA", "RE", "RO", "RU", "RW", "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI",
    "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "ST", "SV", "SY", "SZ", "TC", "TD", "TF", "TG",
    "TH", "TJ", "TK", "TM", "TN", "TO", "TL", "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM",
    "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI", "VN", "VU", "WF", "WS", "YE", "YT", "RS",
    "ZA", "ZM", "ME", "ZW", "A1", "A2", "O1", "AX", "GG", "IM", "JE", "BL", "MF", "BQ", "SS",
    "O1",
];

/// Built-in country names, index-aligned with [`COUNTRY_CODES`]
pub const COUNTRY_NAMES: &[&str] = &[
    "N/A",
    "Asia/Pacific Region",
    "Europe",
    "Andorra",
    "United Arab Emirates",
    "Afghanistan",
    "Antigua and Barbuda",
    "Anguilla",
    "Albania",
    "Armenia",
    "Curacao",
    "Angola",
    "Antarctica",
    "Argentina",
    "American Samoa",
    "Austria",
    "Australia",
    "Aruba",
    "Azerbaijan",
    "Bosnia and Herzegovina",
    "Barbados",
    "Bangladesh",
    "Belgium",
    "Burkina Faso",
    "Bulgaria",
    "Bahrain",
    "Burundi",
    "Benin",
    "Bermuda",
    "Brunei Darussalam",
    "Bolivia",
    "Brazil",
    "Bahamas",
    "Bhutan",
    "Bouvet Island",
    "Botswana",
    "Belarus",
    "Belize",
    "Canada",
    "Cocos (Keeling) Islands",
    "Congo, The Democratic Republic of the",
    "Central African Republic",
    "Congo",
    "Switzerland",
    "Cote D'Ivoire",
    "Cook Islands",
    "Chile",
    "Cameroon",
    "China",
    "Colombia",
    "Costa Rica",
    "Cuba",
    "Cape Verde",
    "Christmas Island",
    "Cyprus",
    "Czech Republic",
    "Germany",
    "Djibouti",
    "Denmark",
    "Dominica",
    "Dominican Republic",
    "Algeria",
    "Ecuador",
    "Estonia",
    "Egypt",
    "Western Sahara",
    "Eritrea",
    "Spain",
    "Ethiopia",
    "Finland",
    "Fiji",
    "Falkland Islands (Malvinas)",
    "Micronesia, Federated States of",
    "Faroe Islands",
    "France",
    "Sint Maarten (Dutch part)",
    "Gabon",
    "United Kingdom",
    "Grenada",
    "Georgia",
    "French Guiana",
    "Ghana",
    "Gibraltar",
    "Greenland",
    "Gambia",
    "Guinea",
    "Guadeloupe",
    "Equatorial Guinea",
    "Greece",
    "South Georgia and the South Sandwich Islands",
    "Guatemala",
    "Guam",
    "Guinea-Bissau",
    "Guyana",
    "Hong Kong",
    "Heard Island and McDonald Islands",
    "Honduras",
    "Croatia",
    "Haiti",
    "Hungary",
    "Indonesia",
    "Ireland",
    "Israel",
    "India",
    "British Indian Ocean Territory",
    "Iraq",
    "Iran, Islamic Republic of",
    "Iceland",
    "Italy",
    "Jamaica",
    "Jordan",
    "Japan",
    "Kenya",
    "Kyrgyzstan",
    "Cambodia",
    "Kiribati",
    "Comoros",
    "Saint Kitts and Nevis",
    "Korea, Democratic People's Republic of",
    "Korea, Republic of",
    "Kuwait",
    "Cayman Islands",
    "Kazakhstan",
    "Lao People's Democratic Republic",
    "Lebanon",
    "Saint Lucia",
    "Liechtenstein",
    "Sri Lanka",
    "Liberia",
    "Lesotho",
    "Lithuania",
    "Luxembourg",
    "Latvia",
    "Libya",
    "Morocco",
    "Monaco",
    "Moldova, Republic of",
    "Madagascar",
    "Marshall Islands",
    "Macedonia",
    "Mali",
    "Myanmar",
    "Mongolia",
    "Macau",
    "Northern Mariana Islands",
    "Martinique",
    "Mauritania",
    "Montserrat",
    "Malta",
    "Mauritius",
    "Maldives",
    "Malawi",
    "Mexico",
    "Malaysia",
    "Mozambique",
    "Namibia",
    "New Caledonia",
    "Niger",
    "Norfolk Island",
    "Nigeria",
    "Nicaragua",
    "Netherlands",
    "Norway",
    "Nepal",
    "Nauru",
    "Niue",
    "New Zealand",
    "Oman",
    "Panama",
    "Peru",
    "French Polynesia",
    "Papua New Guinea",
    "Philippines",
    "Pakistan",
    "Poland",
    "Saint Pierre and Miquelon",
    "Pitcairn Islands",
    "Puerto Rico",
    "Palestinian Territory",
    "Portugal",
    "Palau",
    "Paraguay",
    "Qatar",
    "Reunion",
    "Romania",
    "Russian Federation",
    "Rwanda",
    "Saudi Arabia",
    "Solomon Islands",
    "Seychelles",
    "Sudan",
    "Sweden",
    "Singapore",
    "Saint Helena",
    "Slovenia",
    "Svalbard and Jan Mayen",
    "Slovakia",
    "Sierra Leone",
    "San Marino",
    "Senegal",
    "Somalia",
    "Suriname",
    "Sao Tome and Principe",
    "El Salvador",
    "Syrian Arab Republic",
    "Swaziland",
    "Turks and Caicos Islands",
    "Chad",
    "French Southern Territories",
    "Togo",
    "Thailand",
    "Tajikistan",
    "Tokelau",
    "Turkmenistan",
    "Tunisia",
    "Tonga",
    "Timor-Leste",
    "Turkey",
    "Trinidad and Tobago",
    "Tuvalu",
    "Taiwan",
    "Tanzania, United Republic of",
    "Ukraine",
    "Uganda",
    "United States Minor Outlying Islands",
    "United States",
    "Uruguay",
    "Uzbekistan",
    "Holy See (Vatican City State)",
    "Saint Vincent and the Grenadines",
    "Venezuela",
    "Virgin Islands, British",
    "Virgin Islands, U.S.",
    "Vietnam",
    "Vanuatu",
    "Wallis and Futuna",
    "Samoa",
    "Yemen",
    "Mayotte",
    "Serbia",
    "South Africa",
    "Zambia",
    "Montenegro",
    "Zimbabwe",
    "Anonymous Proxy",
    "Satellite Provider",
    "Other",
    "Aland Islands",
    "Guernsey",
    "Isle of Man",
    "Jersey",
    "Saint Barthelemy",
    "Saint Martin",
    "Bonaire, Saint Eustatius and Saba",
    "South Sudan",
    "Other",
];

const _: () = assert!(COUNTRY_CODES.len() == COUNTRY_NAMES.len());

/// A country entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Country {
    /// Two-letter code (`--` when unknown)
    pub code: &'static str,
    /// English name (`N/A` when unknown)
    pub name: &'static str,
}

impl Country {
    /// The reserved unknown country
    pub const UNKNOWN: Country = Country {
        code: "--",
        name: "N/A",
    };

    /// True for the reserved unknown entry
    pub fn is_unknown(&self) -> bool {
        self.code == Self::UNKNOWN.code
    }
}

/// Index-aligned code and name tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryTable {
    codes: &'static [&'static str],
    names: &'static [&'static str],
}

impl CountryTable {
    /// The compiled-in table
    pub const BUILTIN: CountryTable = CountryTable {
        codes: COUNTRY_CODES,
        names: COUNTRY_NAMES,
    };

    /// Build a table from parallel code and name sequences
    ///
    /// Index 0 of both sequences is treated as the unknown entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeoIpError::CountryTableMismatch`] if the sequences differ in
    /// length or are empty.
    pub fn new(codes: &'static [&'static str], names: &'static [&'static str]) -> Result<Self> {
        if codes.len() != names.len() || codes.is_empty() {
            return Err(GeoIpError::CountryTableMismatch {
                codes: codes.len(),
                names: names.len(),
            });
        }
        Ok(CountryTable { codes, names })
    }

    /// Number of entries, including the unknown entry
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Look up an entry by index; index 0 always yields [`Country::UNKNOWN`]
    pub fn get(&self, index: usize) -> Option<Country> {
        if index == 0 {
            return Some(Country::UNKNOWN);
        }
        Some(Country {
            code: *self.codes.get(index)?,
            name: *self.names.get(index)?,
        })
    }

    /// Find the index of a country code
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|&c| c == code)
    }

    /// All known country codes
    pub fn codes(&self) -> &'static [&'static str] {
        self.codes
    }

    /// All known country names
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }
}

impl Default for CountryTable {
    fn default() -> Self {
        Self::BUILTIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = CountryTable::BUILTIN;
        assert_eq!(table.len(), 256);
        assert_eq!(table.get(0), Some(Country::UNKNOWN));
        assert_eq!(
            table.get(225),
            Some(Country {
                code: "US",
                name: "United States"
            })
        );
        assert_eq!(table.get(38).unwrap().code, "CA");
        assert_eq!(table.get(256), None);
        assert_eq!(table.index_of("DE"), Some(56));
    }

    #[test]
    fn test_injected_table() {
        static CODES: [&str; 2] = ["--", "US"];
        static NAMES: [&str; 2] = ["N/A", "United States"];
        let table = CountryTable::new(&CODES, &NAMES).unwrap();
        assert_eq!(table.get(1).unwrap().code, "US");
        assert!(table.get(0).unwrap().is_unknown());
    }

    #[test]
    fn test_mismatched_table_rejected() {
        static CODES: [&str; 3] = ["--", "US", "CA"];
        static NAMES: [&str; 2] = ["N/A", "United States"];
        let err = CountryTable::new(&CODES, &NAMES).unwrap_err();
        assert!(matches!(
            err,
            GeoIpError::CountryTableMismatch { codes: 3, names: 2 }
        ));
    }
}
