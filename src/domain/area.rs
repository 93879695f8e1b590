use chrono_tz::Tz;

use crate::error::{ForecastError, Result};

/// Bidding/control area queried for a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub country: &'static str,
    pub eic: &'static str,
    pub tz: Tz,
}

const AREAS: &[Area] = &[
    Area { country: "AT", eic: "10YAT-APG------L", tz: Tz::Europe__Vienna },
    Area { country: "BE", eic: "10YBE----------2", tz: Tz::Europe__Brussels },
    Area { country: "BG", eic: "10YCA-BULGARIA-R", tz: Tz::Europe__Sofia },
    Area { country: "CH", eic: "10YCH-SWISSGRIDZ", tz: Tz::Europe__Zurich },
    Area { country: "CZ", eic: "10YCZ-CEPS-----N", tz: Tz::Europe__Prague },
    Area { country: "DE", eic: "10Y1001A1001A83F", tz: Tz::Europe__Berlin },
    Area { country: "DK", eic: "10Y1001A1001A65H", tz: Tz::Europe__Copenhagen },
    Area { country: "EE", eic: "10Y1001A1001A39I", tz: Tz::Europe__Tallinn },
    Area { country: "ES", eic: "10YES-REE------0", tz: Tz::Europe__Madrid },
    Area { country: "FI", eic: "10YFI-1--------U", tz: Tz::Europe__Helsinki },
    Area { country: "FR", eic: "10YFR-RTE------C", tz: Tz::Europe__Paris },
    Area { country: "GB", eic: "10YGB----------A", tz: Tz::Europe__London },
    Area { country: "GR", eic: "10YGR-HTSO-----Y", tz: Tz::Europe__Athens },
    Area { country: "HR", eic: "10YHR-HEP------M", tz: Tz::Europe__Zagreb },
    Area { country: "HU", eic: "10YHU-MAVIR----U", tz: Tz::Europe__Budapest },
    Area { country: "IE", eic: "10YIE-1001A00010", tz: Tz::Europe__Dublin },
    Area { country: "IT", eic: "10YIT-GRTN-----B", tz: Tz::Europe__Rome },
    Area { country: "LT", eic: "10YLT-1001A0008Q", tz: Tz::Europe__Vilnius },
    Area { country: "LU", eic: "10YLU-CEGEDEL-NQ", tz: Tz::Europe__Luxembourg },
    Area { country: "LV", eic: "10YLV-1001A00074", tz: Tz::Europe__Riga },
    Area { country: "NL", eic: "10YNL----------L", tz: Tz::Europe__Amsterdam },
    Area { country: "NO", eic: "10YNO-0--------C", tz: Tz::Europe__Oslo },
    Area { country: "PL", eic: "10YPL-AREA-----S", tz: Tz::Europe__Warsaw },
    Area { country: "PT", eic: "10YPT-REN------W", tz: Tz::Europe__Lisbon },
    Area { country: "RO", eic: "10YRO-TEL------P", tz: Tz::Europe__Bucharest },
    Area { country: "RS", eic: "10YCS-SERBIATSOV", tz: Tz::Europe__Belgrade },
    Area { country: "SE", eic: "10YSE-1--------K", tz: Tz::Europe__Stockholm },
    Area { country: "SI", eic: "10YSI-ELES-----O", tz: Tz::Europe__Ljubljana },
    Area { country: "SK", eic: "10YSK-SEPS-----K", tz: Tz::Europe__Bratislava },
];

impl Area {
    /// Looks up a two-letter country code (case-insensitive).
    pub fn from_country(code: &str) -> Result<Self> {
        let code = code.trim();
        AREAS
            .iter()
            .find(|a| a.country.eq_ignore_ascii_case(code))
            .copied()
            .ok_or_else(|| ForecastError::UnknownArea(code.to_string()))
    }

    pub fn all() -> &'static [Area] {
        AREAS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let area = Area::from_country("de").unwrap();
        assert_eq!(area.eic, "10Y1001A1001A83F");
        assert_eq!(area.tz, Tz::Europe__Berlin);
    }

    #[test]
    fn test_unknown_country() {
        assert!(matches!(
            Area::from_country("XX"),
            Err(ForecastError::UnknownArea(code)) if code == "XX"
        ));
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = Area::all().iter().map(|a| a.country).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Area::all().len());
    }
}
