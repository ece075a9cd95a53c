//! Football seasons.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A season spanning two calendar years, August 1 to May 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Season {
    pub start_year: i32,
    pub end_year: i32,
}

impl Season {
    /// Earliest accepted year.
    pub const MIN_YEAR: i32 = 1_900;

    /// Latest accepted year.
    pub const MAX_YEAR: i32 = 3_000;

    /// Create a season; `None` if either year is out of range.
    #[must_use]
    pub fn new(start_year: i32, end_year: i32) -> Option<Self> {
        let range = Self::MIN_YEAR..=Self::MAX_YEAR;
        if range.contains(&start_year) && range.contains(&end_year) {
            Some(Self {
                start_year,
                end_year,
            })
        } else {
            None
        }
    }

    /// The season starting in the current calendar year.
    #[must_use]
    pub fn current() -> Self {
        let year = chrono::Local::now().year();
        Self {
            start_year: year,
            end_year: year + 1,
        }
    }

    /// Parse `YY/YY`, `YYYY/YYYY` or a bare start year.
    ///
    /// Two-digit years below 50 belong to the 2000s, the rest to the 1900s.
    ///
    /// # Examples
    /// ```
    /// use matchday_harvester::types::Season;
    ///
    /// assert_eq!(Season::parse("19/20"), Season::new(2019, 2020));
    /// assert_eq!(Season::parse("2024/2025"), Season::new(2024, 2025));
    /// assert_eq!(Season::parse("23"), Season::new(2023, 2024));
    /// assert_eq!(Season::parse("next year"), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let years = text
            .split('/')
            .map(|part| part.trim().parse::<i32>().ok().map(expand_year))
            .collect::<Option<Vec<_>>>()?;

        match years.as_slice() {
            [start, end] => Self::new(*start, *end),
            [start] => start.checked_add(1).and_then(|end| Self::new(*start, end)),
            _ => None,
        }
    }

    /// First day of the season.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, 8, 1)
    }

    /// Last day of the season.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.end_year, 5, 31)
    }
}

fn expand_year(year: i32) -> i32 {
    match year {
        0..=49 => year + 2_000,
        50..=99 => year + 1_900,
        _ => year,
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start_year, self.end_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_digit_years() {
        assert_eq!(Season::parse("19/20"), Season::new(2019, 2020));
        assert_eq!(Season::parse("99/00"), Season::new(1999, 2000));
        assert_eq!(Season::parse(" 23 / 24 "), Season::new(2023, 2024));
    }

    #[test]
    fn test_parse_four_digit_years() {
        assert_eq!(Season::parse("2024/2025"), Season::new(2024, 2025));
    }

    #[test]
    fn test_parse_single_year() {
        assert_eq!(Season::parse("23"), Season::new(2023, 2024));
        assert_eq!(Season::parse("2010"), Season::new(2010, 2011));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Season::parse(""), None);
        assert_eq!(Season::parse("20xx"), None);
        assert_eq!(Season::parse("19/20/21"), None);
        assert_eq!(Season::parse("1850/1851"), None);
    }

    #[test]
    fn test_parse_out_of_range_single_year() {
        assert_eq!(Season::parse("2147483647"), None);
        assert_eq!(Season::parse("99999999999"), None);
    }

    #[test]
    fn test_current_spans_one_year() {
        let season = Season::current();
        assert_eq!(season.end_year - season.start_year, 1);
    }

    #[test]
    fn test_dates_and_display() {
        let season = Season::new(2023, 2024).unwrap();
        assert_eq!(season.start_date(), NaiveDate::from_ymd_opt(2023, 8, 1));
        assert_eq!(season.end_date(), NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(season.to_string(), "2023/2024");
    }
}
