//! Fixtures: matchdays and knock-out rounds with a sortable number.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Numbered matchday, e.g. "5".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MATCHDAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}$").expect("valid regex"));

/// Titled number, e.g. "Matchday 5" or "Jornada 12".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TITLED_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+) (\d{1,3})$").expect("valid regex"));

/// Round-robin round on a normalized token, e.g. "roundof16".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ROUND_OF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"round(?:of)?(\d+)").expect("valid regex"));

/// Offset keeping "Round of K" fixtures after every numbered matchday.
const ROUND_ROBIN_BASE: u32 = 1_024;

/// A fixture within a season.
///
/// Equality and ordering are by `number` only, so "Matchday 3" and
/// "Jornada 3" are the same fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub title: Cow<'static, str>,
    pub number: u32,
}

impl Fixture {
    pub const GROUP_STAGE: Fixture = Fixture::canonical("Group Stage", 256);
    pub const ROUND_OF_64: Fixture = Fixture::canonical("Round of 64", ROUND_ROBIN_BASE * 16);
    pub const ROUND_OF_32: Fixture = Fixture::canonical("Round of 32", ROUND_ROBIN_BASE * 32);
    pub const ROUND_OF_16: Fixture = Fixture::canonical("Round of 16", ROUND_ROBIN_BASE * 64);
    pub const QUARTER_FINAL: Fixture = Fixture::canonical("Quarter-Final", 1_024 * 1_024);
    pub const SEMI_FINAL: Fixture = Fixture::canonical("Semi-Final", 4 * 1_024 * 1_024);
    pub const PLAYOFF: Fixture = Fixture::canonical("Playoff", 8 * 1_024 * 1_024);
    pub const FINAL: Fixture = Fixture::canonical("Final", 16 * 1_024 * 1_024);

    const fn canonical(title: &'static str, number: u32) -> Self {
        Self {
            title: Cow::Borrowed(title),
            number,
        }
    }

    /// A numbered matchday.
    #[must_use]
    pub fn matchday(number: u32) -> Self {
        Self {
            title: Cow::Owned(format!("Matchday {number}")),
            number,
        }
    }

    /// Parse a fixture token.
    ///
    /// Numeric strings become `Matchday N`; textual tokens are matched
    /// ignoring case, whitespace and hyphens against the canonical fixtures.
    ///
    /// # Returns
    /// `None` when the token is not recognized.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if MATCHDAY_PATTERN.is_match(text) {
            return text.parse().ok().map(Self::matchday);
        }

        if let Some(caps) = TITLED_NUMBER_PATTERN.captures(text) {
            if let Ok(number) = caps[2].parse() {
                return Some(Self {
                    title: Cow::Owned(format!("{} {number}", &caps[1])),
                    number,
                });
            }
        }

        let token: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        if token.contains("group") {
            Some(Self::GROUP_STAGE)
        } else if token.contains("quarter") {
            Some(Self::QUARTER_FINAL)
        } else if token.contains("semi") {
            Some(Self::SEMI_FINAL)
        } else if token.contains("playoff") {
            Some(Self::PLAYOFF)
        } else if token.contains("final") {
            Some(Self::FINAL)
        } else {
            ROUND_OF_PATTERN
                .captures(&token)
                .and_then(|caps| caps[1].parse().ok())
                .and_then(Self::round_of)
        }
    }

    fn round_of(teams: u32) -> Option<Self> {
        match teams {
            16 => Some(Self::ROUND_OF_16),
            32 => Some(Self::ROUND_OF_32),
            64 => Some(Self::ROUND_OF_64),
            _ => ROUND_ROBIN_BASE.checked_add(teams).map(|number| Self {
                title: Cow::Owned(format!("Round of {teams}")),
                number,
            }),
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::canonical("", 0)
    }
}

impl PartialEq for Fixture {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Fixture {}

impl Hash for Fixture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}

impl PartialOrd for Fixture {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fixture {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
