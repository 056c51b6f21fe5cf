//! Rotation configuration
//!
//! A rotation advances on a fixed cadence. The cadence is a closed set of
//! variants, each carrying only the fields it needs. On disk the config keeps
//! the flat shape operators write by hand:
//!
//! ```toml
//! frequency = "weekly"
//! week_start_day = 1   # 0 = Sunday .. 6 = Saturday
//! ```

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::error::RotationError;

/// How often the rotation hands over to the next member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// Every calendar day (UTC)
    Daily,
    /// Every week, starting on `week_start`
    Weekly { week_start: Weekday },
    /// Every two weeks, using the same week boundary as `Weekly`
    BiWeekly { week_start: Weekday },
    /// Every calendar month. `month_day` is the handover day operators
    /// announce; period boundaries are always the calendar month.
    Monthly { month_day: u8 },
    /// Every `interval` days, counted from the 2024-01-01 epoch
    Custom { interval: NonZeroU32 },
}

impl Frequency {
    /// Returns the config name of the frequency
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly { .. } => "weekly",
            Frequency::BiWeekly { .. } => "biweekly",
            Frequency::Monthly { .. } => "monthly",
            Frequency::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly { week_start } => write!(f, "weekly (starting {})", week_start),
            Frequency::BiWeekly { week_start } => {
                write!(f, "biweekly (starting {})", week_start)
            }
            Frequency::Monthly { month_day } => write!(f, "monthly (day {})", month_day),
            Frequency::Custom { interval } => write!(f, "every {} days", interval),
        }
    }
}

/// Bare frequency name, without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyName {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Custom,
}

impl FromStr for FrequencyName {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(FrequencyName::Daily),
            "weekly" => Ok(FrequencyName::Weekly),
            "biweekly" | "bi-weekly" | "bi_weekly" | "fortnightly" => Ok(FrequencyName::BiWeekly),
            "monthly" => Ok(FrequencyName::Monthly),
            "custom" => Ok(FrequencyName::Custom),
            _ => Err(RotationError::UnsupportedFrequency {
                value: s.to_string(),
            }),
        }
    }
}

/// Converts a 0 = Sunday .. 6 = Saturday day number into a weekday
pub fn weekday_from_number(day: u8) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Longest custom interval accepted, in days (about a century)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Validated rotation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRotationConfig", into = "RawRotationConfig")]
pub struct RotationConfig {
    frequency: Frequency,
}

impl RotationConfig {
    pub fn new(frequency: Frequency) -> Self {
        Self { frequency }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    pub fn weekly(week_start: Weekday) -> Self {
        Self::new(Frequency::Weekly { week_start })
    }

    pub fn biweekly(week_start: Weekday) -> Self {
        Self::new(Frequency::BiWeekly { week_start })
    }

    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly { month_day: 1 })
    }

    /// Creates a custom-interval config of 1 to [`MAX_INTERVAL_DAYS`] days
    pub fn custom(interval: u32) -> Result<Self, RotationError> {
        let interval = NonZeroU32::new(interval)
            .filter(|n| n.get() <= MAX_INTERVAL_DAYS)
            .ok_or_else(|| RotationError::InvalidConfig {
                field: "interval",
                value: interval.to_string(),
                reason: "must be 1 to 36500 days",
            })?;
        Ok(Self::new(Frequency::Custom { interval }))
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Every invariant breach in this config
    pub fn violations(&self) -> Vec<RotationError> {
        RawRotationConfig::from(*self).violations()
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self::weekly(Weekday::Mon)
    }
}

impl fmt::Display for RotationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.frequency.fmt(f)
    }
}

/// Flat, unvalidated config shape as stored in TOML and JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRotationConfig {
    pub frequency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,

    #[serde(default, alias = "weekStartDay", skip_serializing_if = "Option::is_none")]
    pub week_start_day: Option<i64>,

    #[serde(default, alias = "monthDay", skip_serializing_if = "Option::is_none")]
    pub month_day: Option<i64>,
}

impl Default for RawRotationConfig {
    fn default() -> Self {
        RotationConfig::default().into()
    }
}

impl RawRotationConfig {
    /// Collects every problem with this config instead of stopping at the first
    pub fn violations(&self) -> Vec<RotationError> {
        let mut errors = Vec::new();

        let name = match self.frequency.parse::<FrequencyName>() {
            Ok(name) => Some(name),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        match (name, self.interval) {
            (Some(FrequencyName::Custom), None) => errors.push(RotationError::InvalidConfig {
                field: "interval",
                value: "none".to_string(),
                reason: "required for custom frequency",
            }),
            (_, Some(n)) if !(1..=i64::from(MAX_INTERVAL_DAYS)).contains(&n) => {
                errors.push(RotationError::InvalidConfig {
                    field: "interval",
                    value: n.to_string(),
                    reason: "must be 1 to 36500 days",
                })
            }
            _ => {}
        }

        if let Some(day) = self.week_start_day {
            if !(0..=6).contains(&day) {
                errors.push(RotationError::InvalidConfig {
                    field: "week_start_day",
                    value: day.to_string(),
                    reason: "must be 0 (Sunday) to 6 (Saturday)",
                });
            }
        }

        if let Some(day) = self.month_day {
            if !(1..=31).contains(&day) {
                errors.push(RotationError::InvalidConfig {
                    field: "month_day",
                    value: day.to_string(),
                    reason: "must be 1 to 31",
                });
            }
        }

        errors
    }
}

impl TryFrom<RawRotationConfig> for RotationConfig {
    type Error = RotationError;

    fn try_from(raw: RawRotationConfig) -> Result<Self, Self::Error> {
        if let Some(err) = raw.violations().into_iter().next() {
            return Err(err);
        }

        let name: FrequencyName = raw.frequency.parse()?;
        // Ranges were checked above
        let week_start = raw
            .week_start_day
            .and_then(|d| u8::try_from(d).ok())
            .and_then(weekday_from_number)
            .unwrap_or(Weekday::Mon);
        let month_day = raw
            .month_day
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(1);

        let frequency = match name {
            FrequencyName::Daily => Frequency::Daily,
            FrequencyName::Weekly => Frequency::Weekly { week_start },
            FrequencyName::BiWeekly => Frequency::BiWeekly { week_start },
            FrequencyName::Monthly => Frequency::Monthly { month_day },
            FrequencyName::Custom => {
                let interval = raw
                    .interval
                    .and_then(|n| u32::try_from(n).ok())
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| RotationError::InvalidConfig {
                        field: "interval",
                        value: format!("{:?}", raw.interval),
                        reason: "must be a positive number of days",
                    })?;
                Frequency::Custom { interval }
            }
        };

        Ok(Self { frequency })
    }
}

impl From<RotationConfig> for RawRotationConfig {
    fn from(config: RotationConfig) -> Self {
        let frequency = config.frequency.as_str().to_string();
        match config.frequency {
            Frequency::Daily => Self {
                frequency,
                interval: None,
                week_start_day: None,
                month_day: None,
            },
            Frequency::Weekly { week_start } | Frequency::BiWeekly { week_start } => Self {
                frequency,
                interval: None,
                week_start_day: Some(i64::from(week_start.num_days_from_sunday())),
                month_day: None,
            },
            Frequency::Monthly { month_day } => Self {
                frequency,
                interval: None,
                week_start_day: None,
                month_day: Some(i64::from(month_day)),
            },
            Frequency::Custom { interval } => Self {
                frequency,
                interval: Some(i64::from(interval.get())),
                week_start_day: None,
                month_day: None,
            },
        }
    }
}
