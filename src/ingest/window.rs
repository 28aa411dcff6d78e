// src/ingest/window.rs
//! Sorting/freshness period applied to forum listings; also part of the cache key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeWindow {
    Today,
    ThisWeek,
    #[default]
    ThisMonth,
    AllTime,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Today,
        TimeWindow::ThisWeek,
        TimeWindow::ThisMonth,
        TimeWindow::AllTime,
    ];

    /// Human label, e.g. "This Month".
    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::Today => "Today",
            TimeWindow::ThisWeek => "This Week",
            TimeWindow::ThisMonth => "This Month",
            TimeWindow::AllTime => "All Time",
        }
    }

    /// Value of the forum listing `t` query parameter.
    pub fn forum_param(self) -> &'static str {
        match self {
            TimeWindow::Today => "day",
            TimeWindow::ThisWeek => "week",
            TimeWindow::ThisMonth => "month",
            TimeWindow::AllTime => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWindow(pub String);

impl fmt::Display for UnknownWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown time window: {:?}", self.0)
    }
}

impl std::error::Error for UnknownWindow {}

impl FromStr for TimeWindow {
    type Err = UnknownWindow;

    /// Accepts the label ("This Week"), a compact form ("this_week", "thisweek")
    /// or the forum code ("week").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "today" | "day" => Ok(TimeWindow::Today),
            "thisweek" | "week" => Ok(TimeWindow::ThisWeek),
            "thismonth" | "month" => Ok(TimeWindow::ThisMonth),
            "alltime" | "all" => Ok(TimeWindow::AllTime),
            _ => Err(UnknownWindow(s.to_string())),
        }
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = UnknownWindow;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(w: TimeWindow) -> Self {
        w.label().to_string()
    }
}
