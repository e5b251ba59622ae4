use chrono::{DateTime, Local, NaiveDate, TimeZone};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Format used for completion dates written by the service.
pub const COMPLETION_DATE_FORMAT: &str = "%Y-%m-%d";

/// A tracked habit as stored in the `habits` collection.
///
/// `name` and `daily_goal` are whatever the creator sent, including nothing.
/// `completion_dates` keeps entries verbatim and in append order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: Option<String>,
    pub daily_goal: Option<Number>,
    #[serde(default)]
    pub completion_dates: Vec<String>,
}

impl Habit {
    pub fn new(name: Option<String>, daily_goal: Option<Number>) -> Self {
        Self {
            id: ObjectId::new(),
            name,
            daily_goal,
            completion_dates: Vec::new(),
        }
    }

    /// Number of completions recorded for `day`.
    pub fn completions_on(&self, day: NaiveDate) -> usize {
        self.completion_dates
            .iter()
            .filter(|entry| parse_completion_date(entry) == Some(day))
            .count()
    }
}

/// Today's date on the server clock, in the completion date format.
pub fn today_string() -> String {
    Local::now()
        .date_naive()
        .format(COMPLETION_DATE_FORMAT)
        .to_string()
}

/// Read a stored completion entry as a calendar date.
///
/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps; timestamps are moved to the
/// server's local zone before their date is taken. Anything else is `None`.
pub fn parse_completion_date(entry: &str) -> Option<NaiveDate> {
    parse_completion_date_in(entry, &Local)
}

pub(crate) fn parse_completion_date_in<Tz: TimeZone>(entry: &str, tz: &Tz) -> Option<NaiveDate> {
    let entry = entry.trim();
    if let Ok(date) = NaiveDate::parse_from_str(entry, COMPLETION_DATE_FORMAT) {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(entry)
        .ok()
        .map(|ts| ts.with_timezone(tz).date_naive())
}
