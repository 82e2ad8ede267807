use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SharedError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        };
        f.pad(s)
    }
}

/// Routes served by the planner API, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRoute {
    /// Health check
    Health,
    /// Creates the database tables on a fresh deployment
    InitDb,
    /// Task collection (list with GET, create with POST)
    Tasks,
    /// A single task, for deletion
    Task(i64),
    /// Places a task at a given date and time
    Schedule,
    /// Scheduled tasks on one day
    ScheduleForDate(NaiveDate),
    /// Scheduled tasks for the Monday-to-Sunday week containing the date
    WeeklySchedule(NaiveDate),
    /// Removes a task from the schedule but keeps the task
    Unschedule(i64),
}

impl ApiRoute {
    /// Path relative to the base URL, always starting with `/`.
    pub fn path(&self) -> String {
        match self {
            ApiRoute::Health => "/".to_string(),
            ApiRoute::InitDb => "/init-db".to_string(),
            ApiRoute::Tasks => "/tasks".to_string(),
            ApiRoute::Task(id) => format!("/tasks/{}", id),
            ApiRoute::Schedule => "/schedule".to_string(),
            ApiRoute::ScheduleForDate(date) => format!("/schedule/{}", date.format(DATE_FORMAT)),
            ApiRoute::WeeklySchedule(date) => format!("/schedule/week/{}", date.format(DATE_FORMAT)),
            ApiRoute::Unschedule(id) => format!("/schedule/{}", id),
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            ApiRoute::Health
            | ApiRoute::Tasks
            | ApiRoute::ScheduleForDate(_)
            | ApiRoute::WeeklySchedule(_) => HttpMethod::Get,
            ApiRoute::InitDb | ApiRoute::Schedule => HttpMethod::Post,
            ApiRoute::Task(_) | ApiRoute::Unschedule(_) => HttpMethod::Delete,
        }
    }
}

impl fmt::Display for ApiRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Parses the short route names used on the command line:
/// `health`, `init-db`, `tasks`, `task:<id>`, `schedule`,
/// `schedule:<date>`, `week:<date>`, `unschedule:<id>`.
impl FromStr for ApiRoute {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let route = match (name.to_lowercase().as_str(), arg) {
            ("health", None) => ApiRoute::Health,
            ("init-db", None) => ApiRoute::InitDb,
            ("tasks", None) => ApiRoute::Tasks,
            ("task", Some(id)) => ApiRoute::Task(parse_id(s, id)?),
            ("schedule", None) => ApiRoute::Schedule,
            ("schedule", Some(date)) => ApiRoute::ScheduleForDate(parse_date(s, date)?),
            ("week", Some(date)) => ApiRoute::WeeklySchedule(parse_date(s, date)?),
            ("unschedule", Some(id)) => ApiRoute::Unschedule(parse_id(s, id)?),
            _ => return Err(SharedError::UnknownRoute(s.to_string())),
        };
        Ok(route)
    }
}

fn parse_id(route: &str, id: &str) -> Result<i64> {
    id.trim()
        .parse()
        .map_err(|_| SharedError::UnknownRoute(format!("{} (invalid id {:?})", route, id)))
}

fn parse_date(route: &str, date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| SharedError::UnknownRoute(format!("{} ({})", route, e)))
}
