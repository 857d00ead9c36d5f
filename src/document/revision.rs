//! Revision stamps for tracked changes

use chrono::{DateTime, SecondsFormat, Utc};

/// Author and time recorded on w:ins / w:del wrappers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    pub author: String,
    pub date: DateTime<Utc>,
}

impl Revision {
    /// A revision by `author`, dated now
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            date: Utc::now(),
        }
    }

    /// Override the timestamp
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Timestamp as written into w:date
    pub fn date_string(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Wrapper attributes. The id is provisional; ids are renumbered on save.
    pub fn attributes(&self) -> Vec<(String, String)> {
        vec![
            ("w:id".to_string(), "0".to_string()),
            ("w:author".to_string(), self.author.clone()),
            ("w:date".to_string(), self.date_string()),
        ]
    }
}
