//! Loyalty profile records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Loyalty tier of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored loyalty profile.
///
/// Records are owned by the record store and never mutated by request handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub name: String,
    pub loyalty_points: u64,
    pub tier: Tier,
    pub last_visit: NaiveDate,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        loyalty_points: u64,
        tier: Tier,
        last_visit: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            loyalty_points,
            tier,
            last_visit,
        }
    }

    /// Projects the record onto the fields a caller may see.
    pub fn view(&self) -> ProfileView {
        ProfileView::from(self)
    }
}

/// The disclosed shape of a [`Record`].
///
/// Only these four fields ever leave the service; the record id and any
/// future internal fields stay behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub loyalty_points: u64,
    pub tier: Tier,
    pub last_visit: NaiveDate,
}

impl From<&Record> for ProfileView {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            loyalty_points: record.loyalty_points,
            tier: record.tier,
            last_visit: record.last_visit,
        }
    }
}
