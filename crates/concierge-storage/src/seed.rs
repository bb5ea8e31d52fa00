//! Default profiles written into an empty store.

use chrono::NaiveDate;

use concierge_domain::{Record, Tier};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("seed dates are valid calendar dates")
}

/// Returns the three demo profiles.
pub fn default_records() -> Vec<Record> {
    vec![
        Record::new("user_123", "Alice", 1500, Tier::Gold, date(2024, 7, 9)),
        Record::new("user_456", "Bob", 800, Tier::Silver, date(2024, 7, 8)),
        Record::new("user_789", "Cathy", 25000, Tier::Platinum, date(2024, 7, 10)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_records_have_unique_ids() {
        let records = default_records();
        let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), records.len());
    }

    #[test]
    fn test_alice_seed() {
        let alice = default_records().into_iter().next().unwrap();
        assert_eq!(alice.id, "user_123");
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.loyalty_points, 1500);
        assert_eq!(alice.tier, Tier::Gold);
        assert_eq!(alice.last_visit.to_string(), "2024-07-09");
    }
}
