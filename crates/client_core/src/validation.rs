use chrono::{DateTime, Datelike, Local, Months, NaiveDate};

pub const AGE_OF_MAJORITY: u32 = 18;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date, matching how ISO dates without offsets are read.
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is used).
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

/// Whole calendar years from `from` to `to`. An anniversary that falls on a
/// day the target month lacks (29 February) lands on that month's last day.
/// `None` when `from` is after `to`.
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> Option<u32> {
    if from > to {
        return None;
    }
    let mut years = (to.year() - from.year()) as u32;
    while years > 0 {
        match from.checked_add_months(Months::new(years * 12)) {
            Some(anniversary) if anniversary <= to => break,
            _ => years -= 1,
        }
    }
    Some(years)
}

pub fn is_adult_on(birth_date: &str, today: NaiveDate) -> bool {
    parse_birth_date(birth_date)
        .and_then(|born| whole_years_between(born, today))
        .is_some_and(|age| age >= AGE_OF_MAJORITY)
}

pub fn is_adult(birth_date: &str) -> bool {
    is_adult_on(birth_date, LocalClock.today())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
