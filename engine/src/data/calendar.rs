use chrono::{Days, Local, NaiveDate};

/// `n` consecutive calendar days ending at `reference`, oldest first.
pub fn last_n_days(n: usize, reference: NaiveDate) -> Vec<NaiveDate> {
    (0..n as u64)
        .rev()
        .filter_map(|offset| reference.checked_sub_days(Days::new(offset)))
        .collect()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
