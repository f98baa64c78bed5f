use chrono::{NaiveDate, Utc};

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn today_date() -> String {
    today().format("%Y-%m-%d").to_string()
}
