pub mod actions;
pub mod advise;
pub mod checklist;
pub mod db;
pub mod export;
pub mod forecast;
pub mod log;
pub mod record;
pub mod serve;
pub mod stats;
pub mod task;
pub mod worker;

/// Today's calendar date in local time; every projection is relative to it.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
