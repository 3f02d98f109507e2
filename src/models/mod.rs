pub mod daily_report;
pub mod followup;
pub mod goal;
pub mod item;
pub mod user;
pub mod weekly_focus;
