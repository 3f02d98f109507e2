pub mod auth;
pub mod daily_reports;
pub mod followups;
pub mod goals;
pub mod health;
pub mod items;
pub mod weekly_focus;
