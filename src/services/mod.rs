pub mod associations;
pub mod goals;
pub mod items;
pub mod week;
pub mod weekly_focus;
