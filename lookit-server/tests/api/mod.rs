pub mod health;
pub mod studies;
pub mod ui;
