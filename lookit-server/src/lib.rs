pub mod api;
pub mod app;
pub mod data_migrations;
pub mod database;
pub mod mask;
pub mod repository;
pub mod settings;
