pub mod evaluate;
pub mod setup;
pub mod tokens;
pub mod ui;
pub mod update;
