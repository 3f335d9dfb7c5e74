pub mod analyze;
pub mod dashboard;
pub mod deck;
pub mod history;
pub mod train;
