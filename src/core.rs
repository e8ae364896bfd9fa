pub mod comparison;
pub mod dispatch;
pub mod month;
pub mod parameters;
pub mod progress;
pub mod reading;
pub mod simulation;
pub mod strategy;
pub mod summary;
pub mod sweep;
pub mod tariff;
