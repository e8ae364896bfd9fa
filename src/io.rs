pub mod export;
pub mod readings;
pub mod tariff;
