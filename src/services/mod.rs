pub mod audit;
pub mod daily_cash;
pub mod summary;
pub mod validate;
