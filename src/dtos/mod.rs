pub mod shop;
pub mod user;
pub mod expense_category;
pub mod daily_cash;
pub mod transaction;
pub mod credit;
pub mod summary;
pub mod audit;
