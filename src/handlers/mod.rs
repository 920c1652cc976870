pub mod shop;
pub mod expense_category;
pub mod user;
pub mod daily_cash;
pub mod transaction;
pub mod credit;
pub mod summary;
pub mod audit;
