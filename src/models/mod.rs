pub mod shop;
pub mod expense_category;
pub mod daily_cash;
pub mod credit;
pub mod daily_summary;
