pub mod entities;
pub mod use_cases;
pub mod bot_filter;
pub mod validation;
