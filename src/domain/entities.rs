pub mod contact;
pub mod email;
pub mod rate_limit;
