pub mod contact;
pub mod extractors;
pub mod notifier;
