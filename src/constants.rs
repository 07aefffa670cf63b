use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Shown to the requester whenever the failure is not theirs to fix.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Public pages listed in the sitemap, with their priority.
pub const SITEMAP_PAGES: &[(&str, f32)] = &[
    ("/", 1.0),
    ("/about", 0.7),
    ("/services", 0.7),
    ("/work", 0.7),
    ("/contact", 0.7),
];

pub const ROBOTS_DISALLOW: &[&str] = &["/api/", "/_next/"];
