pub mod contact;
pub mod home;
pub mod seo;
pub mod system;
