pub mod auth;
pub mod callback;
pub mod pages;
