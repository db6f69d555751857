pub mod api_token;
pub mod attrs;
pub mod auth;
pub mod filter;
pub mod image;
pub mod postings;
pub mod reconcile;
