mod api_token;
mod fields;
mod posting;
mod tag;
mod user;

pub use api_token::*;
pub use fields::*;
pub use posting::*;
pub use tag::*;
pub use user::*;
