pub mod movie;
pub mod user;

pub use movie::{Movie, MoviePatch, NewMovie};
pub use user::{NewUser, User, UserSummary};
