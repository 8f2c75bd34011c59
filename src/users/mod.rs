//! User accounts: the identity store behind authentication, administration
//! and the public donor directory.

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{AccountStatus, Role, User, UserView};
pub use repository::UserRepository;
