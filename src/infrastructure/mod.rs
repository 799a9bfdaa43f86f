pub mod auth;
pub mod uploads;

pub use auth::{AuthError, Claims, TokenService};
pub use uploads::{FileStorage, ImageUpload, LocalFileStorage};
