//! Service layer
//!
//! Services hold the business rules and talk to storage only through the
//! repository traits they are generic over.

pub mod gallery;
pub mod password;
pub mod password_reset;
pub mod session;
pub mod user;

pub use gallery::GalleryService;
pub use password::PasswordService;
pub use password_reset::{PasswordResetConfig, PasswordResetService};
pub use session::{SessionConfig, SessionService};
pub use user::UserService;
