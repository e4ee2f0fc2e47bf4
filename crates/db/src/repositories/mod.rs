//! Repositories for database access.

mod comment;
mod content;
mod like;
mod notification;
mod password_reset;
mod profile;
mod user;

pub use comment::CommentRepository;
pub use content::{ContentRepository, PublishFilter};
pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use password_reset::PasswordResetRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;
