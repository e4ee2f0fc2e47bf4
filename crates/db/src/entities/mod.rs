//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod content;
pub mod like;
pub mod notification;
pub mod password_reset;
pub mod profile;
pub mod user;

pub use comment::Entity as Comment;
pub use content::Entity as Content;
pub use like::Entity as Like;
pub use notification::Entity as Notification;
pub use password_reset::Entity as PasswordReset;
pub use profile::Entity as Profile;
pub use user::Entity as User;
