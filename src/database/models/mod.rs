// 数据模型
pub mod notification;
pub mod post;
pub mod user;

pub use notification::{NewNotification, Notification, NotificationKind};
pub use post::{Comment, Post};
pub use user::{CurrentUser, NewUser, User, UserProfile};
