// 业务服务
// 路由层只调用这里的服务，服务再通过存储接口和缓存完成操作

mod credentials;
mod notifications;
mod posts;

pub use credentials::{CredentialService, LoginOutcome};
pub use notifications::NotificationService;
pub use posts::{LikeOutcome, PostInput, PostService};
