//! 服务层 - 业务能力
//!
//! 每个服务只做一件事，通过克隆的 `PortalSession` 共享登录态

pub mod auth;
pub mod batch_discovery;
pub mod captcha;
pub mod evaluation_service;
pub mod list_harvester;

pub use auth::{AuthManager, AuthState};
pub use batch_discovery::BatchDiscovery;
pub use captcha::{CaptchaResolver, CaptchaSolver, ManualEntry, RemoteOcr};
pub use evaluation_service::{EvaluationService, SaveOutcome};
pub use list_harvester::ListHarvester;
