//! 登录认证服务 - 业务能力层
//!
//! 职责：
//! - 获取初始 Cookie
//! - 验证码登录（有限次重试）
//! - 判断登录态是否仍然有效，失效时重新登录
//!
//! 会话状态流转：
//! ```text
//! Anonymous -> CookieAcquired -> LoginAttempted -> Authenticated
//!                                      |                 |
//!                                      v                 v
//!                                 LoginFailed      SessionExpired -> LoginAttempted
//! ```

use crate::config::Credentials;
use crate::error::{AppResult, AuthError, CaptchaError};
use crate::infrastructure::PortalSession;
use crate::parsing::markers::{CAPTCHA_WRONG_MARKER, LOGIN_PAGE_MARKER, PASSWORD_WRONG_MARKER};
use crate::services::captcha::CaptchaSolver;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 首页，访问后获得初始 Cookie
pub const ROOT_PATH: &str = "/jsxsd/";
/// 验证码图片
pub const CAPTCHA_PATH: &str = "/jsxsd/verifycode.servlet";
/// 登录表单提交地址
pub const LOGIN_PATH: &str = "/jsxsd/xk/LoginToXkLdap";
/// 登录后的主页，用于判断登录态
pub const HOME_PATH: &str = "/jsxsd/framework/xsMain.jsp";

/// 登录请求超时
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);
/// 登录态探测超时
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// 拿不到验证码时的等待间隔
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// 账号与密码编码之间的分隔符
const ENCODED_SEPARATOR: &str = "%%%";

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// 尚未访问首页
    Anonymous,
    /// 已取得初始 Cookie
    CookieAcquired,
    /// 正在登录
    LoginAttempted,
    /// 已登录
    Authenticated,
    /// 登录失败（密码错误、重试用尽或主页不可达）
    LoginFailed,
    /// 登录态失效
    SessionExpired,
}

/// 登录响应的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginVerdict {
    CaptchaWrong,
    PasswordWrong,
    Accepted,
}

/// 根据响应正文判定登录结果
///
/// 验证码错误优先于密码错误判断
pub fn classify_login_response(body: &str) -> LoginVerdict {
    if body.contains(CAPTCHA_WRONG_MARKER) {
        LoginVerdict::CaptchaWrong
    } else if body.contains(PASSWORD_WRONG_MARKER) {
        LoginVerdict::PasswordWrong
    } else {
        LoginVerdict::Accepted
    }
}

/// 生成登录表单的 `encoded` 字段：`base64(账号) + "%%%" + base64(密码)`
///
/// # 示例
/// ```
/// use qfnu_evaluate::services::auth::encode_credentials;
///
/// let encoded = encode_credentials("S12345", "hunter2").unwrap();
/// assert_eq!(encoded, "UzEyMzQ1%%%aHVudGVyMg==");
/// ```
pub fn encode_credentials(account: &str, password: &str) -> AppResult<String> {
    if account.is_empty() || password.is_empty() {
        return Err(AuthError::EmptyCredentials.into());
    }
    Ok(format!(
        "{}{}{}",
        STANDARD.encode(account),
        ENCODED_SEPARATOR,
        STANDARD.encode(password)
    ))
}

/// 登录管理器
///
/// 持有会话的一个克隆，与其他组件共享 Cookie 罐
pub struct AuthManager<S> {
    session: PortalSession,
    credentials: Credentials,
    solver: S,
    state: AuthState,
    retry_delay: Duration,
}

impl<S: CaptchaSolver> AuthManager<S> {
    pub fn new(session: PortalSession, credentials: Credentials, solver: S) -> Self {
        Self {
            session,
            credentials,
            solver,
            state: AuthState::Anonymous,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// 设置拿不到验证码时的等待间隔
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn session(&self) -> &PortalSession {
        &self.session
    }

    /// 访问首页获取初始 Cookie
    pub async fn establish_session(&mut self) -> AppResult<()> {
        match self.session.get_page(ROOT_PATH).await {
            Ok(_) => {
                info!("✓ 已获取初始 Cookie");
                self.state = AuthState::CookieAcquired;
                Ok(())
            }
            Err(e) => {
                error!("无法访问教务系统首页: {}", e);
                Err(e)
            }
        }
    }

    /// 验证码登录
    ///
    /// 每次尝试都重新获取验证码。验证码错误和拿不到验证码都会占用一次重试机会，
    /// 密码错误立即失败，不再重试。
    ///
    /// # 参数
    /// - `max_retries`: 最大尝试次数
    ///
    /// # 返回
    /// 成功时会话进入 `Authenticated` 状态
    pub async fn attempt_login(&mut self, max_retries: usize) -> AppResult<()> {
        if self.state == AuthState::Anonymous {
            return Err(AuthError::NoSession.into());
        }

        let encoded = encode_credentials(self.credentials.account(), self.credentials.password())?;
        debug!("已生成登录编码字段");
        self.state = AuthState::LoginAttempted;

        for attempt in 1..=max_retries {
            let code = match self.fetch_captcha().await {
                Ok(code) => code,
                Err(e) => {
                    warn!("第 {}/{} 次登录: {}，稍后重试", attempt, max_retries, e);
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
            };
            info!("识别出的验证码: {}", code);

            let form = [
                ("userAccount", ""),
                ("userPassword", ""),
                ("RANDOMCODE", code.as_str()),
                ("encoded", encoded.as_str()),
            ];
            let response = match self.session.post_form(LOGIN_PATH, &form, LOGIN_TIMEOUT).await {
                Ok(response) => response,
                Err(e) => {
                    error!("登录过程中发生异常: {}", e);
                    continue;
                }
            };

            info!("登录响应状态码: {}", response.status);
            if !response.status.is_success() {
                warn!("第 {}/{} 次登录请求未成功", attempt, max_retries);
                continue;
            }

            match classify_login_response(&response.body) {
                LoginVerdict::CaptchaWrong => {
                    warn!("验证码错误，重试中... ({}/{})", attempt, max_retries);
                }
                LoginVerdict::PasswordWrong => {
                    error!("用户名或密码错误");
                    self.state = AuthState::LoginFailed;
                    return Err(AuthError::WrongPassword.into());
                }
                LoginVerdict::Accepted => {
                    if self.check_session_alive().await {
                        info!("✓ 登录成功");
                        self.state = AuthState::Authenticated;
                        return Ok(());
                    }
                    error!("登录请求成功，但无法访问主页");
                    self.state = AuthState::LoginFailed;
                    return Err(AuthError::HomeUnreachable.into());
                }
            }
        }

        error!("⚠️ 尝试 {} 次后登录失败", max_retries);
        self.state = AuthState::LoginFailed;
        Err(AuthError::RetriesExhausted {
            attempts: max_retries,
        }
        .into())
    }

    /// 不跟随重定向地请求主页
    ///
    /// 返回 200 且正文中没有登录页标记才算有效，网络错误一律视为无效。
    /// 已登录状态下探测失败会把状态置为 `SessionExpired`。
    pub async fn check_session_alive(&mut self) -> bool {
        let alive = match self.session.probe(HOME_PATH, PROBE_TIMEOUT).await {
            Ok(response) => {
                let alive = response.status == reqwest::StatusCode::OK
                    && !response.body.contains(LOGIN_PAGE_MARKER);
                debug!("登录态探测: 状态码 {}，有效: {}", response.status, alive);
                alive
            }
            Err(e) => {
                error!("检查会话状态时出错: {}", e);
                false
            }
        };

        if !alive && self.state == AuthState::Authenticated {
            self.state = AuthState::SessionExpired;
        }
        alive
    }

    /// 登录态失效时重新登录
    pub async fn ensure_session(&mut self, max_retries: usize) -> AppResult<()> {
        if self.check_session_alive().await {
            return Ok(());
        }
        warn!("会话已过期，正在重新登录...");
        if self.state == AuthState::Anonymous {
            self.establish_session().await?;
        }
        self.attempt_login(max_retries).await
    }

    async fn fetch_captcha(&self) -> AppResult<String> {
        let image = match self.session.get_bytes(CAPTCHA_PATH).await {
            Ok(image) => image,
            Err(e) => {
                error!("获取验证码失败: {}", e);
                return Err(CaptchaError::Unavailable.into());
            }
        };
        self.solver
            .solve(&image)
            .await
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .ok_or_else(|| CaptchaError::Unavailable.into())
    }
}
