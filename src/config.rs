use crate::error::{AppError, AppResult, AuthError, ConfigError};
use crate::utils::prompt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 教务系统地址
    pub base_url: String,
    /// 验证码识别服务地址
    pub ocr_endpoint: String,
    /// 手动输入验证码时图片的保存位置
    pub captcha_image_path: PathBuf,
    /// 登录最大尝试次数
    pub login_max_retries: usize,
    /// 普通请求超时（秒）
    pub request_timeout_secs: u64,
    /// 允许评 90 分及以上的课程比例
    pub high_score_ratio: f64,
    /// 日志目录
    pub log_dir: PathBuf,
    /// 额外打分策略文件（TOML）
    pub strategy_file: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 无法得知总页数时最多探测的页数
    pub max_page_probes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://zhjw.qfnu.edu.cn".to_string(),
            ocr_endpoint: "http://127.0.0.1:8000/ocr".to_string(),
            captcha_image_path: PathBuf::from("captcha.jpg"),
            login_max_retries: 3,
            request_timeout_secs: 10,
            high_score_ratio: 0.4,
            log_dir: PathBuf::from("logs"),
            strategy_file: None,
            verbose_logging: false,
            max_page_probes: 50,
        }
    }
}

impl Config {
    /// 从环境变量（含 `.env`）加载配置，未设置的项使用默认值
    pub fn from_env() -> AppResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("未加载 .env 文件: {}", e);
        }

        let default = Self::default();
        Ok(Self {
            base_url: env_string("BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.base_url),
            ocr_endpoint: env_string("OCR_ENDPOINT").unwrap_or(default.ocr_endpoint),
            captcha_image_path: env_string("CAPTCHA_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.captcha_image_path),
            login_max_retries: env_parse("LOGIN_MAX_RETRIES", "usize")?
                .unwrap_or(default.login_max_retries),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.request_timeout_secs),
            high_score_ratio: env_parse("HIGH_SCORE_RATIO", "f64")?
                .unwrap_or(default.high_score_ratio),
            log_dir: env_string("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.log_dir),
            strategy_file: env_string("STRATEGY_FILE").map(PathBuf::from),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            max_page_probes: env_parse("MAX_PAGE_PROBES", "usize")?
                .unwrap_or(default.max_page_probes),
        })
    }

    /// 读取账号密码
    ///
    /// 优先使用环境变量 `USER_ACCOUNT` / `USER_PASSWORD`，缺失时交互式输入，
    /// 并把输入写回当前进程的环境变量，后续调用不再重复询问。
    pub fn credentials(&self) -> AppResult<Credentials> {
        let account = match env_string("USER_ACCOUNT") {
            Some(v) => v,
            None => {
                warn!("未在环境变量中找到 USER_ACCOUNT");
                let v = prompt::read_line("请输入学号: ")?;
                std::env::set_var("USER_ACCOUNT", &v);
                v
            }
        };
        let password = match env_string("USER_PASSWORD") {
            Some(v) => v,
            None => {
                warn!("未在环境变量中找到 USER_PASSWORD");
                let v = prompt::read_line("请输入密码: ")?;
                std::env::set_var("USER_PASSWORD", &v);
                v
            }
        };
        Credentials::new(account, password)
    }
}

/// 登录凭据，进程内只读
#[derive(Clone)]
pub struct Credentials {
    account: String,
    password: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> AppResult<Self> {
        let account = account.into().trim().to_string();
        let password = password.into();
        if account.is_empty() || password.is_empty() {
            return Err(AuthError::EmptyCredentials.into());
        }
        Ok(Self { account, password })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("password", &"***")
            .finish()
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match env_string(name) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
    }
}
