use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络传输错误（不可达、超时）
    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),
    /// 登录认证错误
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),
    /// 验证码错误
    #[error("验证码错误: {0}")]
    Captcha(#[from] CaptchaError),
    /// 页面结构与预期不符
    #[error("页面解析错误: {0}")]
    Markup(#[from] MarkupError),
    /// 打分策略与评价表不匹配
    #[error("打分策略错误: {0}")]
    Strategy(#[from] StrategyError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 网络传输错误
#[derive(Debug, Error)]
pub enum NetworkError {
    /// 请求发送失败或超时
    #[error("请求 {url} 失败: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非成功状态码
    #[error("请求 {url} 返回状态码 {status}")]
    BadStatus { url: String, status: u16 },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端初始化失败: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// 登录认证错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 账号或密码为空
    #[error("账号或密码不能为空")]
    EmptyCredentials,
    /// 尚未获取初始 Cookie
    #[error("尚未建立会话，请先访问教务系统首页")]
    NoSession,
    /// 用户名或密码错误
    #[error("用户名或密码错误")]
    WrongPassword,
    /// 登录请求成功但主页不可访问
    #[error("登录请求成功，但无法访问主页")]
    HomeUnreachable,
    /// 重试次数用尽
    #[error("尝试 {attempts} 次后登录失败")]
    RetriesExhausted { attempts: usize },
}

/// 验证码错误
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// 识别服务与手动输入都没有得到结果
    #[error("无法获取验证码文本")]
    Unavailable,
}

/// 页面结构错误，通常意味着教务系统改版或当前不在评教时间
#[derive(Debug, Error)]
pub enum MarkupError {
    /// 未找到"进入评价"链接
    #[error("未找到评价入口链接")]
    BatchLinkNotFound,
    /// 隐藏参数不完整
    #[error("隐藏参数不完整，缺少: {missing:?}")]
    HiddenParamsIncomplete { missing: Vec<&'static str> },
    /// 未找到指定表格
    #[error("未找到ID为'{table_id}'的表格")]
    TableNotFound { table_id: String },
    /// 未找到评价表单
    #[error("未在HTML中找到ID为 '{form_id}' 的表单")]
    FormNotFound { form_id: String },
    /// 评价表单中没有任何指标
    #[error("未能从HTML中解析出评教指标")]
    NoIndicators,
}

/// 打分策略错误，只影响单次提交
#[derive(Debug, Error)]
pub enum StrategyError {
    /// 策略不存在
    #[error("无效的打分策略: {name}，可用策略: {available:?}")]
    Unknown {
        name: String,
        available: Vec<String>,
    },
    /// 等级数量与指标数量不一致
    #[error("打分策略 '{strategy}' 的等级列表长度 ({grades}) 与页面指标数量 ({indicators}) 不匹配")]
    LengthMismatch {
        strategy: String,
        grades: usize,
        indicators: usize,
    },
    /// 指标缺少策略要求的等级
    #[error("指标 {indicator} 没有名为 '{grade}' 的等级，可用等级: {available:?}")]
    MissingGrade {
        indicator: String,
        grade: String,
        available: Vec<String>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 教务系统地址不合法
    #[error("教务系统地址不合法: {url}")]
    InvalidBaseUrl { url: String },
    /// 策略文件解析失败
    #[error("策略文件 {path} 解析失败: {source}")]
    StrategyFileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn request_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Network(NetworkError::RequestFailed {
            url: url.into(),
            source,
        })
    }

    /// 创建状态码错误
    pub fn bad_status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        AppError::Network(NetworkError::BadStatus {
            url: url.into(),
            status: status.as_u16(),
        })
    }

    /// 是否属于网络层错误
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
