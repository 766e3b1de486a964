//! HTTP 会话 - 基础设施层
//!
//! 持有带 Cookie 的 HTTP 客户端，只暴露"发请求"的能力

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, NetworkError};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::{redirect, Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 浏览器 UA，教务系统会拒绝非浏览器请求
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.116 Safari/537.36";

/// 原始响应（状态码 + 正文）
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: StatusCode,
    pub body: String,
}

/// 教务系统会话
///
/// 职责：
/// - 持有唯一的 Cookie 罐，所有克隆共享同一份登录态
/// - 暴露 GET / POST 能力
/// - 不认识登录流程、评教页面
///
/// 内部有两个客户端：普通客户端跟随重定向，探测客户端不跟随，
/// 两者共用同一个 Cookie 罐。
#[derive(Clone)]
pub struct PortalSession {
    base_url: String,
    client: Client,
    probe_client: Client,
    timeout: Duration,
}

impl PortalSession {
    /// 创建新的会话
    ///
    /// # 参数
    /// - `base_url`: 教务系统地址，例如 `http://zhjw.qfnu.edu.cn`
    /// - `timeout`: 默认请求超时
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let headers = default_headers(&base_url)?;
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(headers.clone())
            .build()
            .map_err(NetworkError::ClientBuild)?;
        let probe_client = Client::builder()
            .cookie_provider(jar)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(NetworkError::ClientBuild)?;

        debug!("已创建会话: {}", base_url);

        Ok(Self {
            base_url,
            client,
            probe_client,
            timeout,
        })
    }

    /// 按配置创建会话
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接完整地址，已经是完整 URL 的原样返回
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET 页面文本，非 2xx 视为失败
    pub async fn get_page(&self, path: &str) -> AppResult<String> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        read_success_text(&url, response).await
    }

    /// GET 二进制内容（验证码图片）
    pub async fn get_bytes(&self, path: &str) -> AppResult<Vec<u8>> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        if !response.status().is_success() {
            return Err(AppError::bad_status(&url, response.status()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        Ok(bytes.to_vec())
    }

    /// POST 表单并读取页面文本，非 2xx 视为失败
    ///
    /// `form` 可以是 `Vec<(String, String)>`，同名字段按顺序重复发送
    pub async fn post_page<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> AppResult<String> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        read_success_text(&url, response).await
    }

    /// POST 表单并返回原始响应，由调用方自行判断状态码
    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &T,
        timeout: Duration,
    ) -> AppResult<PortalResponse> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        read_raw(&url, response).await
    }

    /// 不跟随重定向的 GET，用于判断登录态
    pub async fn probe(&self, path: &str, timeout: Duration) -> AppResult<PortalResponse> {
        let url = self.url(path);
        debug!("PROBE {}", url);
        let response = self
            .probe_client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        read_raw(&url, response).await
    }
}

fn default_headers(base_url: &str) -> AppResult<HeaderMap> {
    let invalid = || ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
    };
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ORIGIN,
        HeaderValue::from_str(base_url).map_err(|_| invalid())?,
    );
    headers.insert(
        REFERER,
        HeaderValue::from_str(&format!("{}/", base_url)).map_err(|_| invalid())?,
    );
    Ok(headers)
}

async fn read_success_text(url: &str, response: reqwest::Response) -> AppResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::bad_status(url, status));
    }
    response
        .text()
        .await
        .map_err(|e| AppError::request_failed(url, e))
}

async fn read_raw(url: &str, response: reqwest::Response) -> AppResult<PortalResponse> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::request_failed(url, e))?;
    Ok(PortalResponse { status, body })
}
