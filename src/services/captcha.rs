//! 验证码识别服务 - 业务能力层
//!
//! 先请求本地识别服务，失败时退回手动输入

use crate::config::Config;
use crate::error::{AppError, AppResult, NetworkError};
use crate::utils::prompt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 识别服务超时，不能拖住手动输入
pub const OCR_TIMEOUT: Duration = Duration::from_secs(2);

/// 验证码求解能力
///
/// 返回 `None` 表示本次拿不到验证码，调用方应稍后重试而不是报错
#[allow(async_fn_in_trait)]
pub trait CaptchaSolver {
    async fn solve(&self, image: &[u8]) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    result: Option<String>,
}

/// 远程识别服务
///
/// 以 multipart 上传图片（字段名 `file`），响应形如 `{"result": "ab12"}`
pub struct RemoteOcr {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl RemoteOcr {
    pub fn new(endpoint: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(NetworkError::ClientBuild)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout: OCR_TIMEOUT,
        })
    }

    /// 调用识别服务
    ///
    /// # 返回
    /// - `Ok(Some(text))`: 识别成功
    /// - `Ok(None)`: 服务可达但结果不可用
    /// - `Err(_)`: 服务不可达
    pub async fn recognize(&self, image: &[u8]) -> AppResult<Option<String>> {
        let part = Part::bytes(image.to_vec())
            .file_name("captcha.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| AppError::request_failed(&self.endpoint, e))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&self.endpoint, e))?;

        if response.status() != reqwest::StatusCode::OK {
            warn!("验证码识别服务返回状态码 {}", response.status());
            return Ok(None);
        }

        let parsed: OcrResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("验证码识别服务返回格式错误: {}", e);
                return Ok(None);
            }
        };

        Ok(parsed
            .result
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}

impl CaptchaSolver for RemoteOcr {
    async fn solve(&self, image: &[u8]) -> Option<String> {
        match self.recognize(image).await {
            Ok(Some(text)) => Some(text),
            Ok(None) => None,
            Err(e) => {
                debug!("验证码识别服务不可用: {}", e);
                None
            }
        }
    }
}

/// 手动输入：保存图片、尝试打开、等待用户输入
pub struct ManualEntry {
    image_path: PathBuf,
}

impl ManualEntry {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// 保存验证码图片
    pub fn save_image(&self, image: &[u8]) -> AppResult<()> {
        if let Some(parent) = self.image_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.image_path, image)?;
        Ok(())
    }

    /// 尽量用系统默认程序打开图片，失败不影响输入
    fn open_viewer(&self) {
        if let Err(e) = open::that(&self.image_path) {
            warn!(
                "无法自动打开验证码图片，请手动查看 {}: {}",
                self.image_path.display(),
                e
            );
        }
    }
}

impl CaptchaSolver for ManualEntry {
    async fn solve(&self, image: &[u8]) -> Option<String> {
        if let Err(e) = self.save_image(image) {
            warn!("保存验证码图片失败: {}", e);
            return None;
        }
        info!("验证码图片已保存至 {}", self.image_path.display());
        self.open_viewer();

        match prompt::read_line_async("请输入验证码: ").await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!("读取验证码输入失败: {}", e);
                None
            }
        }
    }
}

/// 验证码解析器：识别服务优先，手动输入兜底
pub struct CaptchaResolver {
    remote: Option<RemoteOcr>,
    manual: ManualEntry,
}

impl CaptchaResolver {
    pub fn new(remote: Option<RemoteOcr>, manual: ManualEntry) -> Self {
        Self { remote, manual }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(
            Some(RemoteOcr::new(config.ocr_endpoint.clone())?),
            ManualEntry::new(config.captcha_image_path.clone()),
        ))
    }
}

impl CaptchaSolver for CaptchaResolver {
    async fn solve(&self, image: &[u8]) -> Option<String> {
        if let Some(remote) = &self.remote {
            if let Some(text) = remote.solve(image).await {
                debug!("验证码识别服务返回: {}", text);
                return Some(text);
            }
            info!("验证码自动识别失败，转为手动输入");
        }
        self.manual.solve(image).await
    }
}
