//! 页面标记文字与固定结构的提取

use crate::models::HiddenParams;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// 未登录时页面中出现的文字
pub const LOGIN_PAGE_MARKER: &str = "用户登录";
/// 登录响应：验证码错误
pub const CAPTCHA_WRONG_MARKER: &str = "验证码错误";
/// 登录响应：密码错误
pub const PASSWORD_WRONG_MARKER: &str = "密码错误";
/// 保存类接口成功时 alert 中的文字
pub const SAVE_SUCCESS_MARKER: &str = "保存成功";
/// 响应中没有 alert 时的占位文字
pub const NO_ALERT_TEXT: &str = "未找到alert内容";

static BATCH_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<a\s+href="/jsxsd/xspj/xspj_list\.do([^"]*)"\s+title="点击进入评价"\s*>\s*进入评价\s*</a>"#,
    )
    .expect("batch link pattern")
});

static ALERT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"alert\('(.*)'\)").expect("alert pattern"));

static HIDDEN_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[type="hidden"]"#).expect("hidden selector"));

/// 从评价入口页提取本批次的查询串，例如 `?pj0502id=...&pj01id=&xnxq01id=2024-2025-2`
pub fn extract_batch_path(html: &str) -> Option<String> {
    BATCH_LINK
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
}

/// 从评价列表页提取五个隐藏参数，值为空视为缺失
pub fn extract_hidden_params(html: &str) -> Result<HiddenParams, Vec<&'static str>> {
    let document = Html::parse_document(html);
    let inputs: Vec<(String, String)> = document
        .select(&HIDDEN_INPUT)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value")?.trim();
            if value.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    HiddenParams::from_lookup(|name| {
        inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    })
}

/// 取出响应中 `alert('...')` 的内容
pub fn extract_alert(body: &str) -> Option<String> {
    ALERT
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 保存结果：alert 文字及是否成功
pub fn save_verdict(body: &str) -> (String, bool) {
    let message = extract_alert(body).unwrap_or_else(|| NO_ALERT_TEXT.to_string());
    let ok = message.contains(SAVE_SUCCESS_MARKER);
    (message, ok)
}
