//! 评价提交服务 - 业务能力层
//!
//! 职责：
//! - 获取单门课程的打分页面并解码
//! - 提交打分表单
//! - 提交文字评价
//!
//! 不负责选择策略，不负责登录

use crate::error::AppResult;
use crate::infrastructure::PortalSession;
use crate::models::{EvaluationEntry, HiddenParams, ScoringForm, SubmissionPayload};
use crate::parsing::markers::save_verdict;
use crate::parsing::scoring_form;
use tracing::debug;

/// 打分保存地址
pub const SAVE_PATH: &str = "/jsxsd/xspj/xspj_save.do";
/// 文字评价保存地址
pub const TEXT_EVALUATION_PATH: &str = "/jsxsd/xspj/toSavepj03wjpj.do";
/// 文字评价固定选择的答案
pub const TEXT_EVALUATION_ANSWER: &str = "A.";

/// 保存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// 响应中 alert 的文字
    pub message: String,
    /// 是否保存成功
    pub success: bool,
}

impl SaveOutcome {
    fn from_body(body: &str) -> Self {
        let (message, success) = save_verdict(body);
        Self { message, success }
    }
}

/// 评价提交服务
pub struct EvaluationService {
    session: PortalSession,
}

impl EvaluationService {
    pub fn new(session: PortalSession) -> Self {
        Self { session }
    }

    /// 获取并解码某门课程的打分页面
    pub async fn fetch_form(&self, entry: &EvaluationEntry) -> AppResult<ScoringForm> {
        let html = self.session.get_page(&entry.operation_href).await?;
        let form = scoring_form::decode(&html)?;
        debug!(
            "{}: {} 个指标，{} 个固定字段",
            entry,
            form.indicator_count(),
            form.static_params.len()
        );
        Ok(form)
    }

    /// 提交打分表单
    pub async fn submit_scores(&self, payload: &SubmissionPayload) -> AppResult<SaveOutcome> {
        let body = self.session.post_page(SAVE_PATH, payload).await?;
        Ok(SaveOutcome::from_body(&body))
    }

    /// 提交文字评价：五个隐藏参数加固定答案
    pub async fn submit_text_evaluation(&self, params: &HiddenParams) -> AppResult<SaveOutcome> {
        let mut form = params.to_form();
        form.push(("jynr".to_string(), TEXT_EVALUATION_ANSWER.to_string()));
        form.push(("pageIndex".to_string(), "1".to_string()));

        let body = self.session.post_page(TEXT_EVALUATION_PATH, &form).await?;
        Ok(SaveOutcome::from_body(&body))
    }
}
