//! 课程评价流程 - 流程层
//!
//! 核心职责：定义"评一门课"的完整流程
//!
//! 流程顺序：
//! 1. 获取打分页面 → 解码
//! 2. 按策略编码
//! 3. 提交 → 读取 alert 判定结果

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::{EvaluationEntry, ScoringStrategy};
use crate::parsing::scoring_form;
use crate::services::EvaluationService;
use crate::workflow::evaluation_ctx::EvaluationCtx;

/// 单门课程的提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// 保存成功
    Saved,
    /// 服务器拒绝，附带 alert 文字
    Rejected(String),
}

impl FlowResult {
    pub fn is_saved(&self) -> bool {
        matches!(self, FlowResult::Saved)
    }
}

/// 课程评价流程
///
/// - 不持有登录态，不做重新登录
/// - 不决定使用哪个策略
/// - 策略与页面不匹配只影响本门课程，错误交给调用方记录
pub struct EvaluationFlow {
    service: EvaluationService,
}

impl EvaluationFlow {
    pub fn new(service: EvaluationService) -> Self {
        Self { service }
    }

    pub async fn run(
        &self,
        entry: &EvaluationEntry,
        ctx: &EvaluationCtx,
        strategy: &ScoringStrategy,
    ) -> AppResult<FlowResult> {
        info!("{} 使用策略 {}", ctx, strategy.name);

        let form = self.service.fetch_form(entry).await?;
        debug!("{} 指标: {:?}", ctx, form.indicator_ids());

        let payload = scoring_form::encode(&form, strategy)?;

        let outcome = self.service.submit_scores(&payload).await?;
        if outcome.success {
            info!("{} ✓ {}", ctx, outcome.message);
            Ok(FlowResult::Saved)
        } else {
            warn!("{} 提交未成功: {}", ctx, outcome.message);
            Ok(FlowResult::Rejected(outcome.message))
        }
    }
}
