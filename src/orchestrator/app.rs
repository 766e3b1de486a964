//! 评教主流程 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建会话、读取凭据、加载打分策略
//! 2. **登录**：获取初始 Cookie 后验证码登录
//! 3. **文字评价**：提取隐藏参数并提交
//! 4. **列表收集**：翻页获取全部待评价课程
//! 5. **高分选择**：按名额让用户选择使用高分策略的课程
//! 6. **两轮提交**：
//!    - 第一轮全部课程使用标准策略，解除"不能全部同分"之类的限制
//!    - 第二轮按选择结果分别使用高分 / 标准策略
//! 7. **全局统计**
//!
//! 每个阶段开始前检查登录态，失效时自动重新登录

use crate::config::Config;
use crate::infrastructure::PortalSession;
use crate::models::{EvaluationEntry, ScoringStrategy, StrategyBook, SCENARIO_89, SCENARIO_98};
use crate::orchestrator::selection::{self, Selection};
use crate::services::{
    AuthManager, BatchDiscovery, CaptchaResolver, EvaluationService, ListHarvester,
};
use crate::utils::logging::{log_section, log_welcome, print_final_stats};
use crate::utils::{prompt, truncate_text};
use crate::workflow::{EvaluationCtx, EvaluationFlow};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

/// 第二轮提交统计
#[derive(Debug, Default, Clone, Copy)]
struct RunStats {
    success: usize,
    failed: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    session: PortalSession,
    auth: AuthManager<CaptchaResolver>,
    strategies: StrategyBook,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let session = PortalSession::from_config(&config)?;
        let credentials = config.credentials()?;
        let resolver = CaptchaResolver::from_config(&config)?;
        let auth = AuthManager::new(session.clone(), credentials, resolver);

        let strategies = match &config.strategy_file {
            Some(path) => StrategyBook::with_file(path)
                .with_context(|| format!("加载打分策略文件 {} 失败", path.display()))?,
            None => StrategyBook::presets(),
        };
        info!("可用打分策略: {:?}", strategies.names());

        Ok(Self {
            config,
            session,
            auth,
            strategies,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        log_welcome();

        self.login().await?;

        let discovery = BatchDiscovery::new(self.session.clone());
        let batch_path = discovery
            .get_batch_path()
            .await
            .context("获取评价批次失败，可能当前不在评教时间")?;

        self.text_evaluation(&discovery, &batch_path).await?;

        prompt::pause("按回车键开始获取评价列表...").await?;
        self.ensure_session().await?;
        let entries = ListHarvester::new(self.session.clone())
            .with_max_page_probes(self.config.max_page_probes)
            .get_evaluation_list(&batch_path)
            .await
            .context("获取评价列表失败")?;

        if entries.is_empty() {
            warn!("⚠️ 没有待评价的课程，程序结束");
            return Ok(());
        }

        log_entries(&entries);
        let high = self.choose_high_score_courses(&entries).await?;

        if !prompt::confirm("确认开始评教? (y/n): ").await? {
            info!("已取消评教");
            return Ok(());
        }

        let high_strategy = self.strategies.get(SCENARIO_98)?.clone();
        let standard_strategy = self.strategies.get(SCENARIO_89)?.clone();
        let flow = EvaluationFlow::new(EvaluationService::new(self.session.clone()));

        log_section("第一轮：全部课程使用标准策略");
        self.ensure_session().await?;
        self.submit_all(&flow, &entries, |_| &standard_strategy).await;

        log_section("第二轮：按选择结果提交");
        self.ensure_session().await?;
        let stats = self
            .submit_all(&flow, &entries, |i| {
                if high.contains(&i) {
                    &high_strategy
                } else {
                    &standard_strategy
                }
            })
            .await;

        print_final_stats(stats.success, stats.failed, high.len(), entries.len());
        Ok(())
    }

    async fn login(&mut self) -> Result<()> {
        log_section("登录教务系统");
        self.auth
            .establish_session()
            .await
            .context("无法访问教务系统首页")?;
        self.auth
            .attempt_login(self.config.login_max_retries)
            .await
            .context("程序启动失败，无法完成初始登录")?;
        Ok(())
    }

    async fn ensure_session(&mut self) -> Result<()> {
        self.auth
            .ensure_session(self.config.login_max_retries)
            .await
            .context("会话失效且重新登录失败")?;
        Ok(())
    }

    /// 文字评价，隐藏参数不完整时跳过
    async fn text_evaluation(&mut self, discovery: &BatchDiscovery, batch_path: &str) -> Result<()> {
        log_section("文字评价");
        let params = match discovery.get_hidden_params(batch_path).await {
            Ok(params) => params,
            Err(e) => {
                warn!("⚠️ 跳过文字评价: {}", e);
                return Ok(());
            }
        };

        prompt::pause("按回车键开始提交文字评价...").await?;
        self.ensure_session().await?;
        match EvaluationService::new(self.session.clone())
            .submit_text_evaluation(&params)
            .await
        {
            Ok(outcome) if outcome.success => info!("✓ 文字评价: {}", outcome.message),
            Ok(outcome) => warn!("文字评价未成功: {}", outcome.message),
            Err(e) => error!("文字评价提交失败: {}", e),
        }
        Ok(())
    }

    /// 让用户选择使用高分策略的课程，返回下标
    async fn choose_high_score_courses(&self, entries: &[EvaluationEntry]) -> Result<Vec<usize>> {
        let total = entries.len();
        let max = selection::max_high_count(total, self.config.high_score_ratio);
        info!(
            "最多可选 {} 门课程使用高分策略 ({:.0}%)",
            max,
            self.config.high_score_ratio * 100.0
        );
        if max == 0 {
            return Ok(Vec::new());
        }

        let input = prompt::read_line_async(format!(
            "请输入课程序号（空格或逗号分隔，直接回车默认前 {} 门）: ",
            max
        ))
        .await?;

        let mut high = match selection::parse_selection(&input, total, max) {
            Selection::Default(indices) => indices,
            Selection::Chosen { mut indices, shortfall } => {
                if shortfall > 0
                    && prompt::confirm(format!(
                        "还可以再选 {} 门，是否按列表顺序自动补足? (y/n): ",
                        shortfall
                    ))
                    .await?
                {
                    selection::fill_remaining(&mut indices, total, max);
                }
                indices
            }
        };
        high.sort_unstable();

        info!("高分策略课程:");
        for &i in &high {
            info!("  {}. {}", i + 1, entries[i]);
        }
        Ok(high)
    }

    /// 依次提交全部课程，单门失败不影响其余课程
    async fn submit_all<'a, F>(
        &self,
        flow: &EvaluationFlow,
        entries: &[EvaluationEntry],
        pick: F,
    ) -> RunStats
    where
        F: Fn(usize) -> &'a ScoringStrategy,
    {
        let total = entries.len();
        let mut stats = RunStats::default();
        for (i, entry) in entries.iter().enumerate() {
            let ctx = EvaluationCtx::new(entry, i, total);
            match flow.run(entry, &ctx, pick(i)).await {
                Ok(result) if result.is_saved() => stats.success += 1,
                Ok(_) => stats.failed += 1,
                Err(e) => {
                    error!("{} ❌ 提交失败: {}", ctx, e);
                    stats.failed += 1;
                }
            }
        }
        info!("本轮完成: 成功 {}，失败 {}", stats.success, stats.failed);
        stats
    }
}

fn log_entries(entries: &[EvaluationEntry]) {
    log_section(&format!("待评价课程 ({} 门)", entries.len()));
    for (i, entry) in entries.iter().enumerate() {
        info!(
            "{:>3}. {} - {}",
            i + 1,
            truncate_text(&entry.course, 24),
            entry.teacher
        );
    }
}
