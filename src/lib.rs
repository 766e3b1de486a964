//! # QFNU Evaluate
//!
//! 曲阜师范大学教务系统自动评教工具
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构，另有一个纯解析层：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有唯一的 Cookie 罐，只暴露 GET / POST 能力
//! - `PortalSession` - 所有组件共享的会话
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `AuthManager` - 验证码登录、登录态探测、重新登录
//! - `CaptchaResolver` - 识别服务优先，手动输入兜底
//! - `BatchDiscovery` - 评价批次与隐藏参数
//! - `ListHarvester` - 翻页收集待评价课程
//! - `EvaluationService` - 获取打分页面、提交打分与文字评价
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一门课"的完整处理流程
//! - `EvaluationCtx` - 上下文封装（序号 + 课程 + 教师）
//! - `EvaluationFlow` - 流程编排（fetch → decode → encode → submit）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 登录、列表、选择、两轮提交、统计
//! - `orchestrator/selection` - 高分名额与序号解析
//!
//! ### 解析层（Parsing）
//! - `parsing/` - 只处理 HTML 文本，不发请求：表格、表单快照、分页、打分表单、页面标记
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod parsing;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use infrastructure::PortalSession;
pub use models::{EvaluationEntry, HiddenParams, ScoringForm, ScoringStrategy, SubmissionPayload};
pub use orchestrator::App;
pub use workflow::{EvaluationCtx, EvaluationFlow, FlowResult};
