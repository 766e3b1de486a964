//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整个评教过程的调度，是系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 评教主流程
//! - 管理应用生命周期（初始化、登录、运行、统计）
//! - 持有登录管理器，在每个阶段前检查登录态
//! - 两轮提交，输出全局统计
//!
//! ### `selection` - 高分课程选择
//! - 计算高分名额
//! - 解析用户输入的序号，补足名额
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<EvaluationEntry>)
//!     ↓
//! workflow::EvaluationFlow (处理单门课程)
//!     ↓
//! services (能力层：auth / discovery / harvester / evaluation)
//!     ↓
//! infrastructure (基础设施：PortalSession)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无解析逻辑**：只做调度、交互和统计，不解析页面

pub mod app;
pub mod selection;

// 重新导出主要类型
pub use app::App;
pub use selection::{max_high_count, parse_selection, Selection};
