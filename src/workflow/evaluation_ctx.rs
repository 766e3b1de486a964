//! 课程评价上下文
//!
//! 封装"我正在评第几门课、哪位老师"这一信息，只用于日志

use crate::models::EvaluationEntry;
use std::fmt::Display;

/// 课程评价上下文
#[derive(Debug, Clone)]
pub struct EvaluationCtx {
    /// 课程在列表中的序号（从1开始）
    pub index: usize,

    /// 列表总数
    pub total: usize,

    pub course: String,

    pub teacher: String,
}

impl EvaluationCtx {
    /// 由列表条目创建上下文
    ///
    /// # 参数
    /// - `index`: 从 0 开始的列表下标
    /// - `total`: 列表总数
    pub fn new(entry: &EvaluationEntry, index: usize, total: usize) -> Self {
        Self {
            index: index + 1,
            total,
            course: entry.course.clone(),
            teacher: entry.teacher.clone(),
        }
    }
}

impl Display for EvaluationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[课程 {}/{} {} / {}]",
            self.index, self.total, self.course, self.teacher
        )
    }
}
