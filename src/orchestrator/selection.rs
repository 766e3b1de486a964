//! 高分课程选择
//!
//! 纯函数，不做任何输入输出，便于测试。下标一律从 0 开始，
//! 只有解析用户输入时按从 1 开始的序号理解。

use tracing::warn;

/// 高分课程名额：`ceil(总数 × 比例)`，不超过总数
pub fn max_high_count(total: usize, ratio: f64) -> usize {
    if total == 0 || ratio <= 0.0 {
        return 0;
    }
    ((total as f64 * ratio).ceil() as usize).min(total)
}

/// 默认选择：前 `max` 门课程
pub fn default_selection(total: usize, max: usize) -> Vec<usize> {
    (0..max.min(total)).collect()
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 输入为空或无法解析，使用默认选择
    Default(Vec<usize>),
    /// 用户选择（已去重、去掉越界、截断到名额）
    Chosen {
        indices: Vec<usize>,
        /// 距离名额还差几门
        shortfall: usize,
    },
}

impl Selection {
    pub fn indices(&self) -> &[usize] {
        match self {
            Selection::Default(indices) => indices,
            Selection::Chosen { indices, .. } => indices,
        }
    }
}

/// 解析用户输入的课程序号
///
/// # 参数
/// - `input`: 空格或逗号分隔的序号，从 1 开始
/// - `total`: 课程总数
/// - `max`: 高分名额
///
/// 规则：
/// - 空输入或含非数字：使用默认选择
/// - 越界序号：丢弃
/// - 重复序号：只保留第一次
/// - 超过名额：只保留前 `max` 个
pub fn parse_selection(input: &str, total: usize, max: usize) -> Selection {
    let tokens: Vec<&str> = input
        .split(|c: char| c.is_whitespace() || c == ',' || c == '，')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Selection::Default(default_selection(total, max));
    }

    let numbers: Result<Vec<usize>, _> = tokens.iter().map(|t| t.parse::<usize>()).collect();
    let Ok(numbers) = numbers else {
        warn!("输入格式错误，使用默认选择");
        return Selection::Default(default_selection(total, max));
    };

    let mut indices = Vec::new();
    for number in numbers {
        if number == 0 || number > total {
            warn!("序号 {} 超出范围 1-{}，已忽略", number, total);
            continue;
        }
        let index = number - 1;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }

    if indices.len() > max {
        warn!("选择了 {} 门课程，超过名额 {}，只保留前 {} 门", indices.len(), max, max);
        indices.truncate(max);
    }

    let shortfall = max - indices.len();
    Selection::Chosen { indices, shortfall }
}

/// 按列表顺序补足名额，返回补充的下标
pub fn fill_remaining(indices: &mut Vec<usize>, total: usize, max: usize) -> Vec<usize> {
    let mut added = Vec::new();
    for index in 0..total {
        if indices.len() >= max {
            break;
        }
        if !indices.contains(&index) {
            indices.push(index);
            added.push(index);
        }
    }
    added
}
