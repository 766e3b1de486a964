use serde::Serialize;

/// 某个等级对应的选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeOption {
    /// 单选框的 value（`pj0601id`）
    pub option_id: String,
    /// 该选项的分值（隐藏的 `pj0601fz_*` 字段）
    pub score: String,
}

/// 评价指标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indicator {
    /// 指标序号（`pj06xh`）
    pub id: String,
    /// 等级 → 选项，保持页面上的选项顺序
    pub grades: Vec<(String, GradeOption)>,
}

impl Indicator {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            grades: Vec::new(),
        }
    }

    /// 按等级名查找选项
    pub fn grade(&self, label: &str) -> Option<&GradeOption> {
        self.grades
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, option)| option)
    }

    /// 记录一个等级，同名等级以后出现的为准
    pub fn insert_grade(&mut self, label: impl Into<String>, option: GradeOption) {
        let label = label.into();
        match self.grades.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = option,
            None => self.grades.push((label, option)),
        }
    }

    /// 可用等级名
    pub fn labels(&self) -> Vec<String> {
        self.grades.iter().map(|(l, _)| l.clone()).collect()
    }
}

/// 解析后的打分表单
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringForm {
    /// 需要原样回传的隐藏字段
    pub static_params: Vec<(String, String)>,
    /// 按页面顺序排列的指标
    pub indicators: Vec<Indicator>,
}

impl ScoringForm {
    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    pub fn indicator_ids(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.id.as_str()).collect()
    }
}

/// 提交请求体
///
/// 同名字段（如 `pj06xh`）按顺序重复出现，序列化为表单时逐个发送
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubmissionPayload {
    fields: Vec<(String, String)>,
}

impl SubmissionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// 设置单值字段，已存在的同名字段全部被替换
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.retain(|(n, _)| n != name);
        self.fields.push((name.to_string(), value.into()));
    }

    /// 取第一个同名字段的值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// 取全部同名字段的值
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
