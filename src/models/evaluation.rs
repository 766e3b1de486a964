use serde::{Deserialize, Serialize};
use std::fmt;

/// 待评价列表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationEntry {
    /// 课程名称
    pub course: String,
    /// 授课教师
    pub teacher: String,
    /// 打分页面路径（绝对路径，如 `/jsxsd/xspj/xspj_edit.do?...`）
    pub operation_href: String,
    /// 操作列显示的文字（"评价" / "查看"）
    #[serde(default)]
    pub operation_text: String,
}

impl fmt::Display for EvaluationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.course, self.teacher)
    }
}

/// 评价列表页面中的五个隐藏参数
///
/// 由服务器下发，提交文字评价时必须原样带回，缺一不可。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenParams {
    /// `pj0502id`：评价批次
    pub batch_id: String,
    /// `pj05id`：评价轮次
    pub round_id: String,
    /// `pj02id`：学年学期
    pub term_id: String,
    /// `pj01id`：评价人
    pub person_id: String,
    /// `pj03id`：问卷
    pub form_id: String,
}

impl HiddenParams {
    /// 页面上的字段名，顺序与结构体字段一致
    pub const FIELD_NAMES: [&'static str; 5] = ["pj0502id", "pj05id", "pj02id", "pj01id", "pj03id"];

    /// 按字段名查找取值，全部存在时才构造成功
    ///
    /// 失败时返回缺失的字段名列表
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, Vec<&'static str>>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(Self::FIELD_NAMES.len());
        let mut missing = Vec::new();
        for name in Self::FIELD_NAMES {
            match lookup(name) {
                Some(v) => values.push(v),
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            batch_id: next(),
            round_id: next(),
            term_id: next(),
            person_id: next(),
            form_id: next(),
        })
    }

    /// 转换为表单字段（使用页面上的字段名）
    pub fn to_form(&self) -> Vec<(String, String)> {
        Self::FIELD_NAMES
            .iter()
            .zip([
                &self.batch_id,
                &self.round_id,
                &self.term_id,
                &self.person_id,
                &self.form_id,
            ])
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}
