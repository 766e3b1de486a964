//! 表单状态快照
//!
//! 翻页请求需要把第一页回显的表单字段原样带回，只改页码。

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;

static FIELDS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input, select, textarea").expect("field selector"));
static OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("option selector"));

/// 不随表单提交的 input 类型
const SKIPPED_INPUT_TYPES: [&str; 5] = ["submit", "button", "image", "reset", "file"];

/// 表单字段快照，同名字段按页面顺序保留
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormState {
    fields: Vec<(String, String)>,
}

impl FormState {
    /// 从页面中收集所有可提交字段
    ///
    /// - 单选框、复选框只收集选中的
    /// - 下拉框取选中项，没有选中项时取第一项
    pub fn snapshot(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut fields = Vec::new();

        for element in document.select(&FIELDS) {
            let Some(name) = element.value().attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            match element.value().name() {
                "input" => {
                    if let Some(value) = input_value(&element) {
                        fields.push((name.to_string(), value));
                    }
                }
                "select" => {
                    for value in select_values(&element) {
                        fields.push((name.to_string(), value));
                    }
                }
                "textarea" => {
                    fields.push((name.to_string(), element.text().collect()));
                }
                _ => {}
            }
        }

        Self { fields }
    }

    /// 覆盖某个字段（移除全部同名字段后追加）
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.retain(|(n, _)| n != name);
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn input_value(element: &ElementRef) -> Option<String> {
    let input = element.value();
    let kind = input.attr("type").unwrap_or("text").to_ascii_lowercase();
    if SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
        return None;
    }
    if (kind == "radio" || kind == "checkbox") && input.attr("checked").is_none() {
        return None;
    }
    let default = if kind == "checkbox" { "on" } else { "" };
    Some(input.attr("value").unwrap_or(default).to_string())
}

fn select_values(element: &ElementRef) -> Vec<String> {
    let options: Vec<ElementRef> = element.select(&OPTION).collect();
    let option_value = |option: &ElementRef| {
        option
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| option.text().collect::<String>().trim().to_string())
    };

    let selected: Vec<String> = options
        .iter()
        .filter(|o| o.value().attr("selected").is_some())
        .map(option_value)
        .collect();

    if selected.is_empty() {
        options.first().map(option_value).into_iter().collect()
    } else if element.value().attr("multiple").is_some() {
        selected
    } else {
        selected.into_iter().take(1).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_HTML: &str = r#"
<form id="Form1" method="post">
  <input type="hidden" name="pj0502id" value="B1"/>
  <input type="hidden" name="pageIndex" value="1"/>
  <input type="hidden" name="ids" value="a"/>
  <input type="hidden" name="ids" value="b"/>
  <input type="text" name="kcmc"/>
  <input type="radio" name="sfpj" value="0"/>
  <input type="radio" name="sfpj" value="1" checked/>
  <input type="checkbox" name="flag" checked/>
  <input type="submit" name="go" value="查询"/>
  <select name="xnxq01id">
    <option value="2024-2025-1">2024-2025-1</option>
    <option value="2024-2025-2" selected>2024-2025-2</option>
  </select>
  <select name="pageSize"><option value="10">10</option><option value="20">20</option></select>
  <textarea name="memo">备注</textarea>
</form>
"#;

    #[test]
    fn test_snapshot_collects_submittable_fields() {
        let state = FormState::snapshot(FORM_HTML);
        assert_eq!(state.get("pj0502id"), Some("B1"));
        assert_eq!(state.get_all("ids"), vec!["a", "b"]);
        assert_eq!(state.get("kcmc"), Some(""));
        assert_eq!(state.get_all("sfpj"), vec!["1"]);
        assert_eq!(state.get("flag"), Some("on"));
        assert_eq!(state.get("go"), None);
        assert_eq!(state.get("xnxq01id"), Some("2024-2025-2"));
        assert_eq!(state.get("pageSize"), Some("10"));
        assert_eq!(state.get("memo"), Some("备注"));
    }

    #[test]
    fn test_with_overrides_page_index() {
        let state = FormState::snapshot(FORM_HTML).with("pageIndex", "3");
        assert_eq!(state.get_all("pageIndex"), vec!["3"]);
        assert_eq!(state.get("pj0502id"), Some("B1"));
    }
}
