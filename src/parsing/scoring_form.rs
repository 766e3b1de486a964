//! 打分表单的解析与回填
//!
//! 页面结构（每个指标一行）：
//!
//! ```text
//! <tr>
//!   <td>..<input type="hidden" name="pj06xh" value="1"/></td>
//!   <td name="zbtd">
//!     <input type="radio" name="pj0601id_1" value="OPT_A"/> 优(10)
//!     <input type="hidden" name="pj0601fz_1_OPT_A" value="10"/>
//!     ...
//!   </td>
//! </tr>
//! ```

use crate::error::{AppResult, MarkupError, StrategyError};
use crate::models::{GradeOption, Indicator, ScoringForm, ScoringStrategy, SubmissionPayload};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// 打分表单 id
pub const FORM_ID: &str = "Form1";
/// 指标序号字段
pub const INDICATOR_FIELD: &str = "pj06xh";
/// 提交标记字段，0 为保存，1 为提交
pub const SUBMIT_FLAG_FIELD: &str = "issubmit";

static FORM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").expect("form selector"));
static HIDDEN_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[type="hidden"]"#).expect("hidden selector"));
static INDICATOR_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="pj06xh"]"#).expect("indicator selector"));
static OPTIONS_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[name="zbtd"]"#).expect("options cell selector"));
static RADIO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[type="radio"]"#).expect("radio selector"));
/// 从 " 优(10)" 中取出 "优"
static GRADE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*[(（]").expect("grade pattern"));

/// 选中项字段名
pub fn option_field(indicator_id: &str) -> String {
    format!("pj0601id_{}", indicator_id)
}

/// 分值字段名
pub fn score_field(indicator_id: &str, option_id: &str) -> String {
    format!("pj0601fz_{}_{}", indicator_id, option_id)
}

/// 解析打分页面
pub fn decode(html: &str) -> AppResult<ScoringForm> {
    let document = Html::parse_document(html);
    let form = document
        .select(&FORM)
        .find(|f| f.value().id() == Some(FORM_ID))
        .ok_or_else(|| MarkupError::FormNotFound {
            form_id: FORM_ID.to_string(),
        })?;

    let mut static_params: Vec<(String, String)> = Vec::new();
    for input in form.select(&HIDDEN_INPUT) {
        let Some(name) = input.value().attr("name") else {
            continue;
        };
        if name == INDICATOR_FIELD {
            continue;
        }
        let value = input.value().attr("value").unwrap_or_default().to_string();
        match static_params.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => static_params.push((name.to_string(), value)),
        }
    }

    let mut indicators = Vec::new();
    let mut seen_rows = Vec::new();
    for indicator_input in form.select(&INDICATOR_INPUT) {
        let Some(row) = enclosing_row(&indicator_input) else {
            warn!("指标字段不在表格行内，已跳过");
            continue;
        };
        if seen_rows.contains(&row.id()) {
            continue;
        }
        seen_rows.push(row.id());

        let id = indicator_input
            .value()
            .attr("value")
            .unwrap_or_default()
            .to_string();
        let mut indicator = Indicator::new(id);

        match row.select(&OPTIONS_CELL).next() {
            Some(cell) => {
                for radio in cell.select(&RADIO) {
                    if let Some((label, option)) = parse_option(&radio) {
                        indicator.insert_grade(label, option);
                    }
                }
            }
            None => warn!("指标 {} 没有找到选项单元格", indicator.id),
        }

        if indicator.grades.is_empty() {
            warn!("指标 {} 没有解析出任何等级", indicator.id);
        } else {
            debug!("指标 {} 可用等级: {:?}", indicator.id, indicator.labels());
        }
        indicators.push(indicator);
    }

    if indicators.is_empty() {
        return Err(MarkupError::NoIndicators.into());
    }

    Ok(ScoringForm {
        static_params,
        indicators,
    })
}

/// 按策略生成提交请求体
///
/// 任何一个指标缺少策略要求的等级都会直接失败，不会产生部分请求体
pub fn encode(form: &ScoringForm, strategy: &ScoringStrategy) -> AppResult<SubmissionPayload> {
    if strategy.len() != form.indicator_count() {
        return Err(StrategyError::LengthMismatch {
            strategy: strategy.name.clone(),
            grades: strategy.len(),
            indicators: form.indicator_count(),
        }
        .into());
    }

    let mut payload = SubmissionPayload::new();
    for (name, value) in &form.static_params {
        payload.push(name.clone(), value.clone());
    }
    payload.set(SUBMIT_FLAG_FIELD, "1");

    for (indicator, grade) in form.indicators.iter().zip(&strategy.grades) {
        let chosen = indicator
            .grade(grade)
            .ok_or_else(|| StrategyError::MissingGrade {
                indicator: indicator.id.clone(),
                grade: grade.clone(),
                available: indicator.labels(),
            })?;

        payload.set(&option_field(&indicator.id), chosen.option_id.clone());
        // 未选中的等级也要带上分值
        for (_, option) in &indicator.grades {
            payload.set(
                &score_field(&indicator.id, &option.option_id),
                option.score.clone(),
            );
        }
    }

    for indicator in &form.indicators {
        payload.push(INDICATOR_FIELD, indicator.id.clone());
    }

    Ok(payload)
}

fn enclosing_row<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "tr")
}

/// 解析一个单选项：其后的文字给出等级名，其后的隐藏字段给出分值
fn parse_option(radio: &ElementRef) -> Option<(String, GradeOption)> {
    let option_id = radio.value().attr("value")?.to_string();

    let mut text = String::new();
    let mut score = None;
    let mut reading_text = true;
    for sibling in radio.next_siblings() {
        if let Some(element) = ElementRef::wrap(sibling) {
            let el = element.value();
            if el.name() == "input" {
                let kind = el.attr("type").unwrap_or_default();
                if kind.eq_ignore_ascii_case("radio") {
                    break;
                }
                reading_text = false;
                if kind.eq_ignore_ascii_case("hidden") {
                    score = el.attr("value").map(str::to_string);
                    break;
                }
                continue;
            }
            if reading_text {
                text.extend(element.text());
            }
        } else if let (true, Node::Text(t)) = (reading_text, sibling.value()) {
            text.push_str(t);
        }
    }

    let Some(score) = score else {
        warn!("选项 {} 后没有分值字段", option_id);
        return None;
    };
    let Some(label) = GRADE_LABEL
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    else {
        warn!("无法从 '{}' 中识别等级", text.trim());
        return None;
    };

    Some((label, GradeOption { option_id, score }))
}
