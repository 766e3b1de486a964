//! 表格提取
//!
//! 按表头位置把每一行拼成 `TableRow`，"操作"列同时保留链接文字和地址。

use crate::models::{Cell, EvaluationEntry, TableExtraction, TableRow};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::warn;

/// 待评价列表表格的 id
pub const LIST_TABLE_ID: &str = "dataList";
/// 课程名称列
pub const COURSE_HEADER: &str = "课程名称";
/// 授课教师列
pub const TEACHER_HEADER: &str = "授课教师";
/// 操作列
pub const OPERATION_HEADER: &str = "操作";

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").expect("table selector"));
static TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("th selector"));
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("td selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("a selector"));

/// 提取指定 id 的表格
///
/// 找不到表格时返回 [`TableExtraction::Error`]，不会 panic。
/// 单元格少于表头时，缺失的列填 [`Cell::Empty`]。
pub fn extract_table(html: &str, table_id: &str) -> TableExtraction {
    let document = Html::parse_document(html);
    let Some(table) = document
        .select(&TABLE)
        .find(|t| t.value().id() == Some(table_id))
    else {
        return TableExtraction::Error {
            error: format!("未找到ID为'{}'的表格", table_id),
        };
    };

    let headers: Vec<String> = table.select(&TH).map(|th| cell_text(&th)).collect();

    let rows = table
        .select(&TR)
        .skip(1)
        .map(|tr| {
            let cells: Vec<ElementRef> = tr.select(&TD).collect();
            let mut row = TableRow::default();
            for (i, header) in headers.iter().enumerate() {
                let cell = match cells.get(i) {
                    Some(td) if header == OPERATION_HEADER => link_cell(td),
                    Some(td) => Cell::Text(cell_text(td)),
                    None => Cell::Empty,
                };
                row.push(header.clone(), cell);
            }
            row
        })
        .collect();

    TableExtraction::Rows(rows)
}

/// 把表格行转换为评价条目，保持原有顺序
///
/// 没有操作链接的行（例如已评价、只能查看）会被跳过并记录警告
pub fn rows_to_entries(rows: &[TableRow]) -> Vec<EvaluationEntry> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let course = row.text(COURSE_HEADER).unwrap_or_default().to_string();
            let teacher = row.text(TEACHER_HEADER).unwrap_or_default().to_string();
            match row.get(OPERATION_HEADER) {
                Some(Cell::Link { text, href }) => Some(EvaluationEntry {
                    course,
                    teacher,
                    operation_href: href.clone(),
                    operation_text: text.clone(),
                }),
                _ => {
                    warn!("第 {} 行没有操作链接，已跳过: {} - {}", i + 1, course, teacher);
                    None
                }
            }
        })
        .collect()
}

fn cell_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

fn link_cell(td: &ElementRef) -> Cell {
    match td.select(&LINK).next() {
        Some(a) => Cell::Link {
            text: cell_text(&a),
            href: a.value().attr("href").unwrap_or_default().to_string(),
        },
        None => Cell::Empty,
    }
}
