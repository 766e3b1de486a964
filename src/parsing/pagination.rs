//! 分页信息识别

use regex::Regex;
use std::sync::LazyLock;

/// 翻页时覆盖的页码字段
pub const PAGE_INDEX_FIELD: &str = "pageIndex";

/// 页面上出现过的"共 N 页"写法
static TOTAL_PAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"共\s*(\d+)\s*页",
        r"第\s*\d+\s*/\s*(\d+)\s*页",
        r"(?i)totalPages?\s*[=:]\s*['\x22]?(\d+)",
        r"(?i)pageCount\s*[=:]\s*['\x22]?(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("page pattern"))
    .collect()
});

/// "下一页"文字，或 onclick 中调用 nextPage
static NEXT_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)下一页|onclick\s*=\s*["'][^"']*nextPage"#).expect("next page pattern")
});

/// 识别总页数，按写法顺序匹配第一个命中的
///
/// 识别到 0 页时按 1 页处理
pub fn total_pages(html: &str) -> Option<usize> {
    TOTAL_PAGE_PATTERNS.iter().find_map(|re| {
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .map(|n| n.max(1))
    })
}

/// 页面上是否有"下一页"控件
pub fn has_next_page(html: &str) -> bool {
    NEXT_PAGE.is_match(html)
}
