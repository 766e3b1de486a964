//! 待评价列表收集 - 业务能力层
//!
//! 职责：
//! - 读取第一页，识别总页数
//! - 按页码逐页 POST，带回第一页的表单字段
//! - 总页数未知但有"下一页"时逐页探测，直到没有新数据
//!
//! 单页失败只记录日志并跳过，返回已收集到的部分结果

use crate::error::{AppResult, MarkupError};
use crate::infrastructure::PortalSession;
use crate::models::{EvaluationEntry, TableRow};
use crate::parsing::pagination::{has_next_page, total_pages, PAGE_INDEX_FIELD};
use crate::parsing::table::LIST_TABLE_ID;
use crate::parsing::{extract_table, rows_to_entries, FormState};
use crate::services::batch_discovery::LIST_PATH;
use tracing::{debug, error, info, warn};

/// 总页数未知时最多探测的页数
pub const DEFAULT_MAX_PAGE_PROBES: usize = 50;

/// 列表收集服务
pub struct ListHarvester {
    session: PortalSession,
    max_page_probes: usize,
}

impl ListHarvester {
    pub fn new(session: PortalSession) -> Self {
        Self {
            session,
            max_page_probes: DEFAULT_MAX_PAGE_PROBES,
        }
    }

    /// 设置探测页数上限（含第一页）
    pub fn with_max_page_probes(mut self, max: usize) -> Self {
        self.max_page_probes = max.max(1);
        self
    }

    /// 收集全部待评价条目，按页码、行序排列
    ///
    /// # 参数
    /// - `batch_path`: 批次查询串，例如 `?pj0502id=...`
    ///
    /// # 返回
    /// 第一页获取或解析失败时返回错误，其余页面失败只跳过
    pub async fn get_evaluation_list(&self, batch_path: &str) -> AppResult<Vec<EvaluationEntry>> {
        let list_url = format!("{}{}", LIST_PATH, batch_path);
        let first_page = self.session.get_page(&list_url).await?;
        let first_rows = parse_rows(&first_page)?;
        let mut entries = rows_to_entries(&first_rows);
        info!("第 1 页: {} 条", entries.len());

        let baseline = FormState::snapshot(&first_page);

        match total_pages(&first_page) {
            Some(pages) => {
                info!("共 {} 页", pages);
                self.collect_known_pages(&list_url, &baseline, pages, &mut entries)
                    .await;
            }
            None if has_next_page(&first_page) => {
                info!("未识别到总页数，逐页探测");
                self.probe_pages(&list_url, &baseline, &mut entries).await;
            }
            None => debug!("列表只有一页"),
        }

        info!("✓ 共获取 {} 条待评价课程", entries.len());
        Ok(entries)
    }

    async fn collect_known_pages(
        &self,
        list_url: &str,
        baseline: &FormState,
        pages: usize,
        entries: &mut Vec<EvaluationEntry>,
    ) {
        for index in 2..=pages {
            match self.fetch_page(list_url, baseline, index).await {
                Ok((rows, _)) => {
                    let page_entries = rows_to_entries(&rows);
                    info!("第 {}/{} 页: {} 条", index, pages, page_entries.len());
                    entries.extend(page_entries);
                }
                Err(e) if e.is_network() => {
                    error!("第 {}/{} 页请求失败，已跳过: {}", index, pages, e)
                }
                Err(e) => error!("第 {}/{} 页解析失败，已跳过: {}", index, pages, e),
            }
        }
    }

    /// 逐页探测，遇到以下情况停止：
    /// - 请求失败
    /// - 页面没有数据行
    /// - 页面内容与上一页相同（已越过末页）
    /// - 页面没有"下一页"控件
    /// - 达到探测上限
    async fn probe_pages(
        &self,
        list_url: &str,
        baseline: &FormState,
        entries: &mut Vec<EvaluationEntry>,
    ) {
        let mut previous = hrefs(entries);

        for index in 2..=self.max_page_probes {
            let (rows, html) = match self.fetch_page(list_url, baseline, index).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("第 {} 页获取失败，停止探测: {}", index, e);
                    return;
                }
            };
            if rows.is_empty() {
                debug!("第 {} 页没有数据，停止探测", index);
                return;
            }

            let page_entries = rows_to_entries(&rows);
            let current = hrefs(&page_entries);
            if current == previous {
                debug!("第 {} 页与上一页相同，停止探测", index);
                return;
            }

            info!("第 {} 页: {} 条", index, page_entries.len());
            entries.extend(page_entries);
            previous = current;

            if !has_next_page(&html) {
                return;
            }
        }

        warn!("已达到探测上限 {} 页，停止翻页", self.max_page_probes);
    }

    async fn fetch_page(
        &self,
        list_url: &str,
        baseline: &FormState,
        index: usize,
    ) -> AppResult<(Vec<TableRow>, String)> {
        let form = baseline.clone().with(PAGE_INDEX_FIELD, index.to_string());
        let html = self.session.post_page(list_url, &form).await?;
        let rows = parse_rows(&html)?;
        Ok((rows, html))
    }
}

fn parse_rows(html: &str) -> AppResult<Vec<TableRow>> {
    extract_table(html, LIST_TABLE_ID)
        .into_rows()
        .map_err(|message| {
            debug!("{}", message);
            MarkupError::TableNotFound {
                table_id: LIST_TABLE_ID.to_string(),
            }
            .into()
        })
}

fn hrefs(entries: &[EvaluationEntry]) -> Vec<String> {
    entries.iter().map(|e| e.operation_href.clone()).collect()
}
