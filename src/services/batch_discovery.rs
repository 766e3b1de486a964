//! 评价批次发现 - 业务能力层

use crate::error::{AppResult, MarkupError};
use crate::infrastructure::PortalSession;
use crate::models::HiddenParams;
use crate::parsing::markers::{extract_batch_path, extract_hidden_params};
use tracing::{error, info};

/// 评价入口页
pub const FIND_PATH: &str = "/jsxsd/xspj/xspj_find.do";
/// 评价列表页，后接批次查询串
pub const LIST_PATH: &str = "/jsxsd/xspj/xspj_list.do";

/// 批次发现服务
pub struct BatchDiscovery {
    session: PortalSession,
}

impl BatchDiscovery {
    pub fn new(session: PortalSession) -> Self {
        Self { session }
    }

    /// 获取当前开放的评价批次查询串
    ///
    /// 页面上没有"进入评价"链接时返回 `BatchLinkNotFound`，
    /// 通常意味着当前不在评教时间
    pub async fn get_batch_path(&self) -> AppResult<String> {
        let page = self.session.get_page(FIND_PATH).await?;
        match extract_batch_path(&page) {
            Some(path) => {
                info!("✓ 评价批次: {}", path);
                Ok(path)
            }
            None => {
                error!("未找到评价入口链接，可能不在评教时间");
                Err(MarkupError::BatchLinkNotFound.into())
            }
        }
    }

    /// 从列表页提取文字评价所需的五个隐藏参数
    pub async fn get_hidden_params(&self, batch_path: &str) -> AppResult<HiddenParams> {
        let page = self
            .session
            .get_page(&format!("{}{}", LIST_PATH, batch_path))
            .await?;
        extract_hidden_params(&page).map_err(|missing| {
            error!("隐藏参数不完整，缺少: {:?}", missing);
            MarkupError::HiddenParamsIncomplete { missing }.into()
        })
    }
}
