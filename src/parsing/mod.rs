//! HTML 解析层
//!
//! 纯函数：输入页面文本，输出结构化数据或失败标记，不发请求、不 panic。

pub mod form_state;
pub mod markers;
pub mod pagination;
pub mod scoring_form;
pub mod table;

pub use form_state::FormState;
pub use table::{extract_table, rows_to_entries};
