use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// 表格单元格
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// 普通文本
    Text(String),
    /// 带链接的单元格（"操作"列）
    Link { text: String, href: String },
    /// 缺失的单元格
    Empty,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(t) => Some(t),
            Cell::Link { text, .. } => Some(text),
            Cell::Empty => None,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Cell::Link { href, .. } => Some(href),
            _ => None,
        }
    }
}

/// 表格中的一行，列顺序与表头一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<(String, Cell)>,
}

impl TableRow {
    pub fn push(&mut self, header: impl Into<String>, cell: Cell) {
        self.cells.push((header.into(), cell));
    }

    /// 按表头取单元格
    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, c)| c)
    }

    /// 按表头取文本
    pub fn text(&self, header: &str) -> Option<&str> {
        self.get(header).and_then(Cell::as_text)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, cell) in &self.cells {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}

/// 表格提取结果
///
/// 找不到表格时返回只有一个 `error` 键的结构，调用方检查后记录日志即可
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TableExtraction {
    Rows(Vec<TableRow>),
    Error { error: String },
}

impl TableExtraction {
    pub fn is_error(&self) -> bool {
        matches!(self, TableExtraction::Error { .. })
    }

    pub fn rows(&self) -> Option<&[TableRow]> {
        match self {
            TableExtraction::Rows(rows) => Some(rows),
            TableExtraction::Error { .. } => None,
        }
    }

    pub fn into_rows(self) -> Result<Vec<TableRow>, String> {
        match self {
            TableExtraction::Rows(rows) => Ok(rows),
            TableExtraction::Error { error } => Err(error),
        }
    }
}
