//! 打分策略
//!
//! 策略就是一串按指标顺序排列的等级名。内置两套预设，
//! 也可以从 TOML 文件追加或覆盖。

use crate::error::{AppResult, ConfigError, StrategyError};
use phf::phf_map;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// 最高得分（98.98 分）
pub const SCENARIO_98: &str = "scenario_98";
/// 90 分以下最高分（89.99 分）
pub const SCENARIO_89: &str = "scenario_89";

static PRESETS: phf::Map<&'static str, (&'static str, [&'static str; 10])> = phf_map! {
    "scenario_98" => (
        "最高得分（98.98分）",
        ["优", "优", "优", "优", "优", "优", "优", "良", "优", "优"],
    ),
    "scenario_89" => (
        "90分以下最高分（89.99分）",
        ["优", "优", "优", "优", "优", "优", "良", "及格", "中", "良"],
    ),
};

/// 打分策略
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoringStrategy {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub grades: Vec<String>,
}

impl ScoringStrategy {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        grades: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            grades,
        }
    }

    /// 取内置预设
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS.get(name).map(|(description, grades)| {
            Self::new(
                name,
                *description,
                grades.iter().map(|g| g.to_string()).collect(),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    strategy: Vec<ScoringStrategy>,
}

/// 策略集合
#[derive(Debug, Clone)]
pub struct StrategyBook {
    strategies: Vec<ScoringStrategy>,
}

impl Default for StrategyBook {
    fn default() -> Self {
        Self::presets()
    }
}

impl StrategyBook {
    /// 只包含内置预设
    pub fn presets() -> Self {
        let mut strategies: Vec<ScoringStrategy> = PRESETS
            .keys()
            .filter_map(|name| ScoringStrategy::preset(name))
            .collect();
        strategies.sort_by(|a, b| b.name.cmp(&a.name));
        Self { strategies }
    }

    /// 内置预设 + 文件中的策略（同名覆盖）
    pub fn with_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut book = Self::presets();
        let count = book.merge_toml(&content).map_err(|source| {
            ConfigError::StrategyFileParseFailed {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!("从 {} 加载了 {} 个打分策略", path.display(), count);
        Ok(book)
    }

    /// 合并 TOML 文本中的策略，返回合并的数量
    pub fn merge_toml(&mut self, content: &str) -> Result<usize, toml::de::Error> {
        let file: StrategyFile = toml::from_str(content)?;
        let count = file.strategy.len();
        for strategy in file.strategy {
            self.insert(strategy);
        }
        Ok(count)
    }

    pub fn insert(&mut self, strategy: ScoringStrategy) {
        debug!("注册打分策略 {} ({} 个等级)", strategy.name, strategy.len());
        match self.strategies.iter_mut().find(|s| s.name == strategy.name) {
            Some(existing) => *existing = strategy,
            None => self.strategies.push(strategy),
        }
    }

    /// 按名称取策略
    pub fn get(&self, name: &str) -> AppResult<&ScoringStrategy> {
        self.strategies
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| {
                StrategyError::Unknown {
                    name: name.to_string(),
                    available: self.names(),
                }
                .into()
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name.clone()).collect()
    }
}
