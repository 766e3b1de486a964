pub mod evaluation;
pub mod scoring;
pub mod strategy;
pub mod table;

pub use evaluation::{EvaluationEntry, HiddenParams};
pub use scoring::{GradeOption, Indicator, ScoringForm, SubmissionPayload};
pub use strategy::{ScoringStrategy, StrategyBook, SCENARIO_89, SCENARIO_98};
pub use table::{Cell, TableExtraction, TableRow};
