pub mod evaluation_ctx;
pub mod evaluation_flow;

pub use evaluation_ctx::EvaluationCtx;
pub use evaluation_flow::{EvaluationFlow, FlowResult};
