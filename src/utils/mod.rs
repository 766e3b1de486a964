pub mod logging;
pub mod prompt;

pub use logging::{truncate_text, LogHandle};
