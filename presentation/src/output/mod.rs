//! Output formatting for evaluation results

pub mod console;
