//! Configuration model tests: evaluation, user values and `.config` I/O.

pub mod tests_dotconfig;
pub mod tests_evaluation;
