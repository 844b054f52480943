pub mod allocate;
pub mod config_cmd;
pub mod onboard;
pub mod plan_input;
pub mod prompt;
pub mod serve;
pub mod syllabus;
