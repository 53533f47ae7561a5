//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_check_failure, format_check_outcome, format_monitor_detail_text, format_monitor_json,
    format_monitor_list_json, format_monitor_list_text,
};
pub use route::RunContext;
