//! CLI 層（引数解析と表示）

pub mod args;
pub mod render;

pub use args::{
    parse_args, parse_args_from, print_completion, Command, GlobalOptions, Invocation,
    ParseOutcome, SearchInput,
};
