pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{get_claude_dir, get_codex_dir};
pub use paths::{
    decode_id, decode_path_id, dir_name_to_project_path, encode_id, format_path_with_tilde,
    project_path_to_dir_name, trim_trailing_slash, validate_decoded_path, workspace_name,
};
pub use terminal::{single_line, strip_ansi_codes};
