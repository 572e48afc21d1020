//! Interactive batch-edit session: episode list with live preview, rule list editor, apply and undo.

mod app;
mod app_logic;
mod events;
mod models;
pub mod param_input;
mod processing;
mod rendering;
mod utils;

pub use app::App;
pub use events::run_tui;
pub use models::{Focus, InputMode, SessionStats};
pub use rendering::ui;
