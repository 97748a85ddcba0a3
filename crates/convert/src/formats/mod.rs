//! Per-format parsers and renderers.

pub mod claude;
pub mod continuedev;
pub mod copilot;
pub mod cursor;
pub mod generic;
pub mod kiro;
pub mod traits;
pub(crate) mod utils;
pub mod windsurf;

pub use claude::{from_claude, to_claude, ClaudeConverter};
pub use continuedev::{from_continue, to_continue, ContinueConverter};
pub use copilot::{from_copilot, to_copilot, CopilotConverter};
pub use cursor::{from_cursor, to_cursor, CursorConverter};
pub use generic::{from_generic, to_generic, GenericConverter};
pub use kiro::{from_kiro, to_kiro, KiroConverter};
pub use traits::{FormatConverter, SectionSupport};
pub use utils::kebab_case;
pub use windsurf::{from_windsurf, to_windsurf, WindsurfConverter};
