mod buffer;
mod collect;
mod command;
mod config;
mod input;
mod motion;
mod range;
mod theme;
mod types;
mod vars;

pub use buffer::load;
pub use collect::{CollectError, Fill, LineSource, Pending, ReaderSource};
pub use command::Host;
pub use config::{load_config, Config};
pub use input::handle_key;
pub use theme::Theme;
pub use types::{caret_escape, char_display_width, line_screen_width, App, Mode, TabStyle};
