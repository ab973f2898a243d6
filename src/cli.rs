use clap::Parser;

use crate::xwin::WindowConfig;

#[derive(Parser)]
#[command(name = "xlaunch", about = "Minimal X11 launcher window")]
pub struct Cli {
    /// X11 display to connect to (defaults to $DISPLAY)
    #[arg(long)]
    pub display: Option<String>,

    /// Window title
    #[arg(long, default_value = "X11 Launcher")]
    pub title: String,

    /// Window width in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u16).range(1..))]
    pub width: u16,

    /// Window height in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u16).range(1..))]
    pub height: u16,

    /// Requested X position (0 lets the window manager center it)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub x: i16,

    /// Requested Y position (0 lets the window manager center it)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub y: i16,

    /// Border width in pixels
    #[arg(long, default_value_t = 1)]
    pub border_width: u16,
}

impl Cli {
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            width: self.width,
            height: self.height,
            x: self.x,
            y: self.y,
            border_width: self.border_width,
        }
    }
}
