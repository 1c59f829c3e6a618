pub mod code_highlight;
pub mod renderer;

pub use renderer::TerminalRenderer;
