//! Editing core: buffer, dirty tracking, debounced preview, view layout,
//! confirmation gate and scroll sync, tied together by [`Session`].

pub mod buffer;
pub mod debounce;
pub mod dirty;
pub mod gate;
pub mod io;
pub mod preview;
pub mod scroll_sync;
pub mod session;
pub mod view;

pub use buffer::{BufferStyle, TextBuffer};
pub use gate::{Decision, GateError, PendingAction};
pub use io::{FileIo, FsIo};
pub use preview::{MarkdownRender, RenderOutcome, RenderedTree};
pub use session::{Notice, NoticeLevel, Outcome, Session, SessionOptions};
pub use view::{Focus, ViewState};
