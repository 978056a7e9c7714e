pub mod editor;
pub mod history;
pub mod keys;
pub mod terminal;

pub use editor::{EditBuffer, LineEditor, RECALL_TOKEN};
pub use history::HistoryStack;
pub use keys::{Key, KeyReader};
pub use terminal::{FdReader, RawMode};
