mod app;
mod page;

pub use app::{AppState, LastRun, ProgressView, router};
pub use page::Status;
