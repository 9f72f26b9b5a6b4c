mod footer;
mod header;
mod toast;

pub use footer::{key_hints, Footer};
pub use header::Header;
pub use toast::{Toast, ToastLevel, ToastManager};
