#![allow(
    dead_code,
    unused_imports,
    unused_variables,
    unused_mut,
    clippy::too_many_arguments,
    clippy::manual_clamp,
    clippy::len_zero,
    clippy::needless_borrows_for_generic_args
)]

pub mod app;
pub mod events;
pub mod forms;
pub mod theme;
pub mod ui;
