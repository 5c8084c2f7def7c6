pub mod board;
pub mod credentials;
pub mod event;
pub mod export;
pub mod form;
pub mod ftp;
pub mod ics;
pub mod server;
pub mod sync;
pub mod templates;

pub use board::{Board, BoardError, DeleteState};
pub use event::Event;
