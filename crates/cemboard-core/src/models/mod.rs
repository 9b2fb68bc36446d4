//! Data models mirrored from the remote API

pub mod cemetery;
pub mod lenient;
pub mod notice;
pub mod print;

pub use cemetery::{CemeteryPayload, CemeteryRecord};
pub use notice::{Notice, NoticeKind, NoticePayload};
pub use print::{PrintPayload, PrintRecord};
