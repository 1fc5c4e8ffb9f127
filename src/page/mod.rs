//! Cursor pagination codec: resume tokens, page requests, page metadata.

mod cursor;
mod request;

pub use cursor::{Cursor, Int4Cursor, Int8Cursor, TextCursor};
pub use request::{
    build_offset_page, build_page, OffsetPageRequest, Page, PageInfo, PageRequest, DEFAULT_LIMIT,
    MAX_LIMIT,
};
