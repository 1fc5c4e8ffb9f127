//! HTTP boundary types: listing query parameters and the list response
//! envelope. Handlers stay thin; validation lives in the page module and the
//! stores.

use crate::error::Error;
use crate::page::{OffsetPageRequest, Page, PageInfo, PageRequest};
use serde::{Deserialize, Serialize};

/// Raw listing query parameters as they arrive on the wire. Everything is
/// text until `page()` or `offset_page()` validates it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
    pub offset: Option<String>,
    pub order: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Result<PageRequest, Error> {
        PageRequest::parse(self.limit.as_deref(), self.cursor.as_deref())
    }

    /// The numeric-offset flavor used by integer-keyed listings.
    pub fn offset_page(&self) -> Result<OffsetPageRequest, Error> {
        OffsetPageRequest::parse(self.limit.as_deref(), self.offset.as_deref())
    }

    pub fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }
}

/// List response envelope: the rows plus the page descriptor.
#[derive(Clone, Debug, Serialize)]
pub struct ListBody<T> {
    pub data: Vec<T>,
    pub page: PageInfo,
}

impl<T> From<Page<T>> for ListBody<T> {
    fn from(page: Page<T>) -> Self {
        ListBody {
            data: page.items,
            page: page.info,
        }
    }
}
