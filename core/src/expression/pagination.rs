use crate::error::{Result, StrataError};

/// One page window over a result set.
///
/// `num_per_page == 0` means "no limit". The offset is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    num_per_page: u32,
}

/// Bulk-construction data for [`Pagination`].
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationData {
    pub page: Option<u32>,
    pub num_per_page: Option<u32>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            num_per_page: 0,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, num_per_page: u32) -> Result<Self> {
        let mut pagination = Self::default();
        pagination.set_page(page)?;
        pagination.set_num_per_page(num_per_page);
        Ok(pagination)
    }

    pub fn from_data(data: PaginationData) -> Result<Self> {
        let mut pagination = Self::default();
        pagination.apply_data(data)?;
        Ok(pagination)
    }

    pub fn apply_data(&mut self, data: PaginationData) -> Result<&mut Self> {
        if let Some(page) = data.page {
            self.set_page(page)?;
        }
        if let Some(num) = data.num_per_page {
            self.set_num_per_page(num);
        }
        Ok(self)
    }

    pub fn set_page(&mut self, page: u32) -> Result<&mut Self> {
        if page < 1 {
            return Err(StrataError::invalid("page must be 1 or greater"));
        }
        self.page = page;
        Ok(self)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_num_per_page(&mut self, num: u32) -> &mut Self {
        self.num_per_page = num;
        self
    }

    pub fn num_per_page(&self) -> u32 {
        self.num_per_page
    }

    /// Whether a row limit applies at all.
    pub fn has_limit(&self) -> bool {
        self.num_per_page > 0
    }

    /// `(page - 1) * num_per_page`
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.num_per_page as u64
    }
}
