//! Shared DTO types and parsing helpers used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Address, Amount};
use crate::error::LedgerError;

/// Request body carrying only the acting address.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CallerRequest {
    /// `0x`-prefixed 20-byte hex address of the caller.
    pub caller: String,
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Returns the requested page of `items` with its metadata.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(params.per_page);
        let skip = params.page.saturating_sub(1).saturating_mul(params.per_page) as usize;
        let data = items
            .into_iter()
            .skip(skip)
            .take(params.per_page as usize)
            .collect();
        (
            data,
            PaginationMeta {
                page: params.page,
                per_page: params.per_page,
                total,
                total_pages,
            },
        )
    }
}

/// Parses a `0x`-prefixed address field.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAddress`] naming the offending field.
pub fn parse_address(field: &str, raw: &str) -> Result<Address, LedgerError> {
    raw.parse()
        .map_err(|e| LedgerError::InvalidAddress(format!("{field}: {e}")))
}

/// Parses a decimal micro-unit amount field.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidRequest`] naming the offending field.
pub fn parse_amount(field: &str, raw: &str) -> Result<Amount, LedgerError> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::InvalidRequest(format!("invalid {field}: {raw}")))
}
