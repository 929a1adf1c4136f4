//! DTOs for custody balances and the development faucet.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Address, Amount};

/// Response body for account balance endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Account address.
    pub address: String,
    /// Custody balance in micro-units.
    pub balance: String,
    /// Same balance in whole units with six decimals, e.g. `"15.000000"`.
    pub balance_display: String,
}

impl BalanceResponse {
    /// Builds the response for `address` holding `balance`.
    #[must_use]
    pub fn new(address: &Address, balance: Amount) -> Self {
        Self {
            address: address.to_string(),
            balance: balance.to_string(),
            balance_display: balance.to_decimal_string(),
        }
    }
}

/// Request body for `POST /accounts/{address}/deposit`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    /// Amount to credit in micro-units, as a decimal string.
    pub amount: String,
}
