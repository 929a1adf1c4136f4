//! Data Transfer Objects for REST request/response serialization.
//!
//! All amounts are serialized as JSON strings of micro-units to prevent
//! precision loss on u128 values. Addresses are `0x`-prefixed hex strings.

pub mod account_dto;
pub mod common_dto;
pub mod membership_dto;
pub mod pool_dto;
pub mod proof_dto;
pub mod settlement_dto;

pub use account_dto::*;
pub use common_dto::*;
pub use membership_dto::*;
pub use pool_dto::*;
pub use proof_dto::*;
pub use settlement_dto::*;
