use serde::{Deserialize, Serialize};

use super::repo::Pool;

#[derive(Debug, Deserialize)]
pub struct PoolsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub member: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct PoolsResponse {
    pub pools: Vec<Pool>,
}

/// Pool creation payload: creator plus the full item metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    pub creator: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub total_shares: i64,
    pub share_price: f64,
    pub maintenance_pct: i32,
    pub deposit_amount: f64,
    pub max_booking_days: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolResponse {
    pub success: bool,
    pub pool_address: String,
    pub pool_id: String,
    pub metadata_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuySharesRequest {
    pub buyer: Option<String>,
    pub shares: Option<i64>,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BuySharesResponse {
    pub success: bool,
    pub pool: Pool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_shares_request_accepts_partial_body() {
        let req: BuySharesRequest =
            serde_json::from_str(r#"{"buyer":"0xAB","shares":100}"#).unwrap();
        assert_eq!(req.buyer.as_deref(), Some("0xAB"));
        assert_eq!(req.shares, Some(100));
        assert!(req.tx_hash.is_none());
    }

    #[test]
    fn create_pool_request_is_camel_case() {
        let req: CreatePoolRequest = serde_json::from_str(
            r#"{
                "creator": "0xab",
                "title": "Canon EOS R5",
                "description": "Shared camera",
                "category": "electronics",
                "location": "Berlin",
                "images": ["ipfs://img"],
                "totalShares": 1000,
                "sharePrice": 10.0,
                "maintenancePct": 10,
                "depositAmount": 150.0,
                "maxBookingDays": 14
            }"#,
        )
        .unwrap();
        assert_eq!(req.total_shares, 1000);
        assert_eq!(req.max_booking_days, 14);
    }
}
