use serde_json::json;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::users;

use super::dto::CreatePoolRequest;
use super::repo::{self, NewPool, Pool};

/// Platform cap on pools per creator before an upgrade is required.
pub const MAX_CREATED_POOLS: i32 = 3;

/// Token symbol is the first three characters of the title, uppercased.
pub fn symbol_from_title(title: &str) -> String {
    let symbol: String = title.trim().chars().take(3).collect::<String>().to_uppercase();
    if symbol.is_empty() {
        "POOL".to_string()
    } else {
        symbol
    }
}

/// Fully funded raise for a pool, in the share pricing unit.
pub fn target_raise(total_shares: i64, share_price: f64) -> f64 {
    total_shares as f64 * share_price
}

/// The slice of pool data that is pinned as contract metadata.
pub fn metadata_json(req: &CreatePoolRequest) -> serde_json::Value {
    json!({
        "title": req.title,
        "description": req.description,
        "category": req.category,
        "location": req.location,
        "images": req.images,
    })
}

pub async fn create_pool(
    state: &AppState,
    creator: &str,
    req: &CreatePoolRequest,
) -> Result<(Pool, String), ApiError> {
    let user = users::repo::find_by_address(&state.db, creator)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if user.created_pools >= MAX_CREATED_POOLS {
        warn!(%creator, created = user.created_pools, "pool creation limit reached");
        return Err(ApiError::PoolLimitReached);
    }

    // 1) метаданные в IPFS
    let metadata_uri = state
        .pinner
        .pin_json(&metadata_json(req))
        .await
        .map_err(|e| {
            error!(error = %e, "metadata pin failed");
            ApiError::Upstream("Failed to create pool".into())
        })?;

    // 2) деплой пула on-chain
    let symbol = symbol_from_title(&req.title);
    let deployed = state
        .chain
        .create_pool(
            &req.title,
            &symbol,
            &metadata_uri,
            req.total_shares as u64,
            req.share_price,
            req.maintenance_pct as u32,
        )
        .await
        .map_err(|e| {
            error!(error = %e, "pool deploy failed");
            ApiError::Upstream("Failed to create pool".into())
        })?;
    let address = deployed.to_lowercase();

    // 3) зеркалим в базу и кредитуем создателя
    let pool = repo::insert(
        &state.db,
        NewPool {
            address: &address,
            title: &req.title,
            description: &req.description,
            category: &req.category,
            location: &req.location,
            images: &req.images,
            total_shares: req.total_shares,
            share_price: req.share_price,
            maintenance_pct: req.maintenance_pct,
            deposit_amount: req.deposit_amount,
            max_booking_days: req.max_booking_days,
            creator,
        },
    )
    .await?;

    users::repo::credit_pool_creation(&state.db, creator, &address).await?;

    info!(
        pool = %address,
        %creator,
        target = target_raise(req.total_shares, req.share_price),
        "pool created"
    );
    Ok((pool, metadata_uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_first_three_chars_uppercased() {
        assert_eq!(symbol_from_title("Canon EOS R5"), "CAN");
        assert_eq!(symbol_from_title("eBike"), "EBI");
        assert_eq!(symbol_from_title("go"), "GO");
    }

    #[test]
    fn symbol_falls_back_for_empty_title() {
        assert_eq!(symbol_from_title(""), "POOL");
        assert_eq!(symbol_from_title("   "), "POOL");
    }

    #[test]
    fn target_raise_is_shares_times_price() {
        assert_eq!(target_raise(1000, 10.0), 10_000.0);
        assert_eq!(target_raise(0, 10.0), 0.0);
    }

    #[test]
    fn metadata_carries_listing_fields_only() {
        let req: CreatePoolRequest = serde_json::from_str(
            r#"{
                "creator": "0xab",
                "title": "Kayak",
                "description": "Two-seater",
                "category": "outdoors",
                "location": "Oslo",
                "images": ["ipfs://a"],
                "totalShares": 100,
                "sharePrice": 5.0,
                "maintenancePct": 5,
                "depositAmount": 20.0,
                "maxBookingDays": 7
            }"#,
        )
        .unwrap();

        let metadata = metadata_json(&req);
        assert_eq!(metadata["title"], "Kayak");
        assert_eq!(metadata["images"][0], "ipfs://a");
        assert!(metadata.get("sharePrice").is_none());
        assert!(metadata.get("creator").is_none());
    }
}
