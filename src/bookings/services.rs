use tracing::{error, info};
use uuid::Uuid;

use crate::ai::services::{detect_damage, DamageVerdict};
use crate::error::ApiError;
use crate::pools;
use crate::state::AppState;

use super::repo::{self, Booking};

pub struct CheckInOutcome {
    pub booking: Booking,
    pub damaged: bool,
    pub report: String,
}

/// Booking is damaged if any single image comparison says so; the report
/// is the damaged narratives, separated by blank lines.
pub fn aggregate_verdicts(verdicts: &[DamageVerdict]) -> (bool, String) {
    let damaged = verdicts.iter().any(|v| v.has_damage);
    let report = verdicts
        .iter()
        .filter(|v| v.has_damage)
        .map(|v| v.damage_description.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    (damaged, report)
}

/// Run the check-in: compare every submitted photo against the pool's
/// baseline image, store the evidence and activate the booking.
pub async fn perform_check_in(
    state: &AppState,
    id: Uuid,
    images: Vec<String>,
) -> Result<CheckInOutcome, ApiError> {
    let booking = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    // baseline: первая фотка пула из листинга
    let baseline = pools::repo::find_by_address(&state.db, &booking.pool_address)
        .await?
        .and_then(|p| p.images.into_iter().next());

    let mut handles = Vec::with_capacity(images.len());
    for image in images.iter().cloned() {
        let vision = state.vision.clone();
        let baseline = baseline.clone();
        handles.push(tokio::spawn(async move {
            match baseline {
                Some(before) => detect_damage(vision.as_ref(), &before, &image).await,
                // nothing to compare against; same conservative default
                // the detector itself falls back to
                None => DamageVerdict::clean_default(),
            }
        }));
    }

    let mut verdicts = Vec::with_capacity(handles.len());
    for handle in handles {
        let verdict = handle.await.map_err(|e| {
            error!(error = %e, booking = %id, "damage check task failed");
            ApiError::Upstream("Failed to process check-in".into())
        })?;
        verdicts.push(verdict);
    }

    let (damaged, report) = aggregate_verdicts(&verdicts);
    let stored_report = (!report.is_empty()).then_some(report.as_str());

    let booking = repo::record_check_in(&state.db, id, &images, damaged, stored_report)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    info!(booking = %id, %damaged, images = images.len(), "check-in processed");
    Ok(CheckInOutcome {
        booking,
        damaged,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::services::Severity;

    fn verdict(has_damage: bool, description: &str) -> DamageVerdict {
        DamageVerdict {
            has_damage,
            damage_description: description.to_string(),
            severity: Severity::Minor,
            estimated_cost: 0.0,
        }
    }

    #[test]
    fn damage_flag_is_or_of_image_verdicts() {
        let (damaged, _) = aggregate_verdicts(&[
            verdict(false, "clean"),
            verdict(true, "scratched housing"),
            verdict(false, "clean"),
        ]);
        assert!(damaged);

        let (damaged, report) = aggregate_verdicts(&[verdict(false, "a"), verdict(false, "b")]);
        assert!(!damaged);
        assert!(report.is_empty());
    }

    #[test]
    fn report_joins_only_damaged_narratives() {
        let (_, report) = aggregate_verdicts(&[
            verdict(true, "dent on the left side"),
            verdict(false, "clean"),
            verdict(true, "torn strap"),
        ]);
        assert_eq!(report, "dent on the left side\n\ntorn strap");
    }

    #[test]
    fn empty_verdicts_mean_no_damage() {
        let (damaged, report) = aggregate_verdicts(&[]);
        assert!(!damaged);
        assert!(report.is_empty());
    }
}
