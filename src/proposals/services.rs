use time::{Duration, OffsetDateTime};

use super::repo::ProposalStatus;

/// Voting window applied when the proposer does not pick one.
pub const DEFAULT_VOTING_PERIOD_DAYS: i64 = 7;

pub fn voting_deadline(now: OffsetDateTime, duration_days: Option<i64>) -> OffsetDateTime {
    now + Duration::days(duration_days.unwrap_or(DEFAULT_VOTING_PERIOD_DAYS))
}

/// Strict majority passes; a tie loses.
pub fn resolved_status(votes_for: i32, votes_against: i32) -> ProposalStatus {
    if votes_for > votes_against {
        ProposalStatus::Passed
    } else {
        ProposalStatus::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_defaults_to_seven_days() {
        let now = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(voting_deadline(now, None), now + Duration::days(7));
    }

    #[test]
    fn deadline_honors_explicit_duration() {
        let now = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(voting_deadline(now, Some(3)), now + Duration::days(3));
    }

    #[test]
    fn strict_majority_passes() {
        assert_eq!(resolved_status(3, 2), ProposalStatus::Passed);
        assert_eq!(resolved_status(1, 0), ProposalStatus::Passed);
    }

    #[test]
    fn tie_resolves_to_rejected() {
        assert_eq!(resolved_status(0, 0), ProposalStatus::Rejected);
        assert_eq!(resolved_status(2, 2), ProposalStatus::Rejected);
        assert_eq!(resolved_status(1, 4), ProposalStatus::Rejected);
    }
}
