use serde::{Deserialize, Serialize};

use super::repo::{Proposal, ProposalKind};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub pool_address: Option<String>,
    pub proposer: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ProposalKind>,
    pub duration_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateProposalResponse {
    pub success: bool,
    pub proposal: Proposal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalsQuery {
    pub pool_address: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProposalsResponse {
    pub proposals: Vec<Proposal>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub voter: Option<String>,
    pub support: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub proposal: Proposal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_type_comes_in_under_the_wire_name() {
        let req: CreateProposalRequest = serde_json::from_str(
            r#"{
                "poolAddress": "0xab",
                "proposer": "0xcd",
                "title": "Replace the tripod",
                "description": "Head is worn out",
                "type": "maintenance"
            }"#,
        )
        .unwrap();
        assert_eq!(req.kind, Some(ProposalKind::Maintenance));
        assert!(req.duration_days.is_none());
    }

    #[test]
    fn vote_request_requires_nothing_at_decode_time() {
        let req: VoteRequest = serde_json::from_str(r#"{"voter":"0xab"}"#).unwrap();
        assert!(req.support.is_none());
    }
}
