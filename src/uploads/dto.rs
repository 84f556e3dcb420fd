use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ipfs_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_uses_wire_name() {
        let json = serde_json::to_value(UploadResponse {
            ipfs_url: "https://gateway.pinata.cloud/ipfs/QmX".into(),
        })
        .unwrap();
        assert!(json.get("ipfsUrl").is_some());
        assert!(json.get("ipfs_url").is_none());
    }
}
