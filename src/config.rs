use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub factory_address: String,
    pub deployer_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinataConfig {
    pub api_url: String,
    pub gateway_url: String,
    pub api_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub chain: ChainConfig,
    pub pinata: PinataConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let chain = ChainConfig {
            rpc_url: std::env::var("RPC_URL")
                .unwrap_or_else(|_| "https://rpc-amoy.polygon.technology".into()),
            chain_id: std::env::var("CHAIN_ID")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(80002),
            factory_address: std::env::var("POOL_FACTORY_ADDRESS")?,
            deployer_key: std::env::var("PRIVATE_KEY")?,
        };

        let pinata = PinataConfig {
            api_url: std::env::var("PINATA_API_URL")
                .unwrap_or_else(|_| "https://api.pinata.cloud".into()),
            gateway_url: std::env::var("PINATA_GATEWAY_URL")
                .unwrap_or_else(|_| "https://gateway.pinata.cloud".into()),
            api_key: std::env::var("PINATA_API_KEY")?,
            secret_key: std::env::var("PINATA_SECRET_KEY")?,
        };

        let gemini = GeminiConfig {
            api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into()),
            api_key: std::env::var("GEMINI_API_KEY")?,
        };

        Ok(Self {
            database_url,
            chain,
            pinata,
            gemini,
        })
    }
}
