//! Single-process deployment: SQLite on local disk, AI client straight
//! against the Anthropic API.

use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::Deployment;
use services::services::{
    claude_api::ClaudeApiClient, config::Config, live::ResponseBroadcaster,
};
use tracing::warn;

struct Inner {
    config: Config,
    db: DBService,
    claude: Option<ClaudeApiClient>,
    live: Arc<ResponseBroadcaster>,
}

#[derive(Clone)]
pub struct LocalDeployment {
    inner: Arc<Inner>,
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn spawn(config: Config) -> anyhow::Result<Self> {
        let db = DBService::new(&config.database_url).await?;

        let claude = match &config.anthropic_api_key {
            Some(key) => Some(ClaudeApiClient::new(key.clone(), None)?),
            None => {
                warn!("ANTHROPIC_API_KEY not set; AI endpoints will report unavailable");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                db,
                claude,
                live: Arc::new(ResponseBroadcaster::new()),
            }),
        })
    }

    fn config(&self) -> &Config {
        &self.inner.config
    }

    fn db(&self) -> &DBService {
        &self.inner.db
    }

    fn claude(&self) -> Option<&ClaudeApiClient> {
        self.inner.claude.as_ref()
    }

    fn live(&self) -> &Arc<ResponseBroadcaster> {
        &self.inner.live
    }
}
