//! The seam between the HTTP surface and the concrete service handles.
//!
//! External collaborators (database, AI client, live-response hub) are
//! constructed once by the application entry point and passed in through
//! this trait; nothing reaches for ambient global state.

use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use services::services::{
    claude_api::ClaudeApiClient, config::Config, live::ResponseBroadcaster,
};

#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    /// Construct the deployment: connect the database, build the AI client
    /// if configured, and set up the live-response hub.
    async fn spawn(config: Config) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    /// AI client, present when an API key is configured.
    fn claude(&self) -> Option<&ClaudeApiClient>;

    fn live(&self) -> &Arc<ResponseBroadcaster>;
}
