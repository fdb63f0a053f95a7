use axum::Router;

use crate::DeploymentImpl;

pub mod ai;
pub mod forms;
pub mod health;
pub mod responses;
pub mod results;

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(health::router(deployment))
            .merge(forms::router(deployment))
            .merge(responses::router(deployment))
            .merge(results::router(deployment))
            .merge(ai::router(deployment)),
    )
}
