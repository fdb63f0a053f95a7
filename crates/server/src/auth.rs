use axum::{extract::FromRequestParts, http::request::Parts};

/// Identity supplied by the auth boundary: a user id, or none. The core
/// uses it only to scope which forms are listed and editable.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .filter(|id| !id.is_empty());
        Ok(Self(user))
    }
}
