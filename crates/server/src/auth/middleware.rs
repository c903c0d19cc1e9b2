use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, header};
use axum::response::{IntoResponse, Response};
use inkwell_service::UserService;
use tower::{Layer, Service};
use tracing::{debug, warn};

use super::jwt::JwtManager;
use crate::error::ServerError;

/// Cookie carrying the session token for browser clients.
pub const TOKEN_COOKIE: &str = "inkwell_token";

/// Tower layer that adds authentication middleware.
#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtManager>,
    users: Arc<UserService>,
}

impl AuthLayer {
    pub fn new(jwt: Arc<JwtManager>, users: Arc<UserService>) -> Self {
        Self { jwt, users }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt: Arc::clone(&self.jwt),
            users: Arc::clone(&self.users),
        }
    }
}

/// Tower service that authenticates requests and inserts the caller's
/// [`Actor`](inkwell_service::Actor) into the request extensions.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtManager>,
    users: Arc<UserService>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt = Arc::clone(&self.jwt);
        let users = Arc::clone(&self.users);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(token) = bearer_token(&req).or_else(|| cookie_token(&req)) else {
                return Ok(unauthorized("missing authentication credentials"));
            };

            let actor = match jwt.validate_token(&token) {
                Ok(actor) => actor,
                Err(e) => {
                    debug!(error = %e, "token rejected");
                    return Ok(unauthorized(&e));
                }
            };

            match users.is_active(&actor.id).await {
                Ok(true) => {}
                Ok(false) => return Ok(unauthorized("account is not active")),
                Err(e) => {
                    warn!(error = %e, "account lookup failed during authentication");
                    return Ok(ServerError::from(e).into_response());
                }
            }

            req.extensions_mut().insert(actor);
            inner.call(req).await
        })
    }
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(header_str) = auth_header.to_str()
        && let Some(token) = header_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_owned());
    }
    None
}

fn cookie_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

fn unauthorized(message: &str) -> Response {
    ServerError::Unauthorized(message.to_owned()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(header::HeaderName, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/v1/blog/posts");
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_header_is_read() {
        let req = request(&[(header::AUTHORIZATION, "Bearer abc.def")]);
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def"));

        let req = request(&[(header::AUTHORIZATION, "Basic abc")]);
        assert!(bearer_token(&req).is_none());
    }

    #[test]
    fn session_cookie_is_read() {
        let req = request(&[(header::COOKIE, "theme=dark; inkwell_token=abc.def; lang=en")]);
        assert_eq!(cookie_token(&req).as_deref(), Some("abc.def"));

        let req = request(&[(header::COOKIE, "inkwell_token=")]);
        assert!(cookie_token(&req).is_none());
        assert!(cookie_token(&request(&[])).is_none());
    }
}
