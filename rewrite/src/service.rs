//! Hyper middleware wrapping the rule matcher around a next handler.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::LOCATION;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::metrics_defs::{REDIRECTS_ISSUED, REQUESTS_PASSED};
use crate::rules::{Redirect, RuleSet};

/// Per-request skip predicate. When it returns true the middleware does not
/// attempt any rule matching and hands the request straight to the inner
/// service.
pub type Filter<B> = Arc<dyn Fn(&Request<B>) -> bool + Send + Sync>;

/// Middleware that redirects requests whose path matches a rewrite rule and
/// delegates everything else to the wrapped inner service.
pub struct RedirectService<S, B> {
    rules: Arc<RuleSet>,
    filter: Option<Filter<B>>,
    inner: S,
}

impl<S, B> RedirectService<S, B> {
    pub fn new(rules: Arc<RuleSet>, inner: S) -> Self {
        Self {
            rules,
            filter: None,
            inner,
        }
    }

    /// Installs a skip predicate evaluated before any rule matching
    pub fn with_filter(mut self, filter: Filter<B>) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl<S, B> Service<Request<B>> for RedirectService<S, B>
where
    S: Service<Request<B>, Response = Response<BoxBody<Bytes, Infallible>>>,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, Infallible>>;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        if let Some(filter) = &self.filter
            && filter(&req)
        {
            metrics::counter!(REQUESTS_PASSED.name).increment(1);
            return Box::pin(self.inner.call(req));
        }

        match self.rules.evaluate(req.uri().path()) {
            Some(redirect) => {
                tracing::debug!(
                    path = %req.uri().path(),
                    location = %redirect.location,
                    status = %redirect.status,
                    "Redirecting request"
                );
                metrics::counter!(REDIRECTS_ISSUED.name).increment(1);
                let response = make_redirect_response(&redirect);
                Box::pin(async move { Ok(response) })
            }
            None => {
                metrics::counter!(REQUESTS_PASSED.name).increment(1);
                Box::pin(self.inner.call(req))
            }
        }
    }
}

fn make_redirect_response(redirect: &Redirect) -> Response<BoxBody<Bytes, Infallible>> {
    let built = Response::builder()
        .status(redirect.status)
        .header(LOCATION, redirect.location.as_str())
        .body(empty_body());

    match built {
        Ok(response) => response,
        // A substituted destination can contain bytes that are not legal in
        // a header value; surface that as a server error instead of failing
        // the connection.
        Err(error) => {
            tracing::warn!(location = %redirect.location, %error, "Could not build redirect response");
            let mut response = Response::new(empty_body());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn empty_body() -> BoxBody<Bytes, Infallible> {
    Empty::<Bytes>::new().boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewriteConfig;
    use indexmap::IndexMap;

    /// Inner service standing in for the rest of the pipeline
    struct NextHandler;

    impl Service<Request<()>> for NextHandler {
        type Response = Response<BoxBody<Bytes, Infallible>>;
        type Error = Infallible;
        type Future =
            Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

        fn call(&self, _req: Request<()>) -> Self::Future {
            Box::pin(async {
                Ok(Response::new(
                    http_body_util::Full::new(Bytes::from_static(b"next\n")).boxed(),
                ))
            })
        }
    }

    fn redirect_service(
        rules: &[(&str, &str)],
        status_code: Option<u16>,
    ) -> RedirectService<NextHandler, ()> {
        let config = RewriteConfig {
            rules: rules
                .iter()
                .map(|(pattern, destination)| (pattern.to_string(), destination.to_string()))
                .collect::<IndexMap<_, _>>(),
            status_code,
        };
        let rules = Arc::new(RuleSet::from_config(&config).expect("compile rules"));
        RedirectService::new(rules, NextHandler)
    }

    async fn body_bytes(response: Response<BoxBody<Bytes, Infallible>>) -> Bytes {
        response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes()
    }

    #[tokio::test]
    async fn test_matching_request_is_redirected() {
        let service = redirect_service(&[("/api/*", "/$1")], None);

        let req = Request::builder().uri("/api/widgets").body(()).unwrap();
        let response = service.call(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/widgets");
    }

    #[tokio::test]
    async fn test_custom_status_is_honored() {
        let service = redirect_service(&[("/old", "/new")], Some(301));

        let req = Request::builder().uri("/old").body(()).unwrap();
        let response = service.call(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/new");
    }

    #[tokio::test]
    async fn test_unencodable_location_yields_server_error() {
        // A captured value can smuggle bytes that are illegal in a header
        // value into the destination; the middleware must answer 500, not
        // panic or fail the connection.
        let service = redirect_service(&[("/old", "/new\nx")], None);

        let req = Request::builder().uri("/old").body(()).unwrap();
        let response = service.call(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_unmatched_request_reaches_inner_service() {
        let service = redirect_service(&[("/api/*", "/$1")], None);

        let req = Request::builder().uri("/other").body(()).unwrap();
        let response = service.call(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await.as_ref(), b"next\n");
    }

    #[tokio::test]
    async fn test_filter_skips_matching_request() {
        let filter: Filter<()> = Arc::new(|req| req.headers().contains_key("x-no-rewrite"));
        let service = redirect_service(&[("/api/*", "/$1")], None).with_filter(filter);

        let skipped = Request::builder()
            .uri("/api/widgets")
            .header("x-no-rewrite", "1")
            .body(())
            .unwrap();
        let response = service.call(skipped).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await.as_ref(), b"next\n");

        // Without the header the same path still redirects
        let req = Request::builder().uri("/api/widgets").body(()).unwrap();
        let response = service.call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }
}
