use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

/// Terminal handler behind the redirect middleware: answers health probes
/// and 404s everything no rewrite rule claimed.
pub struct FallbackService;

impl Service<Request<Incoming>> for FallbackService {
    type Response = Response<BoxBody<Bytes, Infallible>>;
    type Error = Infallible;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let response = match req.uri().path() {
            "/health" => Response::new(Full::new(Bytes::from("ok\n")).boxed()),
            _ => {
                let mut response = Response::new(Empty::<Bytes>::new().boxed());
                *response.status_mut() = StatusCode::NOT_FOUND;
                response
            }
        };

        Box::pin(async move { Ok(response) })
    }
}
