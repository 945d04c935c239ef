use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub fn stack() -> ServiceBuilder<
    Stack<RequestBodyLimitLayer, Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>>,
> {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let limit = RequestBodyLimitLayer::new(BODY_LIMIT);

    ServiceBuilder::new().layer(trace).layer(cors).layer(limit)
}
