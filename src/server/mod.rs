mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{delete, get, post, put},
    Router,
};

use crate::api::API;
use crate::error::{io_error, Error};
use crate::server::handlers::{holidays, pricing, quotes, vehicles};

type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router<T: API + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route("/quotes", post(quotes::create))
        .route("/quotes/compare", post(quotes::compare))
        .route("/quotes/compare_with_base", post(quotes::compare_with_base))
        .route("/quotes/routes", post(quotes::estimate_routes))
        .route("/surge", get(pricing::surge))
        .route("/vehicles", get(vehicles::list))
        .route("/vehicles/:id", get(vehicles::find).patch(vehicles::update))
        .route("/vehicles/:id/savings", get(vehicles::savings))
        .route("/vehicles/:id/estimate", get(vehicles::estimate))
        .route("/vehicles/:id/rounding_impact", get(vehicles::rounding_impact))
        .route(
            "/vehicles/:id/capacity/:passengers",
            get(vehicles::check_capacity),
        )
        .route("/capacity/:passengers", get(vehicles::for_capacity))
        .route("/holidays", get(holidays::list).post(holidays::create))
        .route("/holidays/:date", delete(holidays::delete))
        .route("/pricing/rounding", put(pricing::set_rounding))
        .route("/pricing/cancellation_fee", get(pricing::cancellation_fee))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(io_error)
}
