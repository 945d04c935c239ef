mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod availability;
    pub mod grid;
    pub mod health;
    pub mod session;
}

use axum::{
    routing::{delete, get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const ENV_PORT: &str = "SLOTWISE__SERVER__PORT";

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::availability::resolve_handler,
            routes::availability::grid_handler,
            routes::grid::build_handler,
            routes::session::snapshot,
            routes::session::select,
            routes::session::stage,
            routes::session::unstage,
            routes::session::finalize,
            routes::session::reset,
        ),
        components(schemas(
            types::DayId, types::PeriodId, types::TeacherId, types::CourseId, types::GroupId,
            types::RequirementId, types::PlacementId, types::ScheduleId,
            types::ConstraintLevel, types::ConstraintSource, types::TimeSlotKey,
            types::ConstraintBucket, types::AvailabilityConstraintSet, types::OverrideLayer,
            types::TeacherAvailability, types::EffectiveConstraint,
            types::Day, types::Period, types::CandidateSlot, types::StagedPlacement,
            types::FinalizeSummary, types::SlotQuality, types::Requirement, types::ClassType,
            sched_core::grid::CellDescriptor, sched_core::grid::AvailabilityCell,
            sched_core::quality::QualityCounts,
            staging::Phase, staging::SelectOutcome, staging::StagingSnapshot,
            routes::health::Health,
            routes::availability::ResolveIn,
            routes::availability::ResolvedEntry,
            routes::availability::AvailabilityGridIn,
            routes::grid::GridIn,
            routes::session::SelectIn,
            routes::session::StageIn,
            routes::session::FinalizeIn
        )),
        tags(
            (name = "slotwise", description = "Availability resolution and schedule staging API")
        )
    )]
struct ApiDoc;

fn router(app_state: state::AppState) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route(
            "/v1/availability/resolve",
            post(routes::availability::resolve_handler),
        )
        .route(
            "/v1/availability/grid",
            post(routes::availability::grid_handler),
        )
        .route("/v1/grid", post(routes::grid::build_handler))
        .route("/v1/session", get(routes::session::snapshot))
        .route("/v1/session/select", post(routes::session::select))
        .route("/v1/session/stage", post(routes::session::stage))
        .route(
            "/v1/session/placements/:id",
            delete(routes::session::unstage),
        )
        .route("/v1/session/finalize", post(routes::session::finalize))
        .route("/v1/session/reset", post(routes::session::reset))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let app_state = state::AppState::from_env()?;
    let app = router(app_state);

    let port = std::env::var(ENV_PORT).unwrap_or_else(|_| "8080".into());
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
