//! Router wiring and shared application state.

use std::sync::Arc;

use axum::routing::{delete, get};
use axum::Router;
use dossier_records::{DirectoryCatalog, RecordStore};
use tower_http::trace::TraceLayer;

use crate::api;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub catalog: Arc<DirectoryCatalog>,
    /// Application id; combined with a directory id it names the tenant.
    pub app_id: String,
}

/// Build the router. The static `/{dir}/batch` segment takes priority
/// over the `/{dir}/{id}` capture, so batch deletes never parse as a
/// record id.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(api::records::healthz))
        .route(
            "/:dir",
            get(api::records::list_records).post(api::records::create_record),
        )
        .route("/:dir/batch", delete(api::records::delete_batch))
        .route(
            "/:dir/:id",
            get(api::records::get_record)
                .patch(api::records::patch_record)
                .delete(api::records::delete_record),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
