// --- File: crates/services/bacs_checkout_backend/src/lib.rs ---
pub mod app_state;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

pub use app_state::AppState;

/// Directory served when `[static_files]` is not configured.
pub const DEFAULT_STATIC_DIR: &str = "client";

/// Builds the complete application router.
///
/// Stripe endpoints sit at the root, next to the static pages that call them.
/// Anything no route matches is looked up in the static directory.
pub fn build_router(state: &AppState) -> Router {
    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut app = Router::new();

    #[cfg(feature = "stripe")]
    {
        if let Some(stripe_state) = state.stripe.clone() {
            app = app.merge(bacs_checkout_stripe::routes(stripe_state));
        }
    }

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use bacs_checkout_stripe::doc::StripeApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Bacs Checkout API",
                version = "0.1.0",
                description = "Collect Bacs Direct Debit mandates with Stripe Checkout",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            servers( (url = "/", description = "Service root")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(StripeApiDoc::openapi());
        info!("📖 Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let static_dir = state
        .config
        .static_files
        .as_ref()
        .map(|s| s.dir.clone())
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());
    info!("Serving static files from {}", static_dir);

    app.fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
