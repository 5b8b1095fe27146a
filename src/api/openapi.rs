use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::health::{HealthResponse, ReadinessResponse};
use crate::api::middleware::error_handling::SafeResponsePayload;
use crate::domain::PublicMessage;

/// OpenAPI specification for the service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Error Shield API",
        version = "1.0.0",
        description = "Tax platform API boundary. Every failure is answered with a SafeResponsePayload."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::health::readiness_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadinessResponse,
            SafeResponsePayload,
            PublicMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI route
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_error_schema() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["paths"]["/health"].is_object());
        assert!(json["paths"]["/health/ready"].is_object());
        assert!(json["components"]["schemas"]["SafeResponsePayload"].is_object());
    }
}
