use actix_web::{
    http::StatusCode, middleware, web, App, HttpResponse, HttpServer, ResponseError,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    config::Config,
    error::{GenChatError, Result},
    gemini::{GeminiClient, ImageClient, TextClient},
    handler::{ImageService, TextService},
    models::{ImageGenerationRequest, TextGenerationRequest},
    storage::SupabaseStore,
};

pub struct AppState {
    pub images: ImageService,
    pub texts: TextService,
}

impl AppState {
    pub fn new(images: ImageService, texts: TextService) -> Self {
        Self { images, texts }
    }

    /// Wires the Gemini and Supabase clients described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let gemini = GeminiClient::new(&config.gemini)?;
        let store = SupabaseStore::new(config.storage.clone())?;

        let images = ImageService::new(
            Arc::new(gemini.image().clone()),
            Arc::new(store),
            &config.gemini.image_model,
        )
        .with_deadline(config.generation_timeout());
        let texts = TextService::new(Arc::new(gemini.text().clone()), &config.gemini.text_model);

        Ok(Self::new(images, texts))
    }
}

impl ResponseError for GenChatError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(json!({
            "message": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

async fn generate_image(
    state: web::Data<AppState>,
    body: web::Json<ImageGenerationRequest>,
) -> std::result::Result<HttpResponse, GenChatError> {
    let response = state.images.generate(body.into_inner()).await?;
    log::info!("Image generation result: {:?}", response);
    Ok(HttpResponse::Ok().json(response))
}

async fn generate_text(
    state: web::Data<AppState>,
    body: web::Json<TextGenerationRequest>,
) -> std::result::Result<HttpResponse, GenChatError> {
    let response = state.texts.generate(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn list_models() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "text": TextClient::supported_models(),
        "image": ImageClient::supported_models(),
    }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Registers routes and the JSON extractor config on an `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        GenChatError::ValidationError(format!("Invalid request body: {}", err)).into()
    });

    cfg.app_data(json_config)
        .route("/generate-image", web::post().to(generate_image))
        .route("/generate-text", web::post().to(generate_text))
        .route("/models", web::get().to(list_models))
        .route("/health", web::get().to(health));
}

pub async fn run(config: Config, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);
    let bind = (config.host.clone(), config.port_or_default());

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
