use std::time::Instant;

use actix_cors::Cors;
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use futures_util::TryStreamExt;
use log::{debug, error, info, warn};

use crate::cache::ModelKind;
use crate::catalog::{Catalog, PlantRecord};
use crate::error::ApiError;
use crate::labels::{argmax, plant_label, Toxicity};
use crate::models::{
    ErrorBody, HealthResponse, LocationsResponse, ModelsResponse, PredictionResponse,
    ToxicityPrediction,
};
use crate::preprocess::preprocess_image;
use crate::state::AppState;

pub const IMAGE_FIELD: &str = "image";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(predict)
        .service(toxic_check)
        .service(plant_details)
        .service(health)
        .service(model_status);
}

/// CORS policy for every route: any origin, GET and POST.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new("endpoint not found"))
}

/// Reads the `image` field of a multipart body, refusing anything above `limit` bytes.
async fn read_image_field(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, ApiError> {
    let invalid = |e: actix_multipart::MultipartError| ApiError::InvalidMultipart(e.to_string());

    while let Some(mut field) = payload.try_next().await.map_err(invalid)? {
        if field.name() != Some(IMAGE_FIELD) {
            while field.try_next().await.map_err(invalid)?.is_some() {}
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(invalid)? {
            if bytes.len() + chunk.len() > limit {
                return Err(ApiError::InvalidMultipart(format!(
                    "field {:?} exceeds {} bytes",
                    IMAGE_FIELD, limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(bytes);
    }

    Err(ApiError::MissingField(IMAGE_FIELD))
}

/// Scores `bytes` with the given model and returns the winning class index.
fn classify(state: &AppState, kind: ModelKind, bytes: &[u8]) -> Result<usize, ApiError> {
    state.models.ensure_loaded();

    let input = preprocess_image(bytes)?;
    let model = state.models.get(kind).map_err(|e| {
        warn!("{} model from {} is not loaded", kind, state.models.path(kind).display());
        e
    })?;
    let scores = model.scores(&input).map_err(ApiError::inference)?;

    argmax(&scores).ok_or_else(|| ApiError::Inference(format!("{} model returned no usable scores", kind)))
}

fn identify_plant(state: &AppState, bytes: &[u8]) -> Result<PlantRecord, ApiError> {
    let class_index = classify(state, ModelKind::Plant, bytes)?;
    let label = plant_label(class_index)
        .ok_or_else(|| ApiError::Inference(format!("plant class {} has no label", class_index)))?;
    debug!("plant model picked class {} ({})", class_index, label);

    let catalog = Catalog::load(&state.details_csv)?;
    match catalog.find(label) {
        Some(record) => Ok(record.clone()),
        None => {
            info!("no plant details for {:?}, answering with placeholder", label);
            Ok(PlantRecord::unknown())
        }
    }
}

#[get("/")]
pub async fn home(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    match NamedFile::open_async(&state.index_page).await {
        Ok(file) => file.into_response(&req),
        Err(e) => {
            error!("cannot open landing page {}: {}", state.index_page.display(), e);
            HttpResponse::InternalServerError().body("landing page unavailable")
        }
    }
}

#[post("/predict")]
pub async fn predict(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let bytes = read_image_field(payload, state.max_upload_bytes).await?;
    info!("plant prediction requested ({} bytes)", bytes.len());

    let shared = state.clone();
    let details = web::block(move || identify_plant(&shared, &bytes)).await??;

    info!(
        "plant prediction: {} in {} ms",
        details.name,
        start_time.elapsed().as_millis()
    );
    Ok(HttpResponse::Ok().json(PredictionResponse::new(details)))
}

#[post("/toxic-check")]
pub async fn toxic_check(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let bytes = read_image_field(payload, state.max_upload_bytes).await?;
    info!("toxicity check requested ({} bytes)", bytes.len());

    let shared = state.clone();
    let class_index = web::block(move || classify(&shared, ModelKind::Toxicity, &bytes)).await??;
    let kind = Toxicity::from_class(class_index);

    info!(
        "toxicity check: {:?} in {} ms",
        kind,
        start_time.elapsed().as_millis()
    );
    Ok(HttpResponse::Ok().json(PredictionResponse::new(ToxicityPrediction { kind })))
}

#[get("/plant-details")]
pub async fn plant_details(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let path = state.details_csv.clone();
    let catalog = web::block(move || Catalog::load(path)).await??;
    let data = catalog.locations();
    debug!("listing {} of {} plant rows", data.len(), catalog.len());

    Ok(HttpResponse::Ok().json(LocationsResponse { data }))
}

#[get("/api/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::ok())
}

#[get("/api/models")]
pub async fn model_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ModelsResponse {
        models: state.models.status(),
    })
}
