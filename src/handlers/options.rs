use axum::Json;
use chrono::Utc;

use crate::dto::OptionsResponse;

pub async fn get_options() -> Json<OptionsResponse> {
    Json(OptionsResponse::new(Utc::now().date_naive()))
}
