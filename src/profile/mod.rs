mod image;
mod name;

use axum::{Router, routing::post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/name", post(name::set_display_name))
        .route("/image", post(image::set_profile_image))
}
