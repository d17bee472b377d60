use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{error::Error, group::Group};

/// State shared by the front-end handlers
pub struct ApiState {
    group: Arc<Group>,
}

impl ApiState {
    pub fn new(group: Arc<Group>) -> Self {
        Self { group }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct GetKeyQueryParams {
    pub key: String,
}

pub async fn get_key(
    data: web::Data<ApiState>,
    query_params: web::Query<GetKeyQueryParams>,
) -> Result<HttpResponse, Error> {
    let view = data.group.get(&query_params.key).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(view.bytes()))
}
