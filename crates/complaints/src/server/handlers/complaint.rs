//! Complaint lookup handler

use axum::{
  extract::{Extension, Path, State},
  response::Json,
};

use crate::server::context::ServiceContext;
use crate::server::metrics::Endpoint;
use crate::server::middleware::RequestContext;
use crate::server::types::{complaint_not_found, ComplaintResponse};

/// GET /complaint/{id} - Date, product, issue, company and narrative of one record
pub async fn get_complaint(
  State(ctx): State<ServiceContext>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<i64>,
) -> Json<ComplaintResponse> {
  match ctx.dataset.get(id) {
    Some(record) => {
      context.log_info(&format!("Found complaint {id}"), "complaint-api").await;
      Json(ComplaintResponse::Found(record.into()))
    }
    None => {
      ctx.metrics.record_error(Endpoint::Complaint);
      context.log_warn(&format!("No complaint with ID {id}"), "complaint-api").await;
      Json(ComplaintResponse::Error { error: complaint_not_found(id) })
    }
  }
}
