use crate::config::GatewayConfig;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use elasticsearch::{Elasticsearch, SearchMvtParts};
use log::{error, info};
use serde_json::{Value, json};
use std::sync::Arc;

/// Document fields copied into each tile feature's properties.
const DATA_FIELDS: [&str; 5] = [
    "Complaint Type",
    "Agency Name",
    "Created Date",
    "Closed Date",
    "Resolution Description",
];

/// The fixed `_mvt` request body. Only the z/x/y in the URL vary between
/// tile requests; everything else is pinned to the November 2020 dataset.
pub fn tile_query_body() -> Value {
    json!({
        "exact_bounds": true,
        "extent": 4096,
        "grid_agg": "geotile",
        "grid_precision": 8,
        "grid_type": "grid",
        "size": 10000,
        "track_total_hits": false,
        "query": {
            "bool": {
                "filter": [
                    {
                        "range": {
                            "Created Date": {
                                "format": "strict_date_optional_time",
                                "gte": "2020-11-01T00:00:00Z",
                                "lte": "2020-12-01T00:00:00Z"
                            }
                        }
                    }
                ]
            }
        },
        "fields": DATA_FIELDS,
    })
}

fn http_date_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Upstream status if it carried one and it is a legal HTTP code, 500 otherwise.
fn relay_status(upstream: Option<u16>) -> StatusCode {
    upstream
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn malformed_tile(req: HttpRequest) -> HttpResponse {
    error!("wrong tile request: {}", req.uri());

    HttpResponse::InternalServerError()
        .insert_header(("Content-Type", "text/plain"))
        .body("This does not seems a tile request\r\n")
}

#[actix_web::get("/{zoom}/{x}/{y}")]
pub async fn get_tile(
    path: web::Path<(String, String, String)>,
    elasticclient: web::Data<Arc<Elasticsearch>>,
    config: web::Data<Arc<GatewayConfig>>,
    req: HttpRequest,
) -> HttpResponse {
    let (zoom, x, y) = path.into_inner();

    // The coordinates must be unsigned integers, but are deliberately not
    // range-checked against zoom bounds; Elasticsearch rejects those itself.
    let (zoom, x, y) = match (zoom.parse::<u32>(), x.parse::<u32>(), y.parse::<u32>()) {
        (Ok(zoom), Ok(x), Ok(y)) => (zoom, x, y),
        _ => return malformed_tile(req).await,
    };

    let response = elasticclient
        .search_mvt(SearchMvtParts::IndexFieldZoomXY(
            &[config.index.as_str()],
            config.geom_field.as_str(),
            zoom as i32,
            x as i32,
            y as i32,
        ))
        .body(tile_query_body())
        .send()
        .await;

    match response {
        Ok(response) if response.status_code().is_success() => {
            let status = relay_status(Some(response.status_code().as_u16()));

            let content_type = match response.headers().get("content-type") {
                Some(content_type) => content_type.to_str().unwrap_or_default(),
                None => "application/x-protobuf",
            }
            .to_owned();

            match response.bytes().await {
                Ok(bytes) => {
                    info!("Sending tile {}/{}/{}", zoom, x, y);

                    HttpResponse::build(status)
                        .insert_header(("Content-Disposition", "inline"))
                        .insert_header(("Content-Type", content_type))
                        .insert_header(("Cache-Control", "public, max-age=0"))
                        .insert_header(("Last-Modified", http_date_now()))
                        .body(bytes)
                }
                Err(err) => {
                    error!("could not read tile body for {}: {:?}", req.uri(), err);

                    HttpResponse::build(relay_status(err.status_code().map(|code| code.as_u16())))
                        .finish()
                }
            }
        }
        Ok(response) => {
            // Elasticsearch rejected the query; relay its status and whatever
            // structured detail it produced.
            let status = relay_status(Some(response.status_code().as_u16()));
            let detail = response.json::<Value>().await.ok();

            error!("tile query for {} failed: {:?}", req.uri(), detail);

            match detail {
                Some(detail) => HttpResponse::build(status).body(detail.to_string()),
                None => HttpResponse::build(status).finish(),
            }
        }
        Err(err) => {
            let status = relay_status(err.status_code().map(|code| code.as_u16()));

            error!("tile query for {} failed: {:?}", req.uri(), err);

            HttpResponse::build(status).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_body_tile_parameters() {
        let body = tile_query_body();

        assert_eq!(body["exact_bounds"], json!(true));
        assert_eq!(body["extent"], json!(4096));
        assert_eq!(body["grid_agg"], json!("geotile"));
        assert_eq!(body["grid_precision"], json!(8));
        assert_eq!(body["grid_type"], json!("grid"));
        assert_eq!(body["size"], json!(10000));
        assert_eq!(body["track_total_hits"], json!(false));
    }

    #[test]
    fn test_query_body_date_filter() {
        let body = tile_query_body();

        let filter = &body["query"]["bool"]["filter"];
        assert_eq!(filter.as_array().unwrap().len(), 1);

        let range = &filter[0]["range"]["Created Date"];
        assert_eq!(range["format"], json!("strict_date_optional_time"));
        assert_eq!(range["gte"], json!("2020-11-01T00:00:00Z"));
        assert_eq!(range["lte"], json!("2020-12-01T00:00:00Z"));
    }

    #[test]
    fn test_query_body_returned_fields() {
        let body = tile_query_body();

        assert_eq!(
            body["fields"],
            json!([
                "Complaint Type",
                "Agency Name",
                "Created Date",
                "Closed Date",
                "Resolution Description"
            ])
        );
    }

    #[test]
    fn test_relay_status_keeps_upstream_code() {
        assert_eq!(relay_status(Some(429)), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(relay_status(Some(404)), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_relay_status_defaults_to_500() {
        assert_eq!(relay_status(None), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(relay_status(Some(9999)), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_http_date_is_rfc7231() {
        let date = http_date_now();

        assert!(date.ends_with(" GMT"));
        assert!(
            chrono::NaiveDateTime::parse_from_str(&date, "%a, %d %b %Y %H:%M:%S GMT").is_ok(),
            "not an HTTP-date: {}",
            date
        );
    }
}
