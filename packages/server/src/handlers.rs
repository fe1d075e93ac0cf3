//! HTTP handler functions for the dashboard API.

use actix_web::{HttpResponse, web};
use casewatch_ai::AiError;
use casewatch_analytics::{
    aggregate_by_region, aggregate_by_year, available_regions, available_years, filter,
    sort_most_recent_first, top_with_remainder,
};
use casewatch_analytics_models::FilterSelection;
use casewatch_server_models::{
    ApiAnswer, ApiError, ApiFilters, ApiHealth, ApiMetrics, ApiRecords, AskRequest,
    FilterQueryParams, RecordsQueryParams, RegionQueryParams,
};

use crate::AppState;

/// Label of the row that regions beyond `top` are folded into.
const OTHER_LABEL: &str = "OTHER";

const DEFAULT_RECORDS_LIMIT: usize = 100;
const MAX_RECORDS_LIMIT: usize = 1000;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/filters`
///
/// Returns the years and regions present in the whole dataset, for the
/// filter controls.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiFilters {
        source_id: state.source.id.clone(),
        source_name: state.source.name.clone(),
        record_count: state.dataset.len(),
        years: available_years(&state.dataset),
        regions: available_regions(&state.dataset),
    })
}

/// `GET /api/metrics`
pub async fn metrics(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let selection = match params.selection() {
        Ok(selection) => selection,
        Err(message) => return bad_request(message),
    };

    let filtered = filter(&state.dataset, &selection);
    HttpResponse::Ok().json(ApiMetrics {
        record_count: filtered.len(),
        metrics: casewatch_analytics::metrics(&filtered),
    })
}

/// `GET /api/aggregates/years`
///
/// Case totals per year, ascending. Records without a year are left out.
pub async fn year_aggregates(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let selection = match params.selection() {
        Ok(selection) => selection,
        Err(message) => return bad_request(message),
    };

    HttpResponse::Ok().json(aggregate_by_year(&filter(&state.dataset, &selection)))
}

/// `GET /api/aggregates/regions`
///
/// Case totals per region, largest first. With `top`, regions beyond the
/// first `top` are summed into a trailing `OTHER` row.
pub async fn region_aggregates(
    state: web::Data<AppState>,
    params: web::Query<RegionQueryParams>,
) -> HttpResponse {
    let selection = match params.selection() {
        Ok(selection) => selection,
        Err(message) => return bad_request(message),
    };

    let rows = aggregate_by_region(&filter(&state.dataset, &selection));
    let rows = match params.top {
        Some(top) => top_with_remainder(rows, top, OTHER_LABEL),
        None => rows,
    };

    HttpResponse::Ok().json(rows)
}

/// `GET /api/records`
///
/// Filtered records, most recent first, paged with `limit` and `offset`.
pub async fn records(
    state: web::Data<AppState>,
    params: web::Query<RecordsQueryParams>,
) -> HttpResponse {
    let selection = match params.selection() {
        Ok(selection) => selection,
        Err(message) => return bad_request(message),
    };

    let sorted = sort_most_recent_first(&filter(&state.dataset, &selection));
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECORDS_LIMIT)
        .min(MAX_RECORDS_LIMIT);
    let offset = params.offset.unwrap_or(0);

    HttpResponse::Ok().json(ApiRecords {
        total: sorted.len(),
        offset,
        limit,
        records: sorted.iter().skip(offset).take(limit).cloned().collect(),
    })
}

/// `POST /api/ai/ask`
///
/// Answers a question about the records matching the request's filter.
pub async fn ai_ask(state: web::Data<AppState>, body: web::Json<AskRequest>) -> HttpResponse {
    let Some(provider) = state.provider.as_deref() else {
        return HttpResponse::ServiceUnavailable().json(ApiError::new(
            "AI questions are not configured on this server",
        ));
    };

    let body = body.into_inner();
    // JSON bodies bypass `FilterSelection::new`, so labels arrive raw.
    let selection = FilterSelection::new(body.selection.years, &body.selection.regions);
    let filtered = filter(&state.dataset, &selection);

    match casewatch_ai::ask(provider, &filtered, &state.budget, &body.question).await {
        Ok(outcome) => HttpResponse::Ok().json(ApiAnswer {
            answer: outcome.answer,
            provider: outcome.provider,
            rows_included: outcome.rows_included,
            rows_available: outcome.rows_available,
            truncated: outcome.truncated,
        }),
        Err(e @ (AiError::EmptyQuestion | AiError::EmptyDataset)) => bad_request(e.to_string()),
        Err(e @ AiError::Config { .. }) => {
            log::error!("AI provider misconfigured: {e}");
            HttpResponse::ServiceUnavailable().json(ApiError::new(e.to_string()))
        }
        Err(e) => {
            log::error!("AI request failed: {e}");
            HttpResponse::BadGateway().json(ApiError::new(format!("AI request failed: {e}")))
        }
    }
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(message))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use casewatch_ai::providers::{LlmProvider, LlmResponse, Message, StopReason};
    use casewatch_context::ContextBudget;
    use casewatch_dataset_models::{Dataset, Record};
    use casewatch_source::SourceDefinition;
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use super::*;
    use crate::configure;

    struct FakeProvider {
        reply: Result<String, String>,
    }

    #[async_trait::async_trait]
    impl LlmProvider for FakeProvider {
        fn name(&self) -> String {
            "fake/test".to_string()
        }

        async fn chat(
            &self,
            _system_prompt: &str,
            messages: &[Message],
        ) -> Result<LlmResponse, AiError> {
            assert_eq!(messages.len(), 1);
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    stop_reason: StopReason::EndTurn,
                }),
                Err(message) => Err(AiError::Provider {
                    message: message.clone(),
                }),
            }
        }
    }

    fn record(row: usize, date: Option<&str>, region: &str, count: u64) -> Record {
        Record {
            row,
            event_date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            region: Some(region.to_string()),
            subregion: None,
            description: Some("TRATA DE PERSONAS".to_string()),
            count,
        }
    }

    fn state(provider: Option<Box<dyn LlmProvider>>) -> web::Data<AppState> {
        web::Data::new(AppState {
            dataset: Arc::new(Dataset::new(vec![
                record(0, Some("2019-03-01"), "ANTIOQUIA", 2),
                record(1, Some("2020-06-15"), "VALLE", 3),
                record(2, Some("2020-01-10"), "ANTIOQUIA", 1),
                record(3, None, "BOGOTA", 4),
            ])),
            source: SourceDefinition::from_path("incidents.csv"),
            budget: ContextBudget::default(),
            provider,
        })
    }

    async fn get(state: web::Data<AppState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    async fn post_ask(state: web::Data<AppState>, body: Value) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/ai/ask")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    fn fake(reply: Result<&str, &str>) -> Option<Box<dyn LlmProvider>> {
        Some(Box::new(FakeProvider {
            reply: reply.map(ToString::to_string).map_err(ToString::to_string),
        }))
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let (status, body) = get(state(None), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
    }

    #[actix_web::test]
    async fn filters_list_whole_dataset_options() {
        let (status, body) = get(state(None), "/api/filters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recordCount"], 4);
        assert_eq!(body["years"], json!([2019, 2020]));
        assert_eq!(body["regions"], json!(["ANTIOQUIA", "BOGOTA", "VALLE"]));
    }

    #[actix_web::test]
    async fn metrics_respect_filter() {
        let (status, body) = get(state(None), "/api/metrics?years=2020").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recordCount"], 2);
        assert_eq!(body["totalCount"], 4);
        assert_eq!(body["distinctRegions"], 2);
    }

    #[actix_web::test]
    async fn unfiltered_metrics_include_undated_records() {
        let (_, body) = get(state(None), "/api/metrics").await;
        assert_eq!(body["totalCount"], 10);
    }

    #[actix_web::test]
    async fn invalid_year_is_bad_request() {
        let (status, body) = get(state(None), "/api/metrics?years=20x9").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid year: \"20x9\"");
    }

    #[actix_web::test]
    async fn year_aggregates_skip_undated_records() {
        let (_, body) = get(state(None), "/api/aggregates/years").await;
        assert_eq!(
            body,
            json!([{"key": 2019, "total": 2}, {"key": 2020, "total": 4}])
        );
    }

    #[actix_web::test]
    async fn region_aggregates_fold_into_other() {
        let (_, body) = get(state(None), "/api/aggregates/regions?top=1").await;
        assert_eq!(
            body,
            json!([{"key": "BOGOTA", "total": 4}, {"key": "OTHER", "total": 6}])
        );
    }

    #[actix_web::test]
    async fn region_filter_is_case_insensitive() {
        let (_, body) = get(state(None), "/api/aggregates/regions?regions=valle").await;
        assert_eq!(body, json!([{"key": "VALLE", "total": 3}]));
    }

    #[actix_web::test]
    async fn records_are_newest_first_and_paged() {
        let (_, body) = get(state(None), "/api/records?years=2020&limit=1").await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["limit"], 1);
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
        assert_eq!(body["records"][0]["row"], 1);

        let (_, body) = get(state(None), "/api/records?offset=3&limit=5000").await;
        assert_eq!(body["limit"], MAX_RECORDS_LIMIT);
        assert_eq!(body["records"][0]["row"], 3);
    }

    #[actix_web::test]
    async fn ask_without_provider_is_unavailable() {
        let (status, _) = post_ask(state(None), json!({"question": "How many?"})).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn ask_returns_answer_for_filtered_rows() {
        let (status, body) = post_ask(
            state(fake(Ok("Four cases."))),
            json!({"question": "How many in 2020?", "years": [2020], "regions": ["valle"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Four cases.");
        assert_eq!(body["provider"], "fake/test");
        assert_eq!(body["rowsAvailable"], 1);
        assert_eq!(body["truncated"], false);
    }

    #[actix_web::test]
    async fn blank_question_is_bad_request() {
        let (status, _) = post_ask(state(fake(Ok("unused"))), json!({"question": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn empty_selection_is_bad_request() {
        let (status, body) = post_ask(
            state(fake(Ok("unused"))),
            json!({"question": "Anything?", "years": [1999]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No records match the current selection");
    }

    #[actix_web::test]
    async fn provider_failure_is_bad_gateway() {
        let (status, body) =
            post_ask(state(fake(Err("rate limited"))), json!({"question": "q"})).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("rate limited"));
    }
}
