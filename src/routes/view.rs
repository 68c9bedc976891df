use axum::{
    extract::{Query, State},
    http::header::{self, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::IntoParams;

use crate::analysis::{Column, RawRecord, TableSorter};
use crate::common::AppState;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{session, store};
use crate::views::{DataView, PlotOptions, PlotView, StatView, ViewMode, ViewResponse};

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ViewQuery {
    /// Day to show (YYYY-MM-DD). Missing or invalid means today.
    pub date: Option<String>,
    /// View mode: data, stat, plot or week (default: data)
    #[serde(rename = "type")]
    pub view_type: Option<String>,
    /// Raw table column to sort by (0 = time, 1 = source, 2 = data).
    /// Repeating the current column flips the direction.
    pub sort: Option<i64>,
    /// Source key hidden from the plot. Repeat the parameter to hide
    /// several keys; each value is one whole key. Collected from the raw
    /// query pairs, since repeated keys do not fit a struct field.
    #[serde(skip_deserializing)]
    pub hidden: Vec<String>,
    /// Canvas width in pixels (plot and week)
    pub width: Option<f64>,
    /// Canvas height in pixels (plot and week)
    pub height: Option<f64>,
    /// Output format for the raw table: json (default) or csv
    #[serde(default = "default_format")]
    pub format: String,
}

/// Selected day, falling back to today.
#[must_use]
pub fn resolve_day(date: Option<&str>) -> NaiveDate {
    date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive())
}

fn determine_format(query_format: &str, headers: &HeaderMap) -> String {
    // Query parameter takes precedence
    if query_format != "json" {
        return query_format.to_lowercase();
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
        && accept_str.contains("text/csv")
    {
        return "csv".to_string();
    }

    "json".to_string()
}

/// Every non-empty `hidden` value, in request order.
fn hidden_keys(pairs: &[(String, String)]) -> Vec<&str> {
    pairs
        .iter()
        .filter(|(key, _)| key == "hidden")
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.trim().is_empty())
        .collect()
}

fn plot_options(config: &Config, width: Option<f64>, height: Option<f64>) -> AppResult<PlotOptions> {
    let options = PlotOptions {
        width: width.unwrap_or(config.plot_width),
        height: height.unwrap_or(config.plot_height),
        padding_x: config.plot_padding_x,
        padding_y: config.plot_padding_y,
    };

    if !options.width.is_finite() || options.width <= 2.0 * options.padding_x {
        return Err(AppError::BadRequest(format!(
            "width must be greater than {}",
            2.0 * options.padding_x
        )));
    }
    if !options.height.is_finite() || options.height <= 2.0 * options.padding_y {
        return Err(AppError::BadRequest(format!(
            "height must be greater than {}",
            2.0 * options.padding_y
        )));
    }
    Ok(options)
}

fn build_csv_response(records: Vec<RawRecord>) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Vec<u8>, std::io::Error>>(100);

    tokio::spawn(async move {
        let header = Column::ALL.map(Column::title);
        if tx.send(csv_line(&header)).await.is_err() {
            return;
        }

        for record in &records {
            let row = [record.time.as_str(), record.source.as_str(), record.value.as_str()];
            if tx.send(csv_line(&row)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn csv_line(fields: &[&str]) -> Result<Vec<u8>, std::io::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    writer.into_inner().map_err(|e| e.into_error())
}

/// Render one page view of a day (or the week ending on it)
#[utoipa::path(
    get,
    path = "/api/view",
    params(ViewQuery),
    responses(
        (status = 200, description = "View model for the requested mode", body = ViewResponse),
        (status = 400, description = "Invalid query parameters"),
    ),
    tag = "views"
)]
pub async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let day = resolve_day(query.date.as_deref());
    let mode = ViewMode::from_query(query.view_type.as_deref());
    let session_id = session::session_id(&headers);

    let mut records = match mode {
        ViewMode::Week => store::week_batch(&state.db, day).await?,
        _ => store::day_batch(&state.db, day).await?,
    };

    tracing::debug!(
        mode = ?mode,
        day = %day,
        records = records.len(),
        session = %session_id,
        "view_requested"
    );

    let view = match mode {
        ViewMode::Data => {
            let requested = query
                .sort
                .map(|index| {
                    Column::from_index(index).ok_or_else(|| {
                        AppError::BadRequest(format!("sort column {index} must be 0, 1 or 2"))
                    })
                })
                .transpose()?;

            let mut stored = session::load(&state, &session_id).await;
            let sort = match TableSorter::sort_persisted(&mut records, requested, &mut stored) {
                Ok(sort) => sort,
                Err(e) => {
                    session::reset(&state, &session_id).await;
                    return Err(e.into());
                }
            };
            session::store(&state, &session_id, stored).await;

            if determine_format(&query.format, &headers) == "csv" {
                return Ok(session::attach(build_csv_response(records)?, &session_id));
            }
            ViewResponse::Data(DataView::new(&records, sort))
        }
        ViewMode::Stat => ViewResponse::Stat(StatView::new(&records)),
        ViewMode::Plot | ViewMode::Week => {
            let options = plot_options(&state.config, query.width, query.height)?;
            let hidden = hidden_keys(&pairs);
            let plot = PlotView::build(&records, mode.time_axis(), &hidden, options);
            if mode == ViewMode::Week {
                ViewResponse::Week(plot)
            } else {
                ViewResponse::Plot(plot)
            }
        }
    };

    Ok(session::attach(Json(view).into_response(), &session_id))
}
