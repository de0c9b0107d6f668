//! Finance API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::ledger::finance::{FinanceService, FinanceSummary, FinanceWindow};
use crate::utils::time;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// day | month | year | custom (default: day)
    pub range: Option<String>,
    /// YYYY-MM-DD, required for custom
    pub start_date: Option<String>,
    /// YYYY-MM-DD inclusive, required for custom
    pub end_date: Option<String>,
    pub shop_id: Option<String>,
}

/// Resolve the requested range into `[start, end)` millis in the
/// business timezone
fn resolve_window(query: &SummaryQuery, tz: chrono_tz::Tz) -> AppResult<FinanceWindow> {
    let today = time::today(tz);
    let range = query.range.as_deref().unwrap_or("day");

    let (start_date, end_date) = match range {
        "day" => (today, today),
        "month" => (time::month_start(today), today),
        "year" => (time::year_start(today), today),
        "custom" => {
            let (Some(start), Some(end)) = (&query.start_date, &query.end_date) else {
                return Err(AppError::validation(
                    "Custom range requires start_date and end_date",
                ));
            };
            let start = time::parse_date(start)?;
            let end = time::parse_date(end)?;
            if end < start {
                return Err(AppError::validation("end_date is before start_date"));
            }
            (start, end)
        }
        other => {
            return Err(AppError::validation(format!(
                "Unknown range '{}', expected day|month|year|custom",
                other
            )));
        }
    };

    Ok(FinanceWindow {
        start: time::day_start_millis(start_date, tz),
        end: time::day_end_millis(end_date, tz),
    })
}

/// GET /api/finance/summary - 财务汇总
///
/// 收入/支出/净利 + 外部商品独立流 + 客户/供应商挂账 +
/// 与上一个等长窗口的环比变化。
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<FinanceSummary>> {
    let window = resolve_window(&query, state.config.timezone)?;

    tracing::debug!(
        start = window.start,
        end = window.end,
        shop = ?query.shop_id,
        "Computing finance summary"
    );

    let service = FinanceService::new(state.db.clone());
    let summary = service.summary(window, query.shop_id).await?;
    Ok(Json(summary))
}
