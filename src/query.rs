//!
//! Shared list-query pipeline
//! --------------------------
//! Every list endpoint (products, orders, payment history) funnels through the
//! same transformation over its in-memory collection, in fixed stage order:
//!
//! 1. free-text search over collection-chosen string fields,
//! 2. exact-match field filters,
//! 3. inclusive date-range filter over the collection's date field,
//! 4. stable sort keyed by an explicit per-collection sort-key table,
//! 5. pagination with pre-slice totals.
//!
//! Stage order matters: search/filter output feeds the sort, the sort output
//! feeds the page slice. The input collection is never mutated.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Raw query-string parameters as they arrive on a list endpoint. Everything
/// is optional and string-typed; `QueryRequest::from_params` does the parsing
/// and validation so a bad `page=0` becomes a 400 rather than a silent default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    fn filter_value(&self, field: &str) -> Option<&String> {
        let v = match field {
            "status" => self.status.as_ref(),
            "category" => self.category.as_ref(),
            _ => None,
        };
        v.filter(|s| !s.is_empty())
    }
}

/// A validated list query, ready for the pipeline. Constructed per request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// 1-based page number.
    pub page: usize,
    /// Page size; always >= 1 (the constructor rejects anything else).
    pub limit: usize,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl QueryRequest {
    /// Build a request from raw parameters. `filter_fields` names the
    /// exact-match fields this collection honors; anything else on the query
    /// string is ignored, matching the per-route behavior of the API.
    pub fn from_params(params: &ListParams, filter_fields: &[&str], default_sort: &str) -> AppResult<Self> {
        let page = parse_positive(params.page.as_deref(), 1, "page")?;
        let limit = parse_positive(params.limit.as_deref(), 10, "limit")?;

        let mut filters = Vec::new();
        for field in filter_fields {
            if let Some(value) = params.filter_value(field) {
                filters.push(((*field).to_string(), value.clone()));
            }
        }

        let date_from = params.date_from.as_deref().filter(|s| !s.is_empty()).map(parse_date).transpose()?;
        let date_to = params.date_to.as_deref().filter(|s| !s.is_empty()).map(parse_date).transpose()?;

        let sort_by = params
            .sort_by
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(default_sort)
            .to_string();
        // Absent means newest-first; any explicit value other than "desc" sorts ascending.
        let sort_order = match params.sort_order.as_deref() {
            None | Some("desc") => SortOrder::Desc,
            Some(_) => SortOrder::Asc,
        };

        Ok(QueryRequest {
            page,
            limit,
            search: params.search.clone().filter(|s| !s.is_empty()),
            filters,
            date_from,
            date_to,
            sort_by,
            sort_order,
        })
    }
}

fn parse_positive(raw: Option<&str>, default: usize, name: &str) -> AppResult<usize> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else { return Ok(default) };
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::user(
            format!("bad_{name}"),
            format!("{name} must be a positive integer"),
        )),
    }
}

/// Parse a date-range bound: RFC 3339 first, then a bare `YYYY-MM-DD`
/// interpreted as midnight UTC.
pub fn parse_date(raw: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = raw.parse::<NaiveDate>() {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(AppError::user("bad_date", format!("unparseable date: {raw}")))
}

/// Sort key for a single record/field pair. The comparator kind is chosen by
/// the collection up front rather than sniffed from the value at runtime;
/// keys of different kinds compare equal so the prior stable order survives.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Int(i64),
    Time(DateTime<Utc>),
    Text(String),
}

fn cmp_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Int(x), SortKey::Int(y)) => x.cmp(y),
        (SortKey::Time(x), SortKey::Time(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Per-collection accessors driving the pipeline. Plain function pointers so
/// each collection module can expose a `query_spec()` constant-like value.
pub struct CollectionSpec<T> {
    /// Fields searched by the free-text stage (case-insensitive substring).
    pub search_text: fn(&T) -> Vec<String>,
    /// Exact-match filter lookup by field name.
    pub field: fn(&T, &str) -> Option<String>,
    /// Sort-key table; `None` for unsortable/unknown fields.
    pub sort_key: fn(&T, &str) -> Option<SortKey>,
    /// The designated date field for range filtering.
    pub date_field: fn(&T) -> Option<DateTime<Utc>>,
}

/// One page of results plus pre-pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub data: Vec<T>,
    /// Match count after search/filter stages, before the page slice.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Run the pipeline. Assumes `req.limit >= 1` (enforced by the constructor).
pub fn run<T: Clone>(records: &[T], req: &QueryRequest, spec: &CollectionSpec<T>) -> QueryResult<T> {
    let mut kept: Vec<&T> = records.iter().collect();

    if let Some(term) = req.search.as_deref() {
        let needle = term.to_lowercase();
        kept.retain(|r| (spec.search_text)(r).iter().any(|f| f.to_lowercase().contains(&needle)));
    }

    for (field, want) in &req.filters {
        kept.retain(|r| (spec.field)(r, field).as_deref() == Some(want.as_str()));
    }

    if req.date_from.is_some() || req.date_to.is_some() {
        kept.retain(|r| match (spec.date_field)(r) {
            Some(d) => {
                req.date_from.map_or(true, |from| d >= from) && req.date_to.map_or(true, |to| d <= to)
            }
            None => false,
        });
    }

    // Stable sort: ties (and unsortable fields) preserve the prior order.
    // Descending reverses the comparison, not the slice.
    kept.sort_by(|a, b| {
        let ord = match ((spec.sort_key)(a, &req.sort_by), (spec.sort_key)(b, &req.sort_by)) {
            (Some(x), Some(y)) => cmp_keys(&x, &y),
            _ => Ordering::Equal,
        };
        match req.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let total = kept.len();
    // Saturating arithmetic: an absurdly large page must land on an empty
    // slice, not overflow the offset.
    let offset = req.page.saturating_sub(1).saturating_mul(req.limit);
    let data: Vec<T> = kept.into_iter().skip(offset).take(req.limit).cloned().collect();
    QueryResult {
        data,
        total,
        page: req.page,
        limit: req.limit,
        total_pages: total.div_ceil(req.limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec {
        id: &'static str,
        name: &'static str,
        status: &'static str,
        total: i64,
        at: DateTime<Utc>,
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn spec() -> CollectionSpec<Rec> {
        CollectionSpec {
            search_text: |r| vec![r.id.to_string(), r.name.to_string()],
            field: |r, f| match f {
                "status" => Some(r.status.to_string()),
                _ => None,
            },
            sort_key: |r, f| match f {
                "total" => Some(SortKey::Int(r.total)),
                "createdAt" => Some(SortKey::Time(r.at)),
                "name" => Some(SortKey::Text(r.name.to_string())),
                _ => None,
            },
            date_field: |r| Some(r.at),
        }
    }

    fn sample() -> Vec<Rec> {
        vec![
            Rec { id: "ORD-1", name: "Chanel No. 5", status: "pending", total: 3_000_000, at: day(1) },
            Rec { id: "ORD-2", name: "Dior Sauvage", status: "pending", total: 1_800_000, at: day(2) },
            Rec { id: "ORD-3", name: "Tom Ford Black Orchid", status: "pending", total: 3_200_000, at: day(3) },
        ]
    }

    fn req(params: ListParams) -> QueryRequest {
        QueryRequest::from_params(&params, &["status"], "createdAt").unwrap()
    }

    #[test]
    fn sort_by_total_desc_pages_correctly() {
        let recs = sample();
        let q = req(ListParams {
            sort_by: Some("total".into()),
            sort_order: Some("desc".into()),
            limit: Some("2".into()),
            ..Default::default()
        });
        let out = run(&recs, &q, &spec());
        assert_eq!(out.data.iter().map(|r| r.total).collect::<Vec<_>>(), vec![3_200_000, 3_000_000]);
        assert_eq!(out.total, 3);
        assert_eq!(out.total_pages, 2);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let recs = sample();
        let q = req(ListParams { search: Some("chanel".into()), ..Default::default() });
        let out = run(&recs, &q, &spec());
        assert_eq!(out.data.len(), 1);
        assert_eq!(out.data[0].name, "Chanel No. 5");
    }

    #[test]
    fn pipeline_is_idempotent() {
        let recs = sample();
        let q = req(ListParams {
            search: Some("o".into()),
            sort_by: Some("total".into()),
            ..Default::default()
        });
        let first = run(&recs, &q, &spec());
        let second = run(&recs, &q, &spec());
        assert_eq!(first, second);
    }

    #[test]
    fn concatenated_pages_reproduce_the_full_result() {
        let mut recs = sample();
        for i in 0..7 {
            recs.push(Rec { id: "ORD-X", name: "Extra", status: "shipped", total: i * 100, at: day(4) });
        }
        let full = run(
            &recs,
            &req(ListParams { limit: Some(recs.len().to_string()), sort_by: Some("total".into()), ..Default::default() }),
            &spec(),
        );
        let limit = 3;
        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let out = run(
                &recs,
                &req(ListParams {
                    page: Some(page.to_string()),
                    limit: Some(limit.to_string()),
                    sort_by: Some("total".into()),
                    ..Default::default()
                }),
                &spec(),
            );
            assert!(out.data.len() <= limit);
            collected.extend(out.data);
            if page >= out.total_pages {
                break;
            }
            page += 1;
        }
        assert_eq!(collected, full.data);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let recs = sample();
        let q = req(ListParams {
            date_from: Some("2024-01-02".into()),
            date_to: Some("2024-01-03".into()),
            ..Default::default()
        });
        let out = run(&recs, &q, &spec());
        assert_eq!(out.data.iter().map(|r| r.id).collect::<Vec<_>>(), vec!["ORD-3", "ORD-2"]);

        let open_ended = req(ListParams { date_from: Some("2024-01-03".into()), ..Default::default() });
        assert_eq!(run(&recs, &open_ended, &spec()).total, 1);
    }

    #[test]
    fn status_filter_is_exact_match() {
        let mut recs = sample();
        recs.push(Rec { id: "ORD-4", name: "Extra", status: "shipped", total: 10, at: day(4) });
        let q = req(ListParams { status: Some("shipped".into()), ..Default::default() });
        let out = run(&recs, &q, &spec());
        assert_eq!(out.total, 1);
        assert_eq!(out.data[0].id, "ORD-4");
    }

    #[test]
    fn unknown_sort_field_preserves_input_order() {
        let recs = sample();
        let q = req(ListParams { sort_by: Some("nonesuch".into()), ..Default::default() });
        let out = run(&recs, &q, &spec());
        assert_eq!(out.data.iter().map(|r| r.id).collect::<Vec<_>>(), vec!["ORD-1", "ORD-2", "ORD-3"]);
    }

    #[test]
    fn page_zero_and_limit_zero_are_rejected() {
        let bad_page = QueryRequest::from_params(
            &ListParams { page: Some("0".into()), ..Default::default() },
            &[],
            "createdAt",
        );
        assert!(bad_page.is_err());
        let bad_limit = QueryRequest::from_params(
            &ListParams { limit: Some("0".into()), ..Default::default() },
            &[],
            "createdAt",
        );
        assert!(bad_limit.is_err());
    }

    #[test]
    fn huge_page_number_yields_empty_slice_without_wrapping() {
        let recs = sample();
        let q = req(ListParams {
            page: Some(usize::MAX.to_string()),
            limit: Some("10".into()),
            ..Default::default()
        });
        let out = run(&recs, &q, &spec());
        assert!(out.data.is_empty());
        assert_eq!(out.total, 3);
    }

    #[test]
    fn out_of_range_page_yields_empty_slice() {
        let recs = sample();
        let q = req(ListParams { page: Some("5".into()), limit: Some("2".into()), ..Default::default() });
        let out = run(&recs, &q, &spec());
        assert!(out.data.is_empty());
        assert_eq!(out.total, 3);
        assert_eq!(out.total_pages, 2);
    }
}
