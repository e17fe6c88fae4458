//! Local analysis of public contributions: search, statistics and comparison

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use futures::FutureExt as _;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use stars_api::operation::parse_iso8601;
use stars_api::{ResultEnvelope, StarsAdapter};

use super::public::{self, Contribution};
use super::{ToolFuture, ToolRegistry, parse_input};
use crate::schema_from_type;

pub const SEARCH_CONTRIBUTIONS_TOOL_NAME: &str = "search_contributions";
pub const CONTRIBUTIONS_STATS_TOOL_NAME: &str = "get_contributions_stats";
pub const COMPARE_CONTRIBUTIONS_TOOL_NAME: &str = "compare_contributions";

const INVALID_DATE: &str = "Invalid date format. Use ISO 8601 or YYYY-MM-DD";

/// Input for the search tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct SearchInput {
    /// The GitHub username whose public contributions are searched
    username: String,

    /// Only contributions of this type, e.g. `BLOGPOST`
    #[serde(default, rename = "type")]
    kind: Option<String>,

    /// Only contributions whose title contains this text, ignoring case
    #[serde(default)]
    title_contains: Option<String>,

    /// Earliest date to include, `YYYY-MM-DD` or ISO-8601
    #[serde(default)]
    date_from: Option<String>,

    /// Latest date to include, `YYYY-MM-DD` or ISO-8601. A bare date includes the whole day.
    #[serde(default)]
    date_to: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, JsonSchema, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GroupBy {
    Type,
    Month,
    Year,
}

/// Input for the statistics tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct StatsInput {
    /// The GitHub username
    username: String,

    /// Also group the contributions by type, month or year
    #[serde(default)]
    group_by: Option<GroupBy>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Metric {
    Total,
    ByType,
    ByYear,
    #[default]
    Detailed,
}

/// Input for the comparison tool
#[derive(JsonSchema, Deserialize, Debug)]
pub(crate) struct CompareInput {
    /// The first GitHub username
    username1: String,

    /// The second GitHub username
    username2: String,

    /// What to compare. Without a metric, a detailed comparison is returned.
    #[serde(default)]
    metric: Metric,
}

pub(super) fn register(registry: &mut ToolRegistry) {
    registry
        .register(
            Tool::new(
                SEARCH_CONTRIBUTIONS_TOOL_NAME,
                "Searches the public contributions of a user by type, title and date range. \
                Date bounds are inclusive.",
                schema_from_type!(SearchInput),
            ),
            search,
        )
        .register(
            Tool::new(
                CONTRIBUTIONS_STATS_TOOL_NAME,
                "Summarizes the public contributions of a user: totals per type, the date range \
                covered and optionally a grouping by type, month or year.",
                schema_from_type!(StatsInput),
            ),
            stats,
        )
        .register(
            Tool::new(
                COMPARE_CONTRIBUTIONS_TOOL_NAME,
                "Compares the public contributions of two different users.",
                schema_from_type!(CompareInput),
            ),
            compare,
        );
}

fn search(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    async move {
        let input: SearchInput = match parse_input(arguments) {
            Ok(input) => input,
            Err(invalid) => return invalid,
        };
        let filter = match SearchFilter::try_from(&input) {
            Ok(filter) => filter,
            Err(error) => return ResultEnvelope::failure(error),
        };

        match public::contributions(&adapter, &input.username).await {
            Ok(contributions) => {
                let matches: Vec<_> = contributions
                    .into_iter()
                    .filter(|c| filter.matches(c))
                    .collect();
                ResultEnvelope::success(json!({
                    "username": input.username,
                    "count": matches.len(),
                    "contributions": matches,
                }))
            }
            Err(error) => ResultEnvelope::failure(error),
        }
    }
    .boxed()
}

fn stats(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    async move {
        let input: StatsInput = match parse_input(arguments) {
            Ok(input) => input,
            Err(invalid) => return invalid,
        };

        match public::contributions(&adapter, &input.username).await {
            Ok(contributions) => ResultEnvelope::success(statistics(
                &input.username,
                &contributions,
                input.group_by,
            )),
            Err(error) => ResultEnvelope::failure(error),
        }
    }
    .boxed()
}

fn compare(adapter: Arc<StarsAdapter>, arguments: Value) -> ToolFuture {
    async move {
        let input: CompareInput = match parse_input(arguments) {
            Ok(input) => input,
            Err(invalid) => return invalid,
        };
        if input.username1.trim().eq_ignore_ascii_case(input.username2.trim()) {
            return ResultEnvelope::failure("Cannot compare user with themselves");
        }

        let (first, second) = futures::join!(
            public::contributions(&adapter, &input.username1),
            public::contributions(&adapter, &input.username2),
        );
        match (first, second) {
            (Ok(first), Ok(second)) => ResultEnvelope::success(comparison(
                &input.username1,
                &first,
                &input.username2,
                &second,
                input.metric,
            )),
            (Err(error), _) | (_, Err(error)) => ResultEnvelope::failure(error),
        }
    }
    .boxed()
}

/// An inclusive date bound. A bare date as upper bound covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DateBound {
    at: NaiveDateTime,
    whole_day: bool,
}

impl DateBound {
    fn parse(value: &str) -> Result<Self, String> {
        let at = parse_iso8601(value).ok_or_else(|| INVALID_DATE.to_string())?;
        Ok(Self {
            at,
            whole_day: NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok(),
        })
    }

    fn not_before(&self, date: NaiveDateTime) -> bool {
        date >= self.at
    }

    fn not_after(&self, date: NaiveDateTime) -> bool {
        if self.whole_day {
            date.date() <= self.at.date()
        } else {
            date <= self.at
        }
    }
}

#[derive(Debug, Default)]
struct SearchFilter {
    kind: Option<String>,
    title: Option<String>,
    from: Option<DateBound>,
    to: Option<DateBound>,
}

impl TryFrom<&SearchInput> for SearchFilter {
    type Error = String;

    fn try_from(input: &SearchInput) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: input.kind.clone(),
            title: input.title_contains.as_ref().map(|t| t.to_lowercase()),
            from: input.date_from.as_deref().map(DateBound::parse).transpose()?,
            to: input.date_to.as_deref().map(DateBound::parse).transpose()?,
        })
    }
}

impl SearchFilter {
    fn matches(&self, contribution: &Contribution) -> bool {
        if let Some(kind) = &self.kind
            && !contribution
                .kind
                .as_deref()
                .is_some_and(|k| k.eq_ignore_ascii_case(kind))
        {
            return false;
        }

        if let Some(title) = &self.title
            && !contribution
                .title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(title))
        {
            return false;
        }

        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        // Undated contributions cannot satisfy a date bound
        let Some(date) = contribution.parsed_date() else {
            return false;
        };
        self.from.is_none_or(|from| from.not_before(date))
            && self.to.is_none_or(|to| to.not_after(date))
    }
}

fn count_by_type(contributions: &[Contribution]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for contribution in contributions {
        *counts
            .entry(contribution.kind_or_unknown().to_string())
            .or_insert(0) += 1;
    }
    counts
}

/// The earliest and latest dates, as reported by the API
fn date_range(contributions: &[Contribution]) -> Value {
    let dated = contributions
        .iter()
        .filter_map(|c| Some((c.parsed_date()?, c.date.as_deref()?)));

    let mut range: Option<((NaiveDateTime, &str), (NaiveDateTime, &str))> = None;
    for entry in dated {
        range = Some(match range {
            None => (entry, entry),
            Some((earliest, latest)) => (
                if entry.0 < earliest.0 { entry } else { earliest },
                if entry.0 > latest.0 { entry } else { latest },
            ),
        });
    }

    match range {
        Some(((_, earliest), (_, latest))) => json!({ "earliest": earliest, "latest": latest }),
        None => Value::Null,
    }
}

fn statistics(username: &str, contributions: &[Contribution], group_by: Option<GroupBy>) -> Value {
    json!({
        "username": username,
        "total_count": contributions.len(),
        "by_type": count_by_type(contributions),
        "date_range": date_range(contributions),
        "grouped": group_by.map_or_else(|| json!({}), |g| grouped(contributions, g)),
    })
}

fn grouped(contributions: &[Contribution], group_by: GroupBy) -> Value {
    match group_by {
        GroupBy::Type => {
            let mut groups: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
            for contribution in contributions {
                groups
                    .entry(contribution.kind_or_unknown())
                    .or_default()
                    .push(json!({
                        "title": contribution.title,
                        "date": contribution.date,
                        "url": contribution.url,
                    }));
            }
            json!(groups)
        }
        GroupBy::Month | GroupBy::Year => {
            let format = if group_by == GroupBy::Month { "%Y-%m" } else { "%Y" };
            let mut periods: BTreeMap<String, BTreeMap<&str, usize>> = BTreeMap::new();
            for contribution in contributions {
                if let Some(date) = contribution.parsed_date() {
                    *periods
                        .entry(date.format(format).to_string())
                        .or_default()
                        .entry(contribution.kind_or_unknown())
                        .or_insert(0) += 1;
                }
            }
            let periods: BTreeMap<_, _> = periods
                .into_iter()
                .map(|(period, types)| {
                    let count: usize = types.values().sum();
                    (period, json!({ "count": count, "types": types }))
                })
                .collect();
            json!(periods)
        }
    }
}

fn count_by_year(contributions: &[Contribution]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for date in contributions.iter().filter_map(Contribution::parsed_date) {
        *counts.entry(date.year()).or_insert(0) += 1;
    }
    counts
}

/// Side-by-side counts for every key present on either side
fn side_by_side<K: Ord + Clone + ToString>(
    first: &BTreeMap<K, usize>,
    second: &BTreeMap<K, usize>,
    with_difference: bool,
) -> BTreeMap<String, Value> {
    first
        .keys()
        .chain(second.keys())
        .map(|key| {
            let a = first.get(key).copied().unwrap_or(0);
            let b = second.get(key).copied().unwrap_or(0);
            let entry = if with_difference {
                json!({ "user1": a, "user2": b, "difference": difference(a, b) })
            } else {
                json!({ "user1": a, "user2": b })
            };
            (key.to_string(), entry)
        })
        .collect()
}

fn difference(a: usize, b: usize) -> i64 {
    i64::try_from(a).unwrap_or(i64::MAX) - i64::try_from(b).unwrap_or(i64::MAX)
}

fn comparison(
    user1: &str,
    first: &[Contribution],
    user2: &str,
    second: &[Contribution],
    metric: Metric,
) -> Value {
    let details = if first.is_empty() || second.is_empty() {
        Value::Null
    } else {
        match metric {
            Metric::Total => json!({
                "metric": "total",
                "difference": difference(first.len(), second.len()),
                "ratio": first.len() as f64 / second.len() as f64,
            }),
            Metric::ByType => json!({
                "metric": "by_type",
                "by_type": side_by_side(&count_by_type(first), &count_by_type(second), true),
            }),
            Metric::ByYear => json!({
                "metric": "by_year",
                "by_year": side_by_side(&count_by_year(first), &count_by_year(second), true),
            }),
            Metric::Detailed => json!({
                "metric": "detailed",
                "summary": {
                    "total_difference": difference(first.len(), second.len()),
                    "user1_total": first.len(),
                    "user2_total": second.len(),
                },
                "by_type": side_by_side(&count_by_type(first), &count_by_type(second), false),
                "date_range": {
                    "user1": date_range(first),
                    "user2": date_range(second),
                },
            }),
        }
    };

    json!({
        "user1": user1,
        "user2": user2,
        "user1_count": first.len(),
        "user2_count": second.len(),
        "comparison": details,
    })
}
