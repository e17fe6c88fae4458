use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use url::Url;

use crate::error::ApiError;
use crate::normalize::{AliasNormalizer, ContributionType, Platform};
use crate::queries;

/// A new contribution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContributionInput {
    /// Title of the contribution
    pub title: String,

    /// Public URL where the contribution can be found
    pub url: String,

    /// Short description; omitted descriptions are sent as an empty string
    #[serde(default)]
    pub description: Option<String>,

    /// Kind of contribution
    #[serde(rename = "type")]
    pub kind: ContributionType,

    /// ISO-8601 date, e.g. `2024-05-01` or `2024-05-01T10:00:00Z`
    pub date: String,
}

/// Fields to change on an existing contribution. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContributionUpdate {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<ContributionType>,

    /// ISO-8601 date
    #[serde(default)]
    pub date: Option<String>,
}

/// A profile link
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LinkInput {
    /// URL of the profile or page
    pub link: String,

    /// Platform of the link, e.g. `TWITTER` or `README`. `GITHUB` and `WEBSITE` are
    /// accepted as legacy names for `README` and `OTHER`.
    pub platform: String,
}

/// Fields to change on the nominee profile. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO-8601 date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

/// One logical operation against the Stars API
#[derive(Clone, Debug, PartialEq)]
pub enum OperationRequest {
    CreateContribution(ContributionInput),
    CreateContributions(Vec<ContributionInput>),
    UpdateContribution {
        id: String,
        data: ContributionUpdate,
    },
    DeleteContribution {
        id: String,
    },
    CreateLink(LinkInput),
    UpdateLink {
        id: String,
        link: LinkInput,
    },
    DeleteLink {
        id: String,
    },
    UpdateProfile(ProfileUpdate),
    GetUserData,
    GetUser,
    GetStars {
        username: String,
    },
}

/// The body of a GraphQL POST
#[derive(Debug, PartialEq, Serialize)]
pub struct GraphQLRequest {
    pub query: &'static str,
    pub variables: Value,
}

impl OperationRequest {
    /// The GraphQL operation name
    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::CreateContribution(_) => "CreateContribution",
            OperationRequest::CreateContributions(_) => "CreateContributions",
            OperationRequest::UpdateContribution { .. } => "UpdateContribution",
            OperationRequest::DeleteContribution { .. } => "DeleteContribution",
            OperationRequest::CreateLink(_) => "CreateLink",
            OperationRequest::UpdateLink { .. } => "UpdateLink",
            OperationRequest::DeleteLink { .. } => "DeleteLink",
            OperationRequest::UpdateProfile(_) => "UpdateProfile",
            OperationRequest::GetUserData => "UserData",
            OperationRequest::GetUser => "User",
            OperationRequest::GetStars { .. } => "GetStars",
        }
    }

    /// Public profile reads work without a token; everything else is user-scoped
    pub fn requires_auth(&self) -> bool {
        !matches!(self, OperationRequest::GetStars { .. })
    }

    /// URLs supplied by the caller that will be stored remotely
    pub fn urls(&self) -> Vec<&str> {
        let urls: Vec<&str> = match self {
            OperationRequest::CreateContribution(contribution) => vec![&contribution.url],
            OperationRequest::CreateContributions(contributions) => {
                contributions.iter().map(|c| c.url.as_str()).collect()
            }
            OperationRequest::UpdateContribution { data, .. } => {
                data.url.as_deref().into_iter().collect()
            }
            OperationRequest::CreateLink(link) | OperationRequest::UpdateLink { link, .. } => {
                vec![&link.link]
            }
            _ => Vec::new(),
        };
        urls.into_iter().filter(|url| !url.trim().is_empty()).collect()
    }

    /// Replace legacy platform names with their canonical spelling
    pub fn normalize_platforms(&mut self, normalizer: &AliasNormalizer) {
        if let OperationRequest::CreateLink(link) | OperationRequest::UpdateLink { link, .. } = self
        {
            link.platform = normalizer.normalize(&link.platform);
        }
    }

    /// Check the fields the API would reject, before any network call is made
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            OperationRequest::CreateContribution(contribution) => {
                validate_contribution("", contribution)
            }
            OperationRequest::CreateContributions(contributions) => {
                if contributions.is_empty() {
                    return Err(ApiError::InvalidInput(
                        "at least one contribution is required".to_string(),
                    ));
                }
                contributions
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, c)| validate_contribution(&format!("data[{i}]."), c))
            }
            OperationRequest::UpdateContribution { id, data } => {
                require_non_empty("id", id)?;
                if let Some(url) = &data.url {
                    require_http_url("data.url", url)?;
                }
                if let Some(date) = &data.date {
                    require_date("data.date", date)?;
                }
                Ok(())
            }
            OperationRequest::DeleteContribution { id } | OperationRequest::DeleteLink { id } => {
                require_non_empty("id", id)
            }
            OperationRequest::CreateLink(link) => validate_link(link),
            OperationRequest::UpdateLink { id, link } => {
                require_non_empty("id", id)?;
                validate_link(link)
            }
            OperationRequest::UpdateProfile(profile) => match &profile.birthdate {
                Some(birthdate) => require_date("birthdate", birthdate),
                None => Ok(()),
            },
            OperationRequest::GetStars { username } => require_non_empty("username", username),
            OperationRequest::GetUserData | OperationRequest::GetUser => Ok(()),
        }
    }

    /// Build the GraphQL document and variables for this operation
    pub fn to_graphql(&self) -> Result<GraphQLRequest, ApiError> {
        let (query, variables) = match self {
            OperationRequest::CreateContribution(contribution) => (
                queries::CREATE_CONTRIBUTION,
                json!({ "data": contribution_variables(contribution) }),
            ),
            OperationRequest::CreateContributions(contributions) => (
                queries::CREATE_CONTRIBUTIONS,
                json!({
                    "data": contributions.iter().map(contribution_variables).collect::<Vec<_>>()
                }),
            ),
            OperationRequest::UpdateContribution { id, data } => (
                queries::UPDATE_CONTRIBUTION,
                json!({ "id": id, "data": update_variables(data) }),
            ),
            OperationRequest::DeleteContribution { id } => {
                (queries::DELETE_CONTRIBUTION, json!({ "id": id }))
            }
            OperationRequest::CreateLink(link) => (
                queries::CREATE_LINK,
                json!({ "link": link.link, "platform": link.platform }),
            ),
            OperationRequest::UpdateLink { id, link } => (
                queries::UPDATE_LINK,
                json!({ "id": id, "link": link.link, "platform": link.platform }),
            ),
            OperationRequest::DeleteLink { id } => (queries::DELETE_LINK, json!({ "id": id })),
            OperationRequest::UpdateProfile(profile) => {
                let data = serde_json::to_value(profile)
                    .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
                (queries::UPDATE_PROFILE, json!({ "data": data }))
            }
            OperationRequest::GetUserData => (queries::USER_DATA, json!({})),
            OperationRequest::GetUser => (queries::USER, json!({})),
            OperationRequest::GetStars { username } => {
                (queries::GET_STARS, json!({ "username": username }))
            }
        };
        Ok(GraphQLRequest { query, variables })
    }
}

/// Parse an ISO-8601 date or date-time. Offsets are converted to UTC; bare dates are midnight.
pub fn parse_iso8601(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .ok()
}

/// Dates go out as UTC date-times, so `2024-05-01` is sent as `2024-05-01T00:00:00`
fn submitted_date(value: &str) -> String {
    match parse_iso8601(value) {
        Some(parsed) => parsed.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        None => value.to_string(),
    }
}

fn normalize_description(description: Option<&str>) -> String {
    description.map(str::trim).unwrap_or_default().to_string()
}

fn contribution_variables(contribution: &ContributionInput) -> Value {
    json!({
        "title": contribution.title,
        "url": contribution.url,
        "description": normalize_description(contribution.description.as_deref()),
        "type": contribution.kind,
        "date": submitted_date(&contribution.date),
    })
}

fn update_variables(update: &ContributionUpdate) -> Value {
    let mut data = Map::new();
    if let Some(title) = &update.title {
        data.insert("title".to_string(), json!(title));
    }
    if let Some(url) = &update.url {
        data.insert("url".to_string(), json!(url));
    }
    if let Some(description) = &update.description {
        data.insert(
            "description".to_string(),
            json!(normalize_description(Some(description))),
        );
    }
    if let Some(kind) = &update.kind {
        data.insert("type".to_string(), json!(kind));
    }
    if let Some(date) = &update.date {
        data.insert("date".to_string(), json!(submitted_date(date)));
    }
    Value::Object(data)
}

fn validate_contribution(prefix: &str, contribution: &ContributionInput) -> Result<(), ApiError> {
    require_non_empty(&format!("{prefix}title"), &contribution.title)?;
    require_http_url(&format!("{prefix}url"), &contribution.url)?;
    require_date(&format!("{prefix}date"), &contribution.date)
}

fn validate_link(link: &LinkInput) -> Result<(), ApiError> {
    require_http_url("link", &link.link)?;
    link.platform.parse::<Platform>().map(|_| ()).map_err(|e| {
        let expected: Vec<_> = Platform::ALL.iter().map(Platform::as_str).collect();
        ApiError::InvalidInput(format!("{e}; expected one of {}", expected.join(", ")))
    })
}

fn require_http_url(field: &str, value: &str) -> Result<(), ApiError> {
    require_non_empty(field, value)?;
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(ApiError::InvalidInput(format!(
            "`{field}` must be an http(s) URL, got '{value}'"
        ))),
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::InvalidInput(format!("`{field}` must not be empty")))
    } else {
        Ok(())
    }
}

fn require_date(field: &str, value: &str) -> Result<(), ApiError> {
    match parse_iso8601(value) {
        Some(_) => Ok(()),
        None => Err(ApiError::InvalidInput(format!(
            "`{field}` is not an ISO-8601 date: '{value}'"
        ))),
    }
}
