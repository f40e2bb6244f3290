use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{AuthMode, ConnectionSettings};
use crate::domain::ticket::{StatusCategoryColor, TicketKey, TicketRecord};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const NONE_LABEL: &str = "None";

pub struct JiraClient {
    http: Client,
}

impl JiraClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    fn auth_header(connection: &ConnectionSettings) -> String {
        match connection.auth_mode {
            AuthMode::BasicAuth => {
                let credentials = format!("{}:{}", connection.username, connection.api_token);
                let encoded = BASE64_STANDARD.encode(credentials);
                format!("Basic {encoded}")
            }
            AuthMode::PersonalAccessToken => format!("Bearer {}", connection.api_token),
        }
    }

    fn issue_endpoint(connection: &ConnectionSettings, key: &TicketKey) -> String {
        format!("{}/issue/{}", connection.rest_base(), key)
    }

    fn search_endpoint(connection: &ConnectionSettings) -> String {
        format!("{}/search", connection.rest_base())
    }

    async fn read_json<T: DeserializeOwned>(response: Response, subject: &str) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(status_error(status, subject, &body));
        }

        response
            .json()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to parse Jira response: {err}")))
    }
}

impl Default for JiraClient {
    fn default() -> Self {
        Self::new()
    }
}

fn status_error(status: StatusCode, subject: &str, body: &str) -> AppError {
    match status {
        StatusCode::NOT_FOUND => AppError::NotFound {
            key: subject.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::Authentication(format!("Jira responded with {status}"))
        }
        _ => AppError::IssueTracker(format!("Jira responded with {status}: {body}")),
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn fetch_issue(
        &self,
        key: &TicketKey,
        connection: &ConnectionSettings,
    ) -> AppResult<TicketRecord> {
        let url = Self::issue_endpoint(connection, key);
        debug!(%key, %url, "fetching issue");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, Self::auth_header(connection))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let issue: JiraIssue = Self::read_json(response, key.as_str()).await?;
        issue.into_record(connection)
    }

    async fn search(
        &self,
        jql: &str,
        max_results: usize,
        connection: &ConnectionSettings,
    ) -> AppResult<Vec<TicketRecord>> {
        debug!(jql, max_results, host = %connection.base_host, "running search");

        let response = self
            .http
            .get(Self::search_endpoint(connection))
            .query(&[("jql", jql.to_string()), ("maxResults", max_results.to_string())])
            .header(AUTHORIZATION, Self::auth_header(connection))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let result: JiraSearchResult = Self::read_json(response, jql).await?;
        result
            .issues
            .into_iter()
            .map(|issue| issue.into_record(connection))
            .collect()
    }
}

#[derive(Deserialize)]
struct JiraSearchResult {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    #[serde(default)]
    fields: JiraFields,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct JiraFields {
    summary: Option<String>,
    status: Option<JiraStatus>,
    #[serde(rename = "issuetype")]
    issue_type: Option<JiraNamed>,
    priority: Option<JiraNamed>,
    creator: Option<JiraUser>,
    reporter: Option<JiraUser>,
    assignee: Option<JiraUser>,
    fix_versions: Option<Vec<JiraNamed>>,
    resolution: Option<JiraNamed>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraStatus {
    name: Option<String>,
    status_category: Option<JiraStatusCategory>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraStatusCategory {
    name: Option<String>,
    color_name: Option<String>,
}

#[derive(Deserialize)]
struct JiraNamed {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    display_name: Option<String>,
}

fn label(value: Option<String>) -> String {
    value.unwrap_or_else(|| NONE_LABEL.to_string())
}

fn named(value: Option<JiraNamed>) -> String {
    label(value.and_then(|v| v.name))
}

fn user(value: Option<JiraUser>) -> String {
    label(value.and_then(|v| v.display_name))
}

impl JiraIssue {
    fn into_record(self, connection: &ConnectionSettings) -> AppResult<TicketRecord> {
        let key = TicketKey::parse(&self.key).ok_or_else(|| {
            AppError::IssueTracker(format!("Jira returned malformed issue key '{}'", self.key))
        })?;
        let fields = self.fields;

        let (status_name, category) = match fields.status {
            Some(status) => (status.name, status.status_category),
            None => (None, None),
        };
        let (category_name, category_color) = match category {
            Some(category) => (category.name, category.color_name),
            None => (None, None),
        };

        Ok(TicketRecord {
            url: connection.browse_url(key.as_str()),
            key,
            summary: label(fields.summary),
            status_name: label(status_name),
            status_category_name: label(category_name),
            status_category_color: StatusCategoryColor::from_name(category_color.as_deref()),
            issue_type: named(fields.issue_type),
            priority: named(fields.priority),
            creator_name: user(fields.creator),
            reporter_name: user(fields.reporter),
            assignee_name: user(fields.assignee),
            fix_versions: fields
                .fix_versions
                .into_iter()
                .flatten()
                .filter_map(|version| version.name)
                .collect(),
            resolution_name: fields.resolution.and_then(|r| r.name),
        })
    }
}
