use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, Method, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::document::{Block, Document};
use crate::domain::ticket::{IssueKey, IssueTypeInfo, ProjectRef, Ticket};
use crate::domain::workload::AssignableUser;
use crate::error::{AppError, AppResult};
use crate::infra::retry::{Failure, RetryPolicy};
use crate::services::IssueTrackerService;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a 404 from a given endpoint means.
#[derive(Clone, Copy)]
enum Missing<'a> {
    Ticket(&'a IssueKey),
    Project(&'a str),
    Unexpected,
}

pub struct JiraClient {
    http: Client,
    base_url: Option<String>,
    email: Option<String>,
    token: Option<String>,
    retry: RetryPolicy,
}

impl JiraClient {
    pub fn new(
        base_url: Option<String>,
        email: Option<String>,
        token: Option<String>,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url,
            email,
            token,
            retry,
        })
    }

    fn api_details(&self) -> AppResult<(&str, &str, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira base URL not configured".to_string()))?;
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira email not configured".to_string()))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira API token not configured".to_string()))?;
        Ok((base_url, email, token))
    }

    fn auth_header(email: &str, token: &str) -> String {
        let credentials = format!("{email}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn endpoint(base_url: &str, path: &str) -> String {
        format!("{}/rest/api/3/{}", base_url.trim_end_matches('/'), path)
    }

    /// Idempotent GET, retried on transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        label: &str,
        path: &str,
        query: &[(&str, String)],
        missing: Missing<'_>,
    ) -> AppResult<T> {
        let (base_url, email, token) = self.api_details()?;
        let url = Self::endpoint(base_url, path);
        let auth = Self::auth_header(email, token);
        let (http, url, auth) = (&self.http, url.as_str(), auth.as_str());

        self.retry
            .run(label, || async move {
                let response = http
                    .get(url)
                    .header(AUTHORIZATION, auth)
                    .header(ACCEPT, "application/json")
                    .query(query)
                    .send()
                    .await
                    .map_err(send_failure)?;

                let status = response.status();
                if !status.is_success() {
                    let body = read_body(response).await;
                    return Err(classify_failure(status, &body, missing));
                }

                response.json::<T>().await.map_err(|err| {
                    Failure::Permanent(AppError::IssueTracker(format!(
                        "failed to parse Jira response for {label}: {err}"
                    )))
                })
            })
            .await
    }

    /// Single-shot write; never retried.
    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        missing: Missing<'_>,
    ) -> AppResult<Response> {
        let (base_url, email, token) = self.api_details()?;

        let response = self
            .http
            .request(method, Self::endpoint(base_url, path))
            .header(AUTHORIZATION, Self::auth_header(email, token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| write_failure(send_failure(err)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = read_body(response).await;
        Err(write_failure(classify_failure(status, &body, missing)))
    }
}

/// A request that cannot be built (malformed base URL) will never succeed.
fn send_failure(err: reqwest::Error) -> Failure {
    if err.is_builder() {
        Failure::Permanent(AppError::Configuration(format!(
            "invalid Jira request, check the base URL: {err}"
        )))
    } else {
        Failure::Transient(format!("failed to call Jira: {err}"))
    }
}

fn write_failure(failure: Failure) -> AppError {
    match failure {
        Failure::Permanent(err) => err,
        Failure::Transient(message) => AppError::IssueTracker(message),
    }
}

async fn read_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unable to read response>".to_string())
}

fn classify_failure(status: StatusCode, body: &str, missing: Missing<'_>) -> Failure {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Failure::Transient(format!("Jira responded with {status}"));
    }
    if status == StatusCode::NOT_FOUND {
        match missing {
            Missing::Ticket(key) => {
                return Failure::Permanent(AppError::TicketNotFound(key.to_string()));
            }
            Missing::Project(id) => {
                return Failure::Permanent(AppError::IneligibleTicket(format!(
                    "project {id} not found"
                )));
            }
            Missing::Unexpected => {}
        }
    }
    Failure::Permanent(AppError::IssueTracker(format!(
        "Jira responded with {status}: {}",
        error_detail(body)
    )))
}

/// Flattens Jira's `{errorMessages, errors}` payload, falling back to the raw body.
fn error_detail(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<JiraErrorBody>(body) else {
        return body.to_string();
    };

    let mut parts = parsed.error_messages;
    parts.extend(
        parsed
            .errors
            .into_iter()
            .map(|(field, message)| match message {
                serde_json::Value::String(text) => format!("{field}: {text}"),
                other => format!("{field}: {other}"),
            }),
    );

    if parts.is_empty() {
        body.to_string()
    } else {
        parts.join(", ")
    }
}

fn open_tickets_jql(account_id: &str) -> String {
    format!(
        "assignee = \"{}\" AND statusCategory != Done",
        account_id.replace('"', "\\\"")
    )
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn fetch_ticket(&self, key: &IssueKey) -> AppResult<Ticket> {
        let issue: JiraIssue = self
            .get_json("fetch ticket", &format!("issue/{key}"), &[], Missing::Ticket(key))
            .await?;
        Ok(issue.into_ticket(key))
    }

    async fn assignable_users(&self, key: &IssueKey) -> AppResult<Vec<AssignableUser>> {
        let users: Vec<JiraUser> = self
            .get_json(
                "assignable users",
                "user/assignable/search",
                &[("issueKey", key.to_string())],
                Missing::Ticket(key),
            )
            .await?;
        Ok(users.into_iter().map(JiraUser::into_assignable).collect())
    }

    async fn count_open_tickets(&self, account_id: &str) -> AppResult<u32> {
        let result: JiraSearchCount = self
            .get_json(
                "workload search",
                "search",
                &[
                    ("jql", open_tickets_jql(account_id)),
                    ("maxResults", "0".to_string()),
                ],
                Missing::Unexpected,
            )
            .await?;
        Ok(result.total)
    }

    async fn assign(&self, key: &IssueKey, account_id: &str) -> AppResult<()> {
        let body = JiraAssignRequest {
            account_id: account_id.to_string(),
        };
        self.write(Method::PUT, &format!("issue/{key}/assignee"), &body, Missing::Ticket(key))
            .await?;
        Ok(())
    }

    async fn update_description(&self, key: &IssueKey, document: &Document) -> AppResult<()> {
        let body = JiraUpdateDescriptionRequest {
            fields: JiraDescriptionField {
                description: JiraDescription::from_document(document),
            },
        };
        self.write(Method::PUT, &format!("issue/{key}"), &body, Missing::Ticket(key))
            .await?;
        Ok(())
    }

    async fn project_issue_types(&self, project_id: &str) -> AppResult<Vec<IssueTypeInfo>> {
        let project: JiraProjectDetails = self
            .get_json(
                "project details",
                &format!("project/{project_id}"),
                &[],
                Missing::Project(project_id),
            )
            .await?;
        Ok(project
            .issue_types
            .into_iter()
            .map(JiraIssueTypeRef::into_info)
            .collect())
    }

    async fn create_subtask(
        &self,
        project_id: &str,
        parent: &IssueKey,
        summary: &str,
        issue_type_id: &str,
    ) -> AppResult<String> {
        let body = JiraCreateSubtaskRequest::new(project_id, parent, summary, issue_type_id);
        let response = self.write(Method::POST, "issue", &body, Missing::Unexpected).await?;

        if response.status() != StatusCode::CREATED {
            return Err(AppError::IssueTracker(format!(
                "Jira responded with {} instead of 201 when creating \"{summary}\"",
                response.status()
            )));
        }

        let payload: JiraCreateIssueResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira response: {err}"))
        })?;
        Ok(payload.key)
    }

    async fn add_comment(&self, key: &IssueKey, text: &str) -> AppResult<()> {
        let body = JiraCommentRequest {
            body: JiraDescription::from_text(text),
        };
        self.write(Method::POST, &format!("issue/{key}/comment"), &body, Missing::Ticket(key))
            .await?;
        Ok(())
    }

    async fn current_account_id(&self) -> AppResult<String> {
        let me: JiraMyself = self
            .get_json("current user", "myself", &[], Missing::Unexpected)
            .await?;
        Ok(me.account_id)
    }

    async fn user_groups(&self, account_id: &str) -> AppResult<Vec<String>> {
        let groups: Vec<JiraGroup> = self
            .get_json(
                "user groups",
                "user/groups",
                &[("accountId", account_id.to_string())],
                Missing::Unexpected,
            )
            .await?;
        Ok(groups.into_iter().map(|group| group.name).collect())
    }
}

#[derive(Deserialize)]
struct JiraIssue {
    #[serde(default)]
    fields: JiraIssueFields,
}

impl JiraIssue {
    fn into_ticket(self, key: &IssueKey) -> Ticket {
        let fields = self.fields;
        Ticket {
            key: key.clone(),
            status: fields.status.map(|status| status.name),
            priority: fields.priority.map(|priority| priority.name),
            created: fields.created,
            project: fields.project.map(|project| ProjectRef {
                id: project.id,
                key: project.key,
            }),
            issue_type: fields.issuetype.map(JiraIssueTypeRef::into_info),
        }
    }
}

#[derive(Deserialize, Default)]
struct JiraIssueFields {
    status: Option<JiraNamed>,
    priority: Option<JiraNamed>,
    created: Option<String>,
    project: Option<JiraProjectRef>,
    issuetype: Option<JiraIssueTypeRef>,
}

#[derive(Deserialize)]
struct JiraNamed {
    name: String,
}

#[derive(Deserialize)]
struct JiraProjectRef {
    id: String,
    key: String,
}

#[derive(Deserialize)]
struct JiraIssueTypeRef {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    subtask: bool,
}

impl JiraIssueTypeRef {
    fn into_info(self) -> IssueTypeInfo {
        IssueTypeInfo {
            id: self.id,
            name: self.name,
            subtask: self.subtask,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    account_id: String,
    #[serde(default)]
    display_name: String,
    account_type: Option<String>,
}

impl JiraUser {
    fn into_assignable(self) -> AssignableUser {
        AssignableUser {
            account_id: self.account_id,
            display_name: self.display_name,
            account_type: self.account_type,
        }
    }
}

#[derive(Deserialize)]
struct JiraSearchCount {
    total: u32,
}

#[derive(Deserialize)]
struct JiraProjectDetails {
    #[serde(default, rename = "issueTypes")]
    issue_types: Vec<JiraIssueTypeRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraMyself {
    account_id: String,
}

#[derive(Deserialize)]
struct JiraGroup {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraAssignRequest {
    account_id: String,
}

#[derive(Serialize)]
struct JiraUpdateDescriptionRequest {
    fields: JiraDescriptionField,
}

#[derive(Serialize)]
struct JiraDescriptionField {
    description: JiraDescription,
}

#[derive(Serialize)]
struct JiraCommentRequest {
    body: JiraDescription,
}

#[derive(Serialize)]
struct JiraCreateSubtaskRequest {
    fields: JiraCreateSubtaskFields,
}

impl JiraCreateSubtaskRequest {
    fn new(project_id: &str, parent: &IssueKey, summary: &str, issue_type_id: &str) -> Self {
        Self {
            fields: JiraCreateSubtaskFields {
                project: JiraIdRef {
                    id: project_id.to_string(),
                },
                parent: JiraKeyRef {
                    key: parent.to_string(),
                },
                summary: summary.to_string(),
                issuetype: JiraIdRef {
                    id: issue_type_id.to_string(),
                },
            },
        }
    }
}

#[derive(Serialize)]
struct JiraCreateSubtaskFields {
    project: JiraIdRef,
    parent: JiraKeyRef,
    summary: String,
    issuetype: JiraIdRef,
}

#[derive(Serialize)]
struct JiraIdRef {
    id: String,
}

#[derive(Serialize)]
struct JiraKeyRef {
    key: String,
}

#[derive(Deserialize)]
struct JiraCreateIssueResponse {
    key: String,
}

/// Atlassian Document Format body.
#[derive(Serialize)]
struct JiraDescription {
    #[serde(rename = "type")]
    doc_type: &'static str,
    version: u8,
    content: Vec<JiraDocNode>,
}

impl JiraDescription {
    fn new(content: Vec<JiraDocNode>) -> Self {
        Self {
            doc_type: "doc",
            version: 1,
            content,
        }
    }

    fn from_document(document: &Document) -> Self {
        let content = document
            .blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(text) => JiraDocNode::paragraph(text),
                Block::Heading { level, text } => JiraDocNode::heading(*level, text),
                Block::BulletList(items) => JiraDocNode::bullet_list(items),
            })
            .collect();
        Self::new(content)
    }

    /// Blank-line separated text becomes one paragraph per section. Blank
    /// sections are dropped; Jira rejects empty text nodes.
    fn from_text(text: &str) -> Self {
        let content = text
            .replace('\r', "")
            .split("\n\n")
            .map(|section| section.replace('\n', " ").trim().to_string())
            .filter(|section| !section.is_empty())
            .map(|section| JiraDocNode::paragraph(&section))
            .collect();
        Self::new(content)
    }
}

#[derive(Serialize)]
struct JiraDocNode {
    #[serde(rename = "type")]
    node_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attrs: Option<JiraHeadingAttrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<JiraDocNode>,
}

#[derive(Serialize)]
struct JiraHeadingAttrs {
    level: u8,
}

impl JiraDocNode {
    fn node(node_type: &'static str, content: Vec<JiraDocNode>) -> Self {
        Self {
            node_type,
            attrs: None,
            text: None,
            content,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            node_type: "text",
            attrs: None,
            text: Some(text.to_string()),
            content: Vec::new(),
        }
    }

    fn paragraph(text: &str) -> Self {
        Self::node("paragraph", vec![Self::text(text)])
    }

    fn heading(level: u8, text: &str) -> Self {
        Self {
            attrs: Some(JiraHeadingAttrs { level }),
            ..Self::node("heading", vec![Self::text(text)])
        }
    }

    fn bullet_list(items: &[String]) -> Self {
        Self::node(
            "bulletList",
            items
                .iter()
                .map(|item| Self::node("listItem", vec![Self::paragraph(item)]))
                .collect(),
        )
    }
}
