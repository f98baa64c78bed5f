use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use crate::store::TicketStore;
use crate::ticket::{Comment, CommentAuthor, Ticket};

/// Jira custom field holding the ticket start date.
const START_DATE_FIELD: &str = "customfield_10015";

/// Blocking Jira REST client (API v2, basic auth with email + API token).
pub struct JiraClient {
    base_url: String,
    email: String,
    api_token: String,
    project: Option<String>,
    client: reqwest::blocking::Client,
}

impl JiraClient {
    pub fn new(
        base_url: &str,
        email: &str,
        api_token: &str,
        project: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .context("Failed to build Jira HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
            project,
            client,
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .with_context(|| format!("Jira request failed: GET {url}"))?;
        check_status(response, &url)?.json().context("Invalid JSON from Jira")
    }

    fn send_json(&self, method: reqwest::Method, path: &str, body: &Value) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .with_context(|| format!("Jira request failed: {method} {url}"))?;
        check_status(response, &url)?;
        Ok(())
    }
}

fn check_status(
    response: reqwest::blocking::Response,
    url: &str,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        bail!("Jira error {status} for {url}: {body}");
    }
    Ok(response)
}

fn field_name(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(|value| value.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn field_str(fields: &Value, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn ticket_from_issue(issue: &Value) -> Ticket {
    let fields = issue.get("fields").cloned().unwrap_or_else(|| json!({}));
    Ticket {
        id: issue
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        title: field_str(&fields, "summary").unwrap_or_default(),
        description: field_str(&fields, "description").unwrap_or_default(),
        status: field_name(&fields, "status"),
        priority: field_name(&fields, "priority"),
        start_date: field_str(&fields, START_DATE_FIELD),
        due_date: field_str(&fields, "duedate"),
    }
}

fn comment_from_value(value: &Value) -> Comment {
    let author = value.get("author").cloned().unwrap_or_else(|| json!({}));
    Comment {
        id: field_str(value, "id").unwrap_or_default(),
        author: CommentAuthor {
            account_id: field_str(&author, "accountId").unwrap_or_default(),
            display_name: field_str(&author, "displayName").unwrap_or_default(),
            email_address: field_str(&author, "emailAddress"),
        },
        body: field_str(value, "body").unwrap_or_default(),
        created: field_str(value, "created").unwrap_or_default(),
        updated: field_str(value, "updated"),
    }
}

impl TicketStore for JiraClient {
    fn list_open_tickets(&self, assignee: &str) -> Result<Vec<Ticket>> {
        let mut jql = format!("assignee = \"{assignee}\" AND resolution = Unresolved");
        if let Some(project) = self.project.as_deref() {
            jql = format!("project = \"{project}\" AND {jql}");
        }
        let data = self.get("/rest/api/2/search", &[("jql", jql.as_str())])?;
        let issues = data
            .get("issues")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(issues.iter().map(ticket_from_issue).collect())
    }

    fn get_ticket(&self, id: &str) -> Result<Ticket> {
        let issue = self.get(&format!("/rest/api/2/issue/{id}"), &[])?;
        Ok(ticket_from_issue(&issue))
    }

    fn list_comments(&self, ticket_id: &str) -> Result<Vec<Comment>> {
        let data = self.get(&format!("/rest/api/2/issue/{ticket_id}/comment"), &[])?;
        let comments = data
            .get("comments")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(comments.iter().map(comment_from_value).collect())
    }

    fn add_comment(&self, ticket_id: &str, text: &str) -> Result<()> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/rest/api/2/issue/{ticket_id}/comment"),
            &json!({ "body": text }),
        )
    }

    fn transition_status(&self, ticket_id: &str, transition_id: &str) -> Result<()> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/rest/api/2/issue/{ticket_id}/transitions"),
            &json!({ "transition": { "id": transition_id } }),
        )
    }

    fn set_dates(
        &self,
        ticket_id: &str,
        start_date: Option<&str>,
        due_date: Option<&str>,
    ) -> Result<()> {
        let mut fields = serde_json::Map::new();
        if let Some(start) = start_date {
            fields.insert(START_DATE_FIELD.to_string(), json!(start));
        }
        if let Some(due) = due_date {
            fields.insert("duedate".to_string(), json!(due));
        }
        if fields.is_empty() {
            bail!("At least one of start_date or due_date must be provided");
        }
        self.send_json(
            reqwest::Method::PUT,
            &format!("/rest/api/2/issue/{ticket_id}"),
            &json!({ "fields": fields }),
        )
    }
}
