use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::api::{GoogleApi, GoogleApiError};
use super::domain::{GmailMessage, TokenGrant};
use super::message::EventBody;
use crate::config::GoogleConfig;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_BASE: &str = "https://www.googleapis.com/calendar/v3/";
const GMAIL_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me/";

/// Google REST client over reqwest.
#[derive(Clone)]
pub struct HttpGoogleApi {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl HttpGoogleApi {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            http: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, GoogleApiError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(form)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, GoogleApiError> {
    let mut url = Url::parse(base).map_err(|err| GoogleApiError::Decode(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| GoogleApiError::Decode(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn transport(err: reqwest::Error) -> GoogleApiError {
    GoogleApiError::Transport(err.to_string())
}

async fn send(request: RequestBuilder) -> Result<Response, GoogleApiError> {
    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GoogleApiError::Status {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or(body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GoogleApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GoogleApiError::Status {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or(body),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|err| GoogleApiError::Decode(err.to_string()))
}

/// Google errors come either as `{"error": {"message": ..}}` (APIs) or
/// `{"error": "..", "error_description": ".."}` (OAuth).
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value["error"]["message"].as_str() {
        return Some(message.to_string());
    }
    value["error_description"]
        .as_str()
        .or_else(|| value["error"].as_str())
        .map(str::to_string)
}

#[derive(Deserialize)]
struct IdOnly {
    id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventPage {
    #[serde(default)]
    items: Vec<IdOnly>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<IdOnly>,
}

#[derive(Deserialize)]
struct MessageMetadata {
    id: String,
    #[serde(default)]
    snippet: String,
    payload: Option<MessagePayload>,
}

#[derive(Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl MessageMetadata {
    fn header(&self, name: &str) -> Option<String> {
        self.payload.as_ref().and_then(|payload| {
            payload
                .headers
                .iter()
                .find(|header| header.name.eq_ignore_ascii_case(name))
                .map(|header| header.value.clone())
        })
    }
}

#[async_trait]
impl GoogleApi for HttpGoogleApi {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, GoogleApiError> {
        self.token_request(&[
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, GoogleApiError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn get_calendar(&self, token: &str, calendar_id: &str) -> Result<(), GoogleApiError> {
        let url = endpoint(CALENDAR_BASE, &["calendars", calendar_id])?;
        send(self.http.get(url).bearer_auth(token)).await?;
        Ok(())
    }

    async fn create_calendar(
        &self,
        token: &str,
        summary: &str,
        description: &str,
    ) -> Result<String, GoogleApiError> {
        let url = endpoint(CALENDAR_BASE, &["calendars"])?;
        let response = send(
            self.http
                .post(url)
                .bearer_auth(token)
                .json(&json!({ "summary": summary, "description": description })),
        )
        .await?;
        let created: IdOnly = decode(response).await?;
        created
            .id
            .ok_or_else(|| GoogleApiError::Decode("calendar id missing".to_string()))
    }

    async fn patch_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        body: &EventBody,
    ) -> Result<(), GoogleApiError> {
        let url = endpoint(CALENDAR_BASE, &["calendars", calendar_id, "events", event_id])?;
        send(self.http.patch(url).bearer_auth(token).json(body)).await?;
        Ok(())
    }

    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: Option<&str>,
        body: &EventBody,
    ) -> Result<(), GoogleApiError> {
        let url = endpoint(CALENDAR_BASE, &["calendars", calendar_id, "events"])?;
        let mut payload =
            serde_json::to_value(body).map_err(|err| GoogleApiError::Decode(err.to_string()))?;
        if let (Some(id), Some(object)) = (event_id, payload.as_object_mut()) {
            object.insert("id".to_string(), Value::String(id.to_string()));
        }
        send(self.http.post(url).bearer_auth(token).json(&payload)).await?;
        Ok(())
    }

    async fn list_events_tagged(
        &self,
        token: &str,
        calendar_id: &str,
        property: &str,
    ) -> Result<Vec<String>, GoogleApiError> {
        let url = endpoint(CALENDAR_BASE, &["calendars", calendar_id, "events"])?;
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(url.clone())
                .bearer_auth(token)
                .query(&[("privateExtendedProperty", property), ("maxResults", "250")]);
            if let Some(page) = page_token.as_deref() {
                request = request.query(&[("pageToken", page)]);
            }
            let page: EventPage = decode(send(request).await?).await?;
            ids.extend(page.items.into_iter().filter_map(|item| item.id));
            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(ids)
    }

    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), GoogleApiError> {
        let url = endpoint(CALENDAR_BASE, &["calendars", calendar_id, "events", event_id])?;
        send(self.http.delete(url).bearer_auth(token)).await?;
        Ok(())
    }

    async fn send_message(&self, token: &str, raw: &str) -> Result<(), GoogleApiError> {
        let url = endpoint(GMAIL_BASE, &["messages", "send"])?;
        send(self.http.post(url).bearer_auth(token).json(&json!({ "raw": raw }))).await?;
        Ok(())
    }

    async fn create_draft(&self, token: &str, raw: &str) -> Result<String, GoogleApiError> {
        let url = endpoint(GMAIL_BASE, &["drafts"])?;
        let response = send(
            self.http
                .post(url)
                .bearer_auth(token)
                .json(&json!({ "message": { "raw": raw } })),
        )
        .await?;
        let draft: IdOnly = decode(response).await?;
        Ok(draft.id.unwrap_or_default())
    }

    async fn list_messages(
        &self,
        token: &str,
        label: &str,
        max_results: u32,
    ) -> Result<Vec<String>, GoogleApiError> {
        let url = endpoint(GMAIL_BASE, &["messages"])?;
        let max_results = max_results.to_string();
        let response = send(
            self.http
                .get(url)
                .bearer_auth(token)
                .query(&[("maxResults", max_results.as_str()), ("labelIds", label)]),
        )
        .await?;
        let list: MessageList = decode(response).await?;
        Ok(list.messages.into_iter().filter_map(|msg| msg.id).collect())
    }

    async fn message_metadata(
        &self,
        token: &str,
        message_id: &str,
    ) -> Result<GmailMessage, GoogleApiError> {
        let url = endpoint(GMAIL_BASE, &["messages", message_id])?;
        let response = send(self.http.get(url).bearer_auth(token).query(&[
            ("format", "metadata"),
            ("metadataHeaders", "Subject"),
            ("metadataHeaders", "From"),
            ("metadataHeaders", "Date"),
        ]))
        .await?;
        let metadata: MessageMetadata = decode(response).await?;
        Ok(GmailMessage {
            subject: metadata.header("Subject"),
            from: metadata.header("From"),
            date: metadata.header("Date"),
            id: metadata.id,
            snippet: metadata.snippet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_escape_calendar_ids() {
        let url = endpoint(CALENDAR_BASE, &["calendars", "abc@group.calendar.google.com", "events"])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/abc@group.calendar.google.com/events"
        );
        let url = endpoint(CALENDAR_BASE, &["calendars", "a/b"]).expect("url");
        assert!(url.as_str().ends_with("/calendars/a%2Fb"));
    }

    #[test]
    fn error_messages_are_extracted() {
        assert_eq!(
            error_message(r#"{"error":{"code":400,"message":"Invalid resource id value."}}"#),
            Some("Invalid resource id value.".to_string())
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#),
            Some("Bad Request".to_string())
        );
        assert_eq!(error_message("plain text"), None);
    }
}
