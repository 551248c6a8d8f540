use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use core_types::{Note, NoteInput, NotesGateway, RequestError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const JSON: &str = "application/json";

/// [`NotesGateway`] over the REST endpoints rooted at a base URL.
pub struct HttpNotesGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpNotesGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn notes_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("notes");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "notes request");
        self.client
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "notes request did not complete");
            RequestError::new(err.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "failed to read rejected response body");
                String::new()
            }
        };
        warn!(status = status.as_u16(), "notes request rejected");
        Err(RequestError::from_status(status.as_u16(), &body))
    }
}

#[async_trait]
impl NotesGateway for HttpNotesGateway {
    async fn list(&self) -> Result<Vec<Note>, RequestError> {
        let response = self
            .send(self.request(Method::GET, self.notes_url(None)))
            .await?;
        decode_json(response).await
    }

    async fn create(&self, title: &str, content: &str) -> Result<Note, RequestError> {
        let body = NoteInput::new(title, content);
        let response = self
            .send(self.request(Method::POST, self.notes_url(None)).json(&body))
            .await?;
        decode_json(response).await
    }

    async fn update(&self, id: &str, title: &str, content: &str) -> Result<Note, RequestError> {
        let body = NoteInput::new(title, content);
        let response = self
            .send(self.request(Method::PUT, self.notes_url(Some(id))).json(&body))
            .await?;
        decode_json(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), RequestError> {
        let response = self
            .send(self.request(Method::DELETE, self.notes_url(Some(id))))
            .await?;
        if response.status() != StatusCode::NO_CONTENT {
            debug!(status = response.status().as_u16(), "ignoring delete response body");
        }
        Ok(())
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
    let text = response
        .text()
        .await
        .map_err(|err| RequestError::new(err.to_string()))?;
    serde_json::from_str(&text).map_err(|err| {
        warn!(error = %err, "notes response is not valid json");
        RequestError::new(format!("invalid response body: {err}"))
    })
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid base url `{raw}`"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("base url must use http or https: {url}");
    }
    if url.cannot_be_a_base() {
        bail!("base url cannot carry paths: {url}");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_and_item_urls() {
        let gateway = HttpNotesGateway::new("http://localhost:3000").expect("gateway");
        assert_eq!(
            gateway.notes_url(None).as_str(),
            "http://localhost:3000/notes"
        );
        assert_eq!(
            gateway.notes_url(Some("42")).as_str(),
            "http://localhost:3000/notes/42"
        );
    }

    #[test]
    fn keeps_base_path_and_tolerates_trailing_slash() {
        let gateway = HttpNotesGateway::new("https://example.com/api/").expect("gateway");
        assert_eq!(
            gateway.notes_url(Some("a1")).as_str(),
            "https://example.com/api/notes/a1"
        );
    }

    #[test]
    fn escapes_identifiers() {
        let gateway = HttpNotesGateway::new("http://localhost:3000").expect("gateway");
        assert_eq!(
            gateway.notes_url(Some("a/b c")).as_str(),
            "http://localhost:3000/notes/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(HttpNotesGateway::new("localhost:3000").is_err());
        assert!(HttpNotesGateway::new("ftp://example.com").is_err());
        assert!(HttpNotesGateway::new("not a url").is_err());
    }
}
