use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, Url};

use models::{Debt, DebtPatch, NewDebt, SupabaseSettings};

use crate::error::{Result, StoreError};

/// Store trait for the remote `debts` table.
///
/// `list_debts` returns rows ordered by due date ascending with missing
/// due dates last; the other calls operate on a single row by id.
#[async_trait]
pub trait DebtStore: Send + Sync {
    async fn list_debts(&self) -> Result<Vec<Debt>>;
    async fn insert_debt(&self, debt: NewDebt) -> Result<Debt>;
    async fn update_debt(&self, id: &str, patch: DebtPatch) -> Result<()>;
    async fn delete_debt(&self, id: &str) -> Result<()>;
}

/// Supabase (PostgREST) implementation backed by `{base}/rest/v1/debts`.
pub struct SupabaseStore {
    http: Client,
    table_url: Url,
}

impl SupabaseStore {
    pub fn new(settings: &SupabaseSettings) -> Result<Self> {
        let table_url = debts_table_url(&settings.url)?;

        let key = HeaderValue::from_str(&settings.anon_key)
            .map_err(|_| StoreError::Config("anon key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.anon_key))
            .map_err(|_| StoreError::Config("anon key is not a valid header value".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self { http, table_url })
    }

    fn list_url(&self) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "data_limite.asc.nullslast");
        url
    }

    fn row_url(&self, id: &str) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        tracing::warn!(status = status.as_u16(), %message, "store call rejected");
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DebtStore for SupabaseStore {
    async fn list_debts(&self) -> Result<Vec<Debt>> {
        let url = self.list_url();
        tracing::debug!(%url, "fetching debts");

        let response = self.http.get(url).send().await?;
        let debts = Self::check(response).await?.json::<Vec<Debt>>().await?;
        Ok(debts)
    }

    async fn insert_debt(&self, debt: NewDebt) -> Result<Debt> {
        tracing::debug!(descricao = %debt.descricao, "inserting debt");

        let response = self
            .http
            .post(self.table_url.clone())
            .header("Prefer", "return=representation")
            .json(&debt)
            .send()
            .await?;

        let mut rows = Self::check(response).await?.json::<Vec<Debt>>().await?;
        rows.pop()
            .ok_or_else(|| StoreError::Invalid("insert returned no rows".to_string()))
    }

    async fn update_debt(&self, id: &str, patch: DebtPatch) -> Result<()> {
        tracing::debug!(%id, "updating debt");

        let response = self.http.patch(self.row_url(id)).json(&patch).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_debt(&self, id: &str) -> Result<()> {
        tracing::debug!(%id, "deleting debt");

        let response = self.http.delete(self.row_url(id)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

fn debts_table_url(base_url: &str) -> Result<Url> {
    let base = Url::parse(base_url)
        .map_err(|e| StoreError::Config(format!("invalid Supabase URL '{base_url}': {e}")))?;

    if base.host_str().is_none() {
        return Err(StoreError::Config(format!(
            "Supabase URL '{base_url}' is missing a host"
        )));
    }

    base.join("rest/v1/debts")
        .map_err(|e| StoreError::Config(format!("cannot build table URL from '{base_url}': {e}")))
}

/// PostgREST error bodies carry a `message` field; anything else is
/// surfaced raw so the user still sees the detail.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
