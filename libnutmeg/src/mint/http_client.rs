use crate::amount::Amount;
use crate::config::WalletConfig;
use crate::mint::data_objects::{
    CheckFeesRequest, CheckFeesResponse, MeltRequest, MeltResponse, PostMintRequest, PostMintResponse,
    RequestMintResponse, SplitRequest, SplitResponse,
};
use crate::mint::{MintConnector, MintError};
use crate::proofs::{BlindedMessage, Keys};
use log::{debug, trace};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A [`MintConnector`] talking to a mint over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpMintClient {
    base_url: String,
    client: Client,
}

impl HttpMintClient {
    pub fn new(config: &WalletConfig) -> Result<Self, MintError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let base_url = config.mint_url.trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, MintError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!("Mint replied with status {status}: {body}");
        let value = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => return Err(MintError::Transport(format!("HTTP status {status}"))),
            Err(err) => return Err(MintError::InvalidResponse(format!("response is not JSON: {err}"))),
        };
        let value = check_mint_error(value)?;
        if !status.is_success() {
            return Err(MintError::Transport(format!("HTTP status {status}")));
        }
        serde_json::from_value(value).map_err(|e| MintError::InvalidResponse(e.to_string()))
    }
}

/// Any JSON object carrying an `error` field is a mint-level failure, whatever the transport status.
pub(crate) fn check_mint_error(value: Value) -> Result<Value, MintError> {
    let Some(error) = value.get("error") else {
        return Ok(value);
    };
    let code = value.get("code").and_then(Value::as_i64).unwrap_or_default();
    let error = error.as_str().map(String::from).unwrap_or_else(|| error.to_string());
    debug!("Mint returned error {code}: {error}");
    Err(MintError::Protocol { code, error })
}

impl MintConnector for HttpMintClient {
    async fn get_keys(&self) -> Result<Keys, MintError> {
        debug!("GET {}/keys", self.base_url);
        self.execute(self.client.get(self.url("keys"))).await
    }

    async fn request_mint(&self, amount: Amount) -> Result<RequestMintResponse, MintError> {
        debug!("GET {}/mint?amount={}", self.base_url, amount.to_sat());
        let request = self.client.get(self.url("mint")).query(&[("amount", amount.to_sat())]);
        self.execute(request).await
    }

    async fn mint(&self, outputs: Vec<BlindedMessage>, payment_hash: &str) -> Result<PostMintResponse, MintError> {
        debug!("POST {}/mint with {} outputs", self.base_url, outputs.len());
        let body = PostMintRequest { outputs };
        let request = self.client.post(self.url("mint")).query(&[("payment_hash", payment_hash)]).json(&body);
        self.execute(request).await
    }

    async fn split(&self, request: SplitRequest) -> Result<SplitResponse, MintError> {
        debug!(
            "POST {}/split with {} proofs and {} outputs",
            self.base_url,
            request.proofs.len(),
            request.outputs.len()
        );
        self.execute(self.client.post(self.url("split")).json(&request)).await
    }

    async fn melt(&self, request: MeltRequest) -> Result<MeltResponse, MintError> {
        debug!("POST {}/melt for {}", self.base_url, request.amount);
        self.execute(self.client.post(self.url("melt")).json(&request)).await
    }

    async fn check_fees(&self, invoice: &str) -> Result<CheckFeesResponse, MintError> {
        debug!("POST {}/checkfees", self.base_url);
        let body = CheckFeesRequest { pr: invoice.to_string() };
        self.execute(self.client.post(self.url("checkfees")).json(&body)).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_is_a_mint_error() {
        let err = check_mint_error(json!({"code": 11001, "error": "tokens already spent."})).unwrap_err();
        assert_eq!(err, MintError::Protocol { code: 11001, error: "tokens already spent.".into() });
        assert_eq!(err.to_string(), "Mint error (code 11001): tokens already spent.");
    }

    #[test]
    fn error_without_code() {
        let err = check_mint_error(json!({"error": {"detail": "nope"}})).unwrap_err();
        assert_eq!(err, MintError::Protocol { code: 0, error: r#"{"detail":"nope"}"#.into() });
    }

    #[test]
    fn regular_bodies_pass_through() {
        let body = json!({"paid": true});
        assert_eq!(check_mint_error(body.clone()).unwrap(), body);
        let keys = json!({"1": "02a9acc1e48c25eeeb9289b5031cc57da9fe72f3fe2861d264bdc074209b107ba2"});
        assert_eq!(check_mint_error(keys.clone()).unwrap(), keys);
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let config = WalletConfig::new("http://localhost:3338/", "wallet.json".into());
        let client = HttpMintClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3338");
        assert_eq!(client.url("keys"), "http://localhost:3338/keys");
    }

    #[tokio::test]
    async fn unreachable_mint_is_a_transport_error() {
        // Port 9 (discard) is not expected to host a mint
        let config = WalletConfig::new("http://127.0.0.1:9", "wallet.json".into());
        let client = HttpMintClient::new(&config).unwrap();
        let err = client.get_keys().await.unwrap_err();
        assert!(matches!(err, MintError::Transport(_)));
    }
}
