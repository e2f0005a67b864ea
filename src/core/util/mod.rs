use std::fmt::Debug;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use http::{
    header::{ACCEPT, CONTENT_TYPE},
    Request, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// Generic HTTP client.
///
/// A trait is used here so that the ledger and asset index clients can run on top of a native
/// or browser HTTP stack, and be driven by canned responses in tests.
#[async_trait]
pub trait AsyncHttpClient: Debug {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

/// POST `body` as JSON to `url` and parse the JSON response.
///
/// Non-2xx responses are errors, with the body included for diagnosis.
pub(crate) async fn post_json<C, B, T>(client: &C, url: &Url, body: &B) -> Result<T>
where
    C: AsyncHttpClient + ?Sized,
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let body = serde_json::to_vec(body).context("unable to serialize request body")?;
    let request = Request::builder()
        .method("POST")
        .uri(url.as_str())
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .body(body)
        .context("unable to construct request")?;

    let response = client.execute(request).await?;

    let status = response.status();
    let Ok(body) = String::from_utf8(response.into_body()) else {
        bail!("failed to parse response as UTF-8 (status: {status})")
    };

    if !status.is_success() {
        bail!("request was unsuccessful (status: {status}): {body}")
    }

    serde_json::from_str(&body).context("unable to parse response body")
}

/// [AsyncHttpClient] over a shared [reqwest::Client] with rustls, used for both the
/// Solana RPC node and the NFT index.
#[derive(Debug)]
pub struct ReqwestClient(reqwest::Client);

impl AsRef<reqwest::Client> for ReqwestClient {
    fn as_ref(&self) -> &reqwest::Client {
        &self.0
    }
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .context("unable to build http_client")
            .map(Self)
    }
}

#[async_trait]
impl AsyncHttpClient for ReqwestClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let response = self
            .0
            .execute(request.try_into().context("unable to convert request")?)
            .await
            .context("http request failed")?;

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());

        builder
            .headers_mut()
            .context("unable to set headers")?
            .extend(response.headers().clone());

        builder
            .body(
                response
                    .bytes()
                    .await
                    .context("failed to extract response body")?
                    .to_vec(),
            )
            .context("unable to construct response")
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use serde_json::{json, Value as Json};

    use super::*;

    #[derive(Debug)]
    struct Canned {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<Request<Vec<u8>>>>,
    }

    #[async_trait]
    impl AsyncHttpClient for Canned {
        async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
            self.seen.lock().unwrap().push(request);
            Ok(Response::builder()
                .status(self.status)
                .body(self.body.as_bytes().to_vec())?)
        }
    }

    #[tokio::test]
    async fn posts_json() {
        let client = Canned {
            status: 200,
            body: r#"{"ok":true}"#,
            seen: Mutex::default(),
        };
        let url: Url = "http://localhost:8899".parse().unwrap();

        let response: Json = post_json(&client, &url, &json!({"hello": "world"}))
            .await
            .unwrap();
        assert_eq!(response, json!({"ok": true}));

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].method(), "POST");
        assert_eq!(seen[0].headers()[CONTENT_TYPE], "application/json");
        assert_eq!(seen[0].body(), br#"{"hello":"world"}"#);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let client = Canned {
            status: 503,
            body: "upstream unavailable",
            seen: Mutex::default(),
        };
        let url: Url = "http://localhost:8899".parse().unwrap();

        let err = post_json::<_, _, Json>(&client, &url, &json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }
}
