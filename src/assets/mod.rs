use std::{fmt::Debug, sync::Arc};

use anyhow::{bail, Result};
use async_trait::async_trait;
use banana_magic_frontend::NftAsset;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::{
    address::PublicAddress,
    util::{post_json, AsyncHttpClient},
};

/// The only page that is ever requested.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const GET_NFTS: &str = "query GetNfts($owners: [PublicKey!], $limit: Int!, $offset: Int!) {
  nfts(owners: $owners, limit: $limit, offset: $offset) {
    address
    mintAddress
    name
    description
    image
  }
}";

/// Variables of the `GetNfts` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftQuery {
    pub owners: Vec<PublicAddress>,
    pub limit: u32,
    pub offset: u32,
}

impl NftQuery {
    /// First page of NFTs held by `owner`.
    pub fn owned_by(owner: PublicAddress) -> Self {
        Self {
            owners: vec![owner],
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// NFT indexing service.
#[async_trait]
pub trait AssetIndex: Debug {
    /// NFTs matching `query`, in the order the index returns them.
    async fn get_nfts(&self, query: &NftQuery) -> Result<Vec<NftAsset>>;
}

/// An [AssetIndex] backed by a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct GraphQlAssetIndex {
    http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    endpoint: Url,
}

impl GraphQlAssetIndex {
    pub fn new(http_client: Arc<dyn AsyncHttpClient + Send + Sync>, endpoint: Url) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }
}

#[async_trait]
impl AssetIndex for GraphQlAssetIndex {
    async fn get_nfts(&self, query: &NftQuery) -> Result<Vec<NftAsset>> {
        let request = GraphQlRequest {
            operation_name: "GetNfts",
            query: GET_NFTS,
            variables: query,
        };
        let response: GraphQlResponse<NftsData> =
            post_json(self.http_client.as_ref(), &self.endpoint, &request).await?;

        if let Some(error) = response.errors.first() {
            bail!(
                "GetNfts failed: {} ({} errors)",
                error.message,
                response.errors.len()
            )
        }

        let Some(data) = response.data else {
            bail!("GetNfts response has no data")
        };

        Ok(data.nfts)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    operation_name: &'static str,
    query: &'static str,
    variables: &'a NftQuery,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct NftsData {
    #[serde(default)]
    nfts: Vec<NftAsset>,
}
