//! Reddit OAuth API client
//!
//! This module implements [`RedditApi`] over HTTPS, including:
//! - Application-only OAuth (client-credentials grant)
//! - Cursor pagination of `/r/{sub}/new`
//! - Comment forest loading sorted by top score
//! - Stub expansion via `/api/morechildren` and thread continuations

use crate::config::{ApiConfig, Credentials};
use crate::reddit::wire::{
    assemble_more_children, replies_of, split_stub, Listing, MoreChildrenResponse, Thing,
};
use crate::reddit::{ApiError, ApiResult, MoreStub, Post, RedditApi, Reply};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Largest page `/r/{sub}/new` serves
const MAX_PAGE_SIZE: u32 = 100;

/// Comment sort requested from every comment endpoint
const COMMENT_SORT: &str = "top";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// An authenticated Reddit API client
#[derive(Debug)]
pub struct RedditClient {
    http: Client,
    base_url: String,
    token: String,
}

impl RedditClient {
    /// Builds an HTTP client and obtains an application-only access token
    ///
    /// # Arguments
    ///
    /// * `api` - Endpoints and timeout
    /// * `credentials` - Application id, secret and user agent
    ///
    /// # Returns
    ///
    /// * `Ok(RedditClient)` - Client ready for API calls
    /// * `Err(HarvestError::Authentication)` - The credentials were rejected
    /// * `Err(HarvestError::Client)` - The HTTP client could not be built
    pub async fn connect(api: &ApiConfig, credentials: &Credentials) -> Result<Self, HarvestError> {
        let http = build_http_client(api, &credentials.user_agent)?;
        let token = fetch_token(&http, &api.auth_url, credentials).await?;
        tracing::debug!("Obtained access token from {}", api.auth_url);

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Sends an authenticated GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .query(&[("raw_json", "1")])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Auth(format!("token rejected by {}", url)));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// Loads the reply forest of a single comment (thread continuation)
    async fn load_continuation(&self, post: &Post, stub: &MoreStub) -> ApiResult<Vec<Reply>> {
        let comment_id = stub
            .parent_id
            .strip_prefix("t1_")
            .unwrap_or(&stub.parent_id)
            .to_string();

        let (_, comments): (Listing, Listing) = self
            .get_json(
                &format!("/comments/{}", post.id),
                &[
                    ("comment", comment_id.clone()),
                    ("sort", COMMENT_SORT.to_string()),
                ],
            )
            .await?;

        // The focused comment is the root of the returned forest
        let focus = replies_of(comments).into_iter().find_map(|reply| match reply {
            Reply::Comment(node) if node.id == comment_id => Some(node),
            _ => None,
        });

        Ok(focus.map(|node| node.replies).unwrap_or_default())
    }

    /// Loads the comments listed by a stub's child ids
    async fn load_more_children(&self, post: &Post, stub: &MoreStub) -> ApiResult<Vec<Reply>> {
        let (batch, rest) = split_stub(stub);
        let path = "/api/morechildren";

        let response: MoreChildrenResponse = self
            .get_json(
                path,
                &[
                    ("api_type", "json".to_string()),
                    ("link_id", post.fullname()),
                    ("children", batch.join(",")),
                    ("sort", COMMENT_SORT.to_string()),
                ],
            )
            .await?;

        if !response.json.errors.is_empty() {
            return Err(ApiError::Decode {
                url: format!("{}{}", self.base_url, path),
                message: format!("morechildren errors: {:?}", response.json.errors),
            });
        }

        let things = response.json.data.map(|d| d.things).unwrap_or_default();
        let mut forest = assemble_more_children(things, &stub.parent_id);

        // Ids beyond one batch come back as a fresh stub for a later round
        if let Some(rest) = rest {
            forest.push(Reply::More(rest));
        }

        Ok(forest)
    }
}

#[async_trait]
impl RedditApi for RedditClient {
    async fn list_recent_posts(&self, source: &str, limit: u32) -> ApiResult<Vec<Post>> {
        let path = format!("/r/{}/new", source);
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        while (posts.len() as u32) < limit {
            let page_size = (limit - posts.len() as u32).min(MAX_PAGE_SIZE);
            let mut query = vec![("limit", page_size.to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let listing: Listing = self.get_json(&path, &query).await?;
            let fetched = listing.data.children.len();

            for thing in listing.data.children {
                if let Thing::Link(link) = thing {
                    let post = link.into_post().ok_or_else(|| ApiError::Decode {
                        url: format!("{}{}", self.base_url, path),
                        message: "post timestamp out of range".to_string(),
                    })?;
                    posts.push(post);
                }
            }

            after = listing.data.after;
            if fetched == 0 || after.is_none() {
                break;
            }
        }

        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn load_replies(&self, post: &Post) -> ApiResult<Vec<Reply>> {
        let (_, comments): (Listing, Listing) = self
            .get_json(
                &format!("/comments/{}", post.id),
                &[("sort", COMMENT_SORT.to_string())],
            )
            .await?;

        Ok(replies_of(comments))
    }

    async fn expand_replies(&self, post: &Post, stub: &MoreStub) -> ApiResult<Vec<Reply>> {
        if stub.is_continuation() {
            self.load_continuation(post, stub).await
        } else {
            self.load_more_children(post, stub).await
        }
    }
}

/// Builds an HTTP client with the configured user agent and timeout
///
/// Redirects are not followed: Reddit answers a request for a missing
/// subreddit with a redirect to its search page.
pub fn build_http_client(api: &ApiConfig, user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(api.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Exchanges application credentials for a bearer token
async fn fetch_token(
    http: &Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<String, HarvestError> {
    let url = format!("{}/api/v1/access_token", auth_url.trim_end_matches('/'));

    let response = http
        .post(&url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| HarvestError::Authentication(format!("token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Authentication(format!(
            "token endpoint answered HTTP {}",
            status.as_u16()
        )));
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| HarvestError::Authentication(format!("unreadable token response: {}", e)))?;

    match (body.access_token, body.error) {
        (Some(token), None) if !token.is_empty() => Ok(token),
        (_, Some(error)) => Err(HarvestError::Authentication(error)),
        _ => Err(HarvestError::Authentication(
            "token response carried no access token".to_string(),
        )),
    }
}
