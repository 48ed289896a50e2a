//! Query and document clients.
//!
//! The clients turn builders into requests and hand them to a transport.
//! Transports implement [`SearchService`] or [`DocumentService`]; signing,
//! retries and HTTP belong to the transport and are not part of this crate.

use crate::config::ClientConfig;
use crate::document::DocumentBatch;
use crate::error::Result;
use crate::query::{QueryParams, SearchQuery};

/// Executes search requests.
pub trait SearchService {
    /// Response type produced by the service.
    type Response;

    /// Execute a single search.
    fn search(&self, params: &QueryParams) -> Result<Self::Response>;

    /// Execute several searches.
    ///
    /// The default implementation runs them one after another and stops at
    /// the first failure.
    fn search_many(&self, batch: &[QueryParams]) -> Result<Vec<Self::Response>> {
        batch.iter().map(|params| self.search(params)).collect()
    }
}

/// Uploads document batches.
pub trait DocumentService {
    /// Response type produced by the service.
    type Response;

    /// Send a batch of document operations.
    fn send_batch(&self, batch: &DocumentBatch) -> Result<Self::Response>;
}

/// A query handed to a [`QueryClient`].
#[derive(Debug, Clone)]
pub enum QueryRequest {
    /// A builder, built when the request is dispatched.
    Query(SearchQuery),
    /// A parameter mapping passed through as is.
    Params(QueryParams),
}

impl QueryRequest {
    /// Resolve the request to its parameter mapping.
    pub fn into_params(self) -> Result<QueryParams> {
        match self {
            QueryRequest::Query(query) => query.build(),
            QueryRequest::Params(params) => Ok(params),
        }
    }
}

impl From<SearchQuery> for QueryRequest {
    fn from(query: SearchQuery) -> Self {
        QueryRequest::Query(query)
    }
}

impl From<&SearchQuery> for QueryRequest {
    fn from(query: &SearchQuery) -> Self {
        QueryRequest::Query(query.clone())
    }
}

impl From<QueryParams> for QueryRequest {
    fn from(params: QueryParams) -> Self {
        QueryRequest::Params(params)
    }
}

/// Client for the search endpoint.
///
/// ```
/// use cloudsearch_query::client::{QueryClient, SearchService};
/// use cloudsearch_query::error::Result;
/// use cloudsearch_query::query::QueryParams;
///
/// struct Echo;
///
/// impl SearchService for Echo {
///     type Response = String;
///
///     fn search(&self, params: &QueryParams) -> Result<String> {
///         Ok(params.to_query_string())
///     }
/// }
///
/// let client = QueryClient::new(Echo);
/// let mut query = client.new_query();
/// query.q("dune");
/// assert_eq!(client.query(query).unwrap(), "q=dune");
/// ```
#[derive(Debug)]
pub struct QueryClient<S> {
    service: S,
    config: Option<ClientConfig>,
}

impl<S: SearchService> QueryClient<S> {
    /// Create a client over a search service.
    pub fn new(service: S) -> Self {
        QueryClient {
            service,
            config: None,
        }
    }

    /// Create a client that also knows its endpoint settings.
    pub fn with_config(service: S, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(QueryClient {
            service,
            config: Some(config),
        })
    }

    /// Get the endpoint settings, if any.
    pub fn config(&self) -> Option<&ClientConfig> {
        self.config.as_ref()
    }

    /// Get the underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Start a new query.
    pub fn new_query(&self) -> SearchQuery {
        SearchQuery::new()
    }

    /// Run one query.
    pub fn query<R: Into<QueryRequest>>(&self, request: R) -> Result<S::Response> {
        let params = request.into().into_params()?;
        log::debug!("dispatching search with {} parameters", params.len());
        self.service.search(&params)
    }

    /// Run several queries.
    ///
    /// Every request is resolved before anything is dispatched, so a builder
    /// that fails to build aborts the whole batch.
    pub fn multi_query<I, R>(&self, requests: I) -> Result<Vec<S::Response>>
    where
        I: IntoIterator<Item = R>,
        R: Into<QueryRequest>,
    {
        let batch = requests
            .into_iter()
            .map(|request| request.into().into_params())
            .collect::<Result<Vec<_>>>()?;
        log::debug!("dispatching {} searches", batch.len());
        self.service.search_many(&batch)
    }
}

/// Client for the document batch endpoint.
#[derive(Debug)]
pub struct DocClient<S> {
    service: S,
}

impl<S: DocumentService> DocClient<S> {
    /// Create a client over a document service.
    pub fn new(service: S) -> Self {
        DocClient { service }
    }

    /// Get the underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Upload a batch.
    pub fn upload(&self, batch: &DocumentBatch) -> Result<S::Response> {
        batch.ensure_not_empty()?;
        log::debug!(
            "uploading batch: {} adds, {} deletes",
            batch.adds(),
            batch.deletes()
        );
        self.service.send_batch(batch)
    }
}
