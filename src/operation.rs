//! Item parameters, operation dispatch and request building.

use crate::enrich::Resource;
use crate::error::NodeError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetCollection,
    GetCompany,
    GetMovie,
    GetMovieList,
    GetPerson,
    GetTv,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::GetCollection,
        Operation::GetCompany,
        Operation::GetMovie,
        Operation::GetMovieList,
        Operation::GetPerson,
        Operation::GetTv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetCollection => "get_collection",
            Operation::GetCompany => "get_company",
            Operation::GetMovie => "get_movie",
            Operation::GetMovieList => "get_movie_list",
            Operation::GetPerson => "get_person",
            Operation::GetTv => "get_tv",
        }
    }

    /// Which enrichment table applies to this operation's response.
    pub fn resource(self) -> Resource {
        match self {
            Operation::GetCollection => Resource::Collection,
            Operation::GetCompany => Resource::Company,
            Operation::GetMovie => Resource::Movie,
            Operation::GetMovieList => Resource::MovieList,
            Operation::GetPerson => Resource::Person,
            Operation::GetTv => Resource::Tv,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| NodeError::config(format!("unknown operation '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieListType {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl MovieListType {
    pub fn as_str(self) -> &'static str {
        match self {
            MovieListType::NowPlaying => "now_playing",
            MovieListType::Popular => "popular",
            MovieListType::TopRated => "top_rated",
            MovieListType::Upcoming => "upcoming",
        }
    }
}

impl FromStr for MovieListType {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "now_playing" => Ok(MovieListType::NowPlaying),
            "popular" => Ok(MovieListType::Popular),
            "top_rated" => Ok(MovieListType::TopRated),
            "upcoming" => Ok(MovieListType::Upcoming),
            other => Err(NodeError::config(format!(
                "unknown movie_list_type '{other}' (expected now_playing, popular, top_rated or upcoming)"
            ))),
        }
    }
}

/// Parameters of one input item. Everything is optional here; what an
/// operation actually needs is checked in [`Request::from_params`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemParams {
    pub operation: Option<String>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub movie_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub tv_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub person_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub company_id: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub collection_id: Option<u64>,
    pub append_to_response: Option<String>,
    pub movie_append_to_response: Option<String>,
    pub tv_append_to_response: Option<String>,
    pub person_append_to_response: Option<String>,
    pub collection_append_to_response: Option<String>,
    pub movie_list_type: Option<String>,
    #[serde(default, deserialize_with = "de_opt_number")]
    pub page: Option<u64>,
    pub region: Option<String>,
}

impl ItemParams {
    pub fn from_value(value: &Value) -> Result<Self, NodeError> {
        if !value.is_object() {
            return Err(NodeError::config("item parameters must be a JSON object"));
        }
        serde_json::from_value(value.clone()).map_err(|e| NodeError::config(e.to_string()))
    }

    fn language(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// The resource-prefixed value wins over the generic one. Company and
    /// list lookups never carry `append_to_response`.
    fn append_for(&self, op: Operation) -> Option<&str> {
        let specific = match op {
            Operation::GetMovie => self.movie_append_to_response.as_deref(),
            Operation::GetTv => self.tv_append_to_response.as_deref(),
            Operation::GetPerson => self.person_append_to_response.as_deref(),
            Operation::GetCollection => self.collection_append_to_response.as_deref(),
            Operation::GetCompany | Operation::GetMovieList => return None,
        };
        specific
            .filter(|s| !s.is_empty())
            .or(self.append_to_response.as_deref())
            .filter(|s| !s.is_empty())
    }
}

fn de_opt_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let invalid = |got: &dyn fmt::Display| {
        D::Error::custom(format!("expected a non-negative integer, got '{got}'"))
    };

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid(&s)),
        // JSON clients often send ids as whole floats (`42.0`).
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(Some)
            .ok_or_else(|| invalid(&n)),
        Some(other) => Err(invalid(&other)),
    }
}

/// One outbound TMDB call: the operation it serves and the path plus query
/// relative to the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Request {
    pub fn from_params(params: &ItemParams) -> Result<Self, NodeError> {
        let operation: Operation = params
            .operation
            .as_deref()
            .ok_or_else(|| NodeError::config("missing parameter 'operation'"))?
            .parse()?;
        let language = params.language().to_string();

        let (path, mut query) = match operation {
            Operation::GetMovieList => {
                let list: MovieListType = params
                    .movie_list_type
                    .as_deref()
                    .ok_or_else(|| NodeError::config("missing parameter 'movie_list_type'"))?
                    .parse()?;
                let page = params.page.unwrap_or(1);
                if page == 0 {
                    return Err(NodeError::config("parameter 'page' must be at least 1"));
                }
                let mut query = vec![("language", language), ("page", page.to_string())];
                if let Some(region) = params.region.as_deref().filter(|r| !r.is_empty()) {
                    query.push(("region", region.to_string()));
                }
                (format!("/movie/{}", list.as_str()), query)
            }
            Operation::GetCompany => {
                let id = require_id(params.company_id, "company_id")?;
                (format!("/company/{id}"), vec![("language", language)])
            }
            Operation::GetCollection => {
                let id = require_id(params.collection_id, "collection_id")?;
                (format!("/collection/{id}"), vec![("language", language)])
            }
            Operation::GetMovie => {
                let id = require_id(params.movie_id, "movie_id")?;
                (format!("/movie/{id}"), vec![("language", language)])
            }
            Operation::GetPerson => {
                let id = require_id(params.person_id, "person_id")?;
                (format!("/person/{id}"), vec![("language", language)])
            }
            Operation::GetTv => {
                let id = require_id(params.tv_id, "tv_id")?;
                (format!("/tv/{id}"), vec![("language", language)])
            }
        };

        if let Some(append) = params.append_for(operation) {
            query.push(("append_to_response", append.to_string()));
        }

        Ok(Request {
            operation,
            path,
            query,
        })
    }

    /// Path and query string as sent, values copied verbatim.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

fn require_id(id: Option<u64>, name: &str) -> Result<u64, NodeError> {
    id.ok_or_else(|| NodeError::config(format!("missing parameter '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(params: Value) -> Result<Request, NodeError> {
        Request::from_params(&ItemParams::from_value(&params)?)
    }

    #[test]
    fn parses_every_operation_token() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        let err = "get_episode".parse::<Operation>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("get_episode"));
    }

    #[test]
    fn movie_detail_url_with_append() {
        let req = request(json!({
            "operation": "get_movie",
            "movie_id": 42,
            "language": "fr",
            "append_to_response": "credits,images"
        }))
        .unwrap();
        assert_eq!(req.operation.resource(), Resource::Movie);
        assert_eq!(
            req.path_and_query(),
            "/movie/42?language=fr&append_to_response=credits,images"
        );
    }

    #[test]
    fn language_defaults_to_english_and_empty_append_is_dropped() {
        let req = request(json!({
            "operation": "get_tv",
            "tv_id": "1399",
            "language": "",
            "tv_append_to_response": ""
        }))
        .unwrap();
        assert_eq!(req.path_and_query(), "/tv/1399?language=en");
    }

    #[test]
    fn resource_specific_append_wins() {
        let req = request(json!({
            "operation": "get_person",
            "person_id": 287,
            "append_to_response": "images",
            "person_append_to_response": "combined_credits"
        }))
        .unwrap();
        assert_eq!(
            req.path_and_query(),
            "/person/287?language=en&append_to_response=combined_credits"
        );
    }

    #[test]
    fn company_and_list_ignore_append() {
        let req = request(json!({
            "operation": "get_company",
            "company_id": 1,
            "append_to_response": "images"
        }))
        .unwrap();
        assert_eq!(req.path_and_query(), "/company/1?language=en");

        let req = request(json!({
            "operation": "get_movie_list",
            "movie_list_type": "popular",
            "append_to_response": "images",
            "movie_append_to_response": "credits"
        }))
        .unwrap();
        assert_eq!(req.path_and_query(), "/movie/popular?language=en&page=1");
    }

    #[test]
    fn whole_float_ids_are_accepted() {
        let req = request(json!({ "operation": "get_movie", "movie_id": 42.0 })).unwrap();
        assert_eq!(req.path_and_query(), "/movie/42?language=en");

        let req = request(json!({
            "operation": "get_movie_list",
            "movie_list_type": "upcoming",
            "page": 2.0
        }))
        .unwrap();
        assert_eq!(req.path_and_query(), "/movie/upcoming?language=en&page=2");
    }

    #[test]
    fn bad_ids_name_the_expected_type() {
        for bad in [json!(42.5), json!(-1), json!("4x"), json!(true), json!([1])] {
            let err = request(json!({ "operation": "get_movie", "movie_id": bad.clone() }))
                .unwrap_err();
            assert!(err.is_config());
            assert!(
                err.to_string().contains("expected a non-negative integer"),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn collection_url() {
        let req = request(json!({
            "operation": "get_collection",
            "collection_id": 10,
            "collection_append_to_response": "images"
        }))
        .unwrap();
        assert_eq!(
            req.path_and_query(),
            "/collection/10?language=en&append_to_response=images"
        );
    }

    #[test]
    fn movie_list_url() {
        let req = request(json!({
            "operation": "get_movie_list",
            "movie_list_type": "now_playing",
            "page": "3",
            "region": "GB"
        }))
        .unwrap();
        assert_eq!(
            req.path_and_query(),
            "/movie/now_playing?language=en&page=3&region=GB"
        );

        let req = request(json!({ "operation": "get_movie_list", "movie_list_type": "top_rated" }))
            .unwrap();
        assert_eq!(req.path_and_query(), "/movie/top_rated?language=en&page=1");
    }

    #[test]
    fn configuration_errors() {
        let cases = [
            json!({}),
            json!({ "operation": "get_movie" }),
            json!({ "operation": "get_movie", "movie_id": "abc" }),
            json!({ "operation": "get_movie", "movie_id": -4 }),
            json!({ "operation": "get_movie_list" }),
            json!({ "operation": "get_movie_list", "movie_list_type": "trending" }),
            json!({ "operation": "get_movie_list", "movie_list_type": "popular", "page": 0 }),
            json!({ "operation": "search" }),
            json!("get_movie"),
        ];
        for case in cases {
            let err = request(case.clone()).unwrap_err();
            assert!(err.is_config(), "{case}: {err}");
        }
    }
}
