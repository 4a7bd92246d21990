use serde::{Deserialize, Serialize};

use crate::error::FacetError;

pub const FACET_TYPE: &str = "term_list";
pub const DEFAULT_FACET_NAME: &str = "term_list";
pub const DEFAULT_MAX_PER_SHARD: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Prefix,
    Contains,
}

/// Неизменяемый запрос фасета; одна копия рассылается по всем партициям.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
    name: String,
    fields: Vec<String>,
    search_term: Option<String>,
    match_mode: MatchMode,
    case_insensitive: bool,
    max_terms_per_partition: i64,
    sort_result: bool,
}

impl FacetRequest {
    pub fn builder<I, S>(fields: I) -> FacetRequestBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FacetRequestBuilder {
            name: DEFAULT_FACET_NAME.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
            search_term: None,
            match_mode: MatchMode::Contains,
            case_insensitive: true,
            max_terms_per_partition: DEFAULT_MAX_PER_SHARD,
            sort_result: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn max_terms_per_partition(&self) -> i64 {
        self.max_terms_per_partition
    }

    /// Кап в виде usize; `<= 0` превращается в 0 («ничего не собирать»).
    pub fn partition_cap(&self) -> usize {
        usize::try_from(self.max_terms_per_partition.max(0)).unwrap_or(usize::MAX)
    }

    pub fn sort_result(&self) -> bool {
        self.sort_result
    }
}

pub struct FacetRequestBuilder {
    name: String,
    fields: Vec<String>,
    search_term: Option<String>,
    match_mode: MatchMode,
    case_insensitive: bool,
    max_terms_per_partition: i64,
    sort_result: bool,
}

impl FacetRequestBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search_term = Some(search.into());
        self
    }

    pub fn search_opt(mut self, search: Option<String>) -> Self {
        self.search_term = search;
        self
    }

    pub fn prefix(mut self, prefix: bool) -> Self {
        self.match_mode = if prefix {
            MatchMode::Prefix
        } else {
            MatchMode::Contains
        };
        self
    }

    pub fn case_insensitive(mut self, ci: bool) -> Self {
        self.case_insensitive = ci;
        self
    }

    pub fn max_per_partition(mut self, max: i64) -> Self {
        self.max_terms_per_partition = max;
        self
    }

    pub fn sort(mut self, sort: bool) -> Self {
        self.sort_result = sort;
        self
    }

    /// `fields` обязателен и не пуст.
    pub fn build(self) -> Result<FacetRequest, FacetError> {
        if self.fields.is_empty() {
            return Err(FacetError::invalid_configuration(self.name));
        }
        Ok(FacetRequest {
            name: self.name,
            fields: self.fields,
            search_term: self.search_term,
            match_mode: self.match_mode,
            case_insensitive: self.case_insensitive,
            max_terms_per_partition: self.max_terms_per_partition,
            sort_result: self.sort_result,
        })
    }
}

/// JSON-форма запроса, как её присылает клиент.
/// `case_insenstive`: устаревшее написание ключа, принимаем как алиас.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetSpec {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub prefix: bool,
    #[serde(default = "default_true", alias = "case_insenstive")]
    pub case_insensitive: bool,
    #[serde(default = "default_true")]
    pub sort: bool,
    /// Не задан: берётся умолчание узла (см. `into_request_with`).
    #[serde(default)]
    pub max_per_shard: Option<i64>,
}

fn default_name() -> String {
    DEFAULT_FACET_NAME.to_string()
}
fn default_true() -> bool {
    true
}

impl FacetSpec {
    pub fn into_request(self) -> Result<FacetRequest, FacetError> {
        self.into_request_with(DEFAULT_MAX_PER_SHARD)
    }

    pub fn into_request_with(self, default_max_per_shard: i64) -> Result<FacetRequest, FacetError> {
        let max = self.max_per_shard.unwrap_or(default_max_per_shard);
        FacetRequest::builder(self.fields)
            .name(self.name)
            .search_opt(self.search)
            .prefix(self.prefix)
            .case_insensitive(self.case_insensitive)
            .max_per_partition(max)
            .sort(self.sort)
            .build()
    }
}
