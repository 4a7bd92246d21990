use std::borrow::Cow;

use crate::request::{FacetRequest, MatchMode};

/// Единое правило свёртки регистра: простой Unicode lowercase, без локали.
/// Одинаково на всех партициях и машинах.
///
/// Посимвольно, без учёта контекста: Σ всегда становится σ, даже в конце слова.
pub fn fold_case(s: &str) -> Cow<'_, str> {
    if !s.is_ascii() {
        return Cow::Owned(s.chars().flat_map(char::to_lowercase).collect());
    }
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(s.to_ascii_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

/// Разовая проверка; на горячем пути используйте `MatchPredicate`.
pub fn matches(term: &str, search: Option<&str>, mode: MatchMode, case_insensitive: bool) -> bool {
    MatchPredicate::new(search, mode, case_insensitive).matches(term)
}

/// Предикат с заранее свёрнутой строкой поиска (свёртка один раз на скан).
#[derive(Debug, Clone)]
pub struct MatchPredicate {
    search: Option<String>,
    mode: MatchMode,
    case_insensitive: bool,
}

impl MatchPredicate {
    pub fn new(search: Option<&str>, mode: MatchMode, case_insensitive: bool) -> Self {
        let search = search.map(|s| {
            if case_insensitive {
                fold_case(s).into_owned()
            } else {
                s.to_string()
            }
        });
        Self {
            search,
            mode,
            case_insensitive,
        }
    }

    pub fn for_request(req: &FacetRequest) -> Self {
        Self::new(req.search_term(), req.match_mode(), req.case_insensitive())
    }

    /// Нет строки поиска: совпадает всё.
    pub fn matches_all(&self) -> bool {
        self.search.is_none()
    }

    pub fn matches(&self, term: &str) -> bool {
        let Some(needle) = self.search.as_deref() else {
            return true;
        };
        let hay = if self.case_insensitive {
            fold_case(term)
        } else {
            Cow::Borrowed(term)
        };
        match self.mode {
            MatchMode::Prefix => hay.starts_with(needle),
            MatchMode::Contains => hay.contains(needle),
        }
    }
}
