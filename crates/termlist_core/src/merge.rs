use std::collections::HashSet;

use rayon::prelude::*;

use crate::request::FacetRequest;
use crate::result::{FacetResult, PartialResult};

/// Склейка partial-результатов в один глобальный список.
///
/// Дедуп строго по точному равенству строк, независимо от
/// `case_insensitive`: "Cat" и "cat" остаются разными элементами.
/// Кап на слиянии не применяется.
#[derive(Debug, Default, Clone)]
pub struct Merger {
    entries: Vec<String>,
    seen: HashSet<String>,
    partitions: usize,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, partial: PartialResult) {
        self.partitions += 1;
        for term in partial.terms {
            if !self.seen.contains(&term) {
                self.seen.insert(term.clone());
                self.entries.push(term);
            }
        }
    }

    /// Влить другой мерджер (для дерева редукции).
    pub fn absorb(&mut self, other: Merger) {
        self.partitions += other.partitions;
        for term in other.entries {
            if !self.seen.contains(&term) {
                self.seen.insert(term.clone());
                self.entries.push(term);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self, request: &FacetRequest) -> FacetResult {
        let mut entries = self.entries;
        if request.sort_result() {
            // порядок байт UTF-8 == порядок кодпоинтов
            entries.sort_unstable();
        }
        FacetResult::new(request.name(), entries, self.partitions)
    }
}

/// Слияние всех пришедших partial-результатов. Допускает неполный набор.
pub fn merge<I>(request: &FacetRequest, partials: I) -> FacetResult
where
    I: IntoIterator<Item = PartialResult>,
{
    let mut m = Merger::new();
    for p in partials {
        m.push(p);
    }
    m.finish(request)
}

/// То же, но дерево редукции на rayon. Содержимое совпадает с `merge`;
/// без сортировки порядок может отличаться.
pub fn merge_parallel(request: &FacetRequest, partials: Vec<PartialResult>) -> FacetResult {
    let merged = partials
        .into_par_iter()
        .fold(Merger::new, |mut m, p| {
            m.push(p);
            m
        })
        .reduce(Merger::new, |mut a, b| {
            a.absorb(b);
            a
        });
    merged.finish(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(sort: bool) -> FacetRequest {
        FacetRequest::builder(["f"]).sort(sort).build().unwrap()
    }

    fn part(id: &str, terms: &[&str]) -> PartialResult {
        PartialResult::new(id, terms.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn sorted_merge_dedups() {
        let out = merge(
            &req(true),
            vec![part("a", &["cat", "dog"]), part("b", &["dog", "fox"])],
        );
        assert_eq!(out.entries, vec!["cat", "dog", "fox"]);
        assert_eq!(out.partitions_merged, 2);
    }

    #[test]
    fn unsorted_keeps_arrival_order() {
        let out = merge(
            &req(false),
            vec![part("b", &["fox", "dog"]), part("a", &["cat", "dog"])],
        );
        assert_eq!(out.entries, vec!["fox", "dog", "cat"]);
    }

    #[test]
    fn case_variants_stay_distinct() {
        let out = merge(&req(true), vec![part("a", &["cat"]), part("b", &["Cat"])]);
        assert_eq!(out.entries, vec!["Cat", "cat"]);
    }

    #[test]
    fn no_partials_is_empty_result() {
        let out = merge(&req(true), Vec::new());
        assert!(out.entries.is_empty());
        assert_eq!(out.partitions_merged, 0);
    }

    #[test]
    fn absorb_matches_flat_merge() {
        let mut left = Merger::new();
        left.push(part("a", &["x", "y"]));
        let mut right = Merger::new();
        right.push(part("b", &["y", "z"]));
        left.absorb(right);
        let out = left.finish(&req(true));
        assert_eq!(out.entries, vec!["x", "y", "z"]);
        assert_eq!(out.partitions_merged, 2);
    }

    #[test]
    fn parallel_merge_same_content() {
        let parts: Vec<_> = (0..32)
            .map(|i| part(&format!("p{i}"), &[format!("t{}", i % 7).as_str(), "shared"]))
            .collect();
        let flat = merge(&req(true), parts.clone());
        let tree = merge_parallel(&req(true), parts);
        assert_eq!(flat.entries, tree.entries);
        assert_eq!(tree.partitions_merged, 32);
    }
}
