use std::collections::HashSet;

use tracing::debug;

use crate::error::FacetError;
use crate::predicate::MatchPredicate;
use crate::request::FacetRequest;
use crate::result::PartialResult;

pub type TermIter<'a> = Box<dyn Iterator<Item = &'a str> + 'a>;

const CANCEL_CHECK_EVERY: usize = 1024;

/// Словарь термов одной партиции (внешний коллаборатор).
///
/// `terms` каждый раз отдаёт новый ленивый конечный итератор по уникальным
/// термам поля, в порядке словаря. `Ok(None)`: поля в этой партиции нет.
pub trait TermDictionary {
    fn partition_id(&self) -> &str;
    fn terms(&self, field: &str) -> anyhow::Result<Option<TermIter<'_>>>;
}

/// Множество фиксированной ёмкости с порядком вставки.
/// Ничего не обрезается задним числом: после `is_full` вставка отклоняется.
#[derive(Debug)]
pub struct BoundedTermSet<'a> {
    cap: usize,
    order: Vec<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a> BoundedTermSet<'a> {
    pub fn with_capacity(cap: usize) -> Self {
        // не доверяем капу для предаллокации: он бывает огромным
        let hint = cap.min(1024);
        Self {
            cap,
            order: Vec::with_capacity(hint),
            seen: HashSet::with_capacity(hint),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= self.cap
    }

    /// true: терм добавлен.
    pub fn insert(&mut self, term: &'a str) -> bool {
        if self.is_full() || !self.seen.insert(term) {
            return false;
        }
        self.order.push(term);
        true
    }

    pub fn into_owned(self) -> Vec<String> {
        self.order.into_iter().map(str::to_owned).collect()
    }
}

/// Сканер одной партиции: фильтр + дедуп + глобальный кап на все поля.
pub struct PartitionScanner<'r> {
    request: &'r FacetRequest,
    predicate: MatchPredicate,
}

impl<'r> PartitionScanner<'r> {
    pub fn new(request: &'r FacetRequest) -> Self {
        Self {
            request,
            predicate: MatchPredicate::for_request(request),
        }
    }

    pub fn scan<D>(&self, dict: &D) -> Result<PartialResult, FacetError>
    where
        D: TermDictionary + ?Sized,
    {
        self.scan_until(dict, || false)
    }

    /// То же, что `scan`, но `cancelled` опрашивается перед каждым полем и
    /// каждые `CANCEL_CHECK_EVERY` термов; при отмене результат выбрасывается.
    pub fn scan_until<D, C>(&self, dict: &D, cancelled: C) -> Result<PartialResult, FacetError>
    where
        D: TermDictionary + ?Sized,
        C: Fn() -> bool,
    {
        let partition = dict.partition_id();
        let cap = self.request.partition_cap();
        if cap == 0 {
            debug!(partition, "cap is zero, skipping scan");
            return Ok(PartialResult::empty(partition));
        }

        let mut acc = BoundedTermSet::with_capacity(cap);

        'fields: for field in self.request.fields() {
            if cancelled() {
                return Err(FacetError::cancelled(partition));
            }
            let terms = dict
                .terms(field)
                .map_err(|source| FacetError::Dictionary {
                    field: field.clone(),
                    source,
                })?;
            let Some(terms) = terms else {
                debug!(partition, field = %field, "no terms for field in partition");
                continue;
            };

            for (i, term) in terms.enumerate() {
                if i % CANCEL_CHECK_EVERY == CANCEL_CHECK_EVERY - 1 && cancelled() {
                    return Err(FacetError::cancelled(partition));
                }
                if self.predicate.matches(term) {
                    acc.insert(term);
                }
                if acc.is_full() {
                    debug!(partition, cap, "partition limit hit, stop scanning");
                    break 'fields;
                }
            }
        }

        debug!(partition, collected = acc.len(), "partition scanned");
        Ok(PartialResult::new(partition, acc.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use crate::partition::memory::InMemoryPartition;

    fn animals() -> InMemoryPartition {
        let mut p = InMemoryPartition::new("p0");
        p.add_terms("name", ["cat", "dog", "canary"]);
        p
    }

    #[test]
    fn bounded_set_rejects_dups_and_overflow() {
        let mut s = BoundedTermSet::with_capacity(2);
        assert!(s.insert("a"));
        assert!(!s.insert("a"));
        assert!(s.insert("b"));
        assert!(s.is_full());
        assert!(!s.insert("c"));
        assert_eq!(s.into_owned(), vec!["a", "b"]);
    }

    #[test]
    fn prefix_case_insensitive() {
        let req = FacetRequest::builder(["name"])
            .search("CA")
            .prefix(true)
            .max_per_partition(10)
            .build()
            .unwrap();
        let out = PartitionScanner::new(&req).scan(&animals()).unwrap();
        assert_eq!(out.terms, vec!["cat", "canary"]);
        assert_eq!(out.partition_id, "p0");
    }

    #[test]
    fn cap_is_global_across_fields() {
        let mut p = InMemoryPartition::new("p1");
        p.add_terms("a", ["x1", "x2"]);
        p.add_terms("b", ["y1", "y2"]);
        let req = FacetRequest::builder(["a", "b"])
            .max_per_partition(3)
            .build()
            .unwrap();
        let out = PartitionScanner::new(&req).scan(&p).unwrap();
        assert_eq!(out.terms, vec!["x1", "x2", "y1"]);
    }

    #[test]
    fn same_term_in_two_fields_counted_once() {
        let mut p = InMemoryPartition::new("p2");
        p.add_terms("a", ["red", "blue"]);
        p.add_terms("b", ["blue", "green"]);
        let req = FacetRequest::builder(["a", "b"]).build().unwrap();
        let out = PartitionScanner::new(&req).scan(&p).unwrap();
        assert_eq!(out.terms, vec!["red", "blue", "green"]);
    }

    #[test]
    fn missing_field_is_skipped() {
        let req = FacetRequest::builder(["nope", "name"])
            .search("dog")
            .build()
            .unwrap();
        let out = PartitionScanner::new(&req).scan(&animals()).unwrap();
        assert_eq!(out.terms, vec!["dog"]);
    }

    struct Broken;
    impl TermDictionary for Broken {
        fn partition_id(&self) -> &str {
            "broken"
        }
        fn terms(&self, _field: &str) -> anyhow::Result<Option<TermIter<'_>>> {
            anyhow::bail!("disk on fire")
        }
    }

    #[test]
    fn dictionary_failure_is_reported() {
        let req = FacetRequest::builder(["f"]).build().unwrap();
        let err = PartitionScanner::new(&req).scan(&Broken).unwrap_err();
        assert!(matches!(err, FacetError::Dictionary { ref field, .. } if field == "f"));
    }

    /// Поле "a" считает вытянутые термы, любое другое поле падает.
    struct Counted {
        terms: Vec<String>,
        pulled: Cell<usize>,
    }
    impl TermDictionary for Counted {
        fn partition_id(&self) -> &str {
            "counted"
        }
        fn terms(&self, field: &str) -> anyhow::Result<Option<TermIter<'_>>> {
            if field != "a" {
                anyhow::bail!("field {field} must not be read");
            }
            Ok(Some(Box::new(self.terms.iter().map(move |t| {
                self.pulled.set(self.pulled.get() + 1);
                t.as_str()
            }))))
        }
    }

    fn counted(n: usize) -> Counted {
        Counted {
            terms: (0..n).map(|i| format!("t{i}")).collect(),
            pulled: Cell::new(0),
        }
    }

    #[test]
    fn halts_as_soon_as_cap_is_reached() {
        let dict = counted(10);
        let req = FacetRequest::builder(["a", "b"])
            .max_per_partition(3)
            .build()
            .unwrap();
        let out = PartitionScanner::new(&req).scan(&dict).unwrap();
        assert_eq!(out.terms, vec!["t0", "t1", "t2"]);
        assert_eq!(dict.pulled.get(), 3);
    }

    #[test]
    fn cancelled_scan_reads_nothing() {
        let dict = counted(10);
        let req = FacetRequest::builder(["a"]).build().unwrap();
        let err = PartitionScanner::new(&req)
            .scan_until(&dict, || true)
            .unwrap_err();
        assert!(matches!(err, FacetError::Cancelled { ref partition } if partition == "counted"));
        assert_eq!(dict.pulled.get(), 0);
    }

    #[test]
    fn cancellation_is_seen_mid_field() {
        let dict = counted(5 * CANCEL_CHECK_EVERY);
        let req = FacetRequest::builder(["a"])
            .max_per_partition(i64::MAX)
            .build()
            .unwrap();
        let err = PartitionScanner::new(&req)
            .scan_until(&dict, || dict.pulled.get() >= CANCEL_CHECK_EVERY)
            .unwrap_err();
        assert!(matches!(err, FacetError::Cancelled { .. }));
        assert!(dict.pulled.get() < 2 * CANCEL_CHECK_EVERY + 1);
    }

    #[test]
    fn zero_cap_never_touches_dictionary() {
        let req = FacetRequest::builder(["f"])
            .max_per_partition(0)
            .build()
            .unwrap();
        let out = PartitionScanner::new(&req).scan(&Broken).unwrap();
        assert!(out.is_empty());
    }
}
