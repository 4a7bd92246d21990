pub mod codec;
pub mod error;
pub mod merge;
pub mod partition;
pub mod predicate;
pub mod request;
pub mod result;
pub mod scanner;
pub mod validate;

pub use error::{CodecError, FacetError};
pub use merge::{merge, merge_parallel, Merger};
pub use predicate::{fold_case, matches, MatchPredicate};
pub use request::{FacetRequest, FacetSpec, MatchMode};
pub use result::{FacetResult, PartialResult};
pub use scanner::{BoundedTermSet, PartitionScanner, TermDictionary, TermIter};

/// Скан всех партиций по очереди + слияние, без координатора.
/// Поведение то же, что при параллельном запуске.
pub fn run_local<'d, I, D>(request: &FacetRequest, dicts: I) -> Result<FacetResult, FacetError>
where
    I: IntoIterator<Item = &'d D>,
    D: TermDictionary + ?Sized + 'd,
{
    let scanner = PartitionScanner::new(request);
    let mut merger = Merger::new();
    for d in dicts {
        merger.push(scanner.scan(d)?);
    }
    Ok(merger.finish(request))
}
