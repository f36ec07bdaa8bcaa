use std::future::Future;

use serde::Serialize;
use tendermint_rpc::endpoint::validators::Response as TendermintValidatorsResponse;

use crate::error::RpcError;

/// Page size used when walking the whole validator set.
pub const VALIDATORS_PER_PAGE: u8 = 50;

/// Parameters of a single `validators` call. A `None` or zero height lets the
/// node pick its latest height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorsQuery {
    pub height: Option<u64>,
    pub page: Option<usize>,
    pub per_page: Option<u8>,
}

impl ValidatorsQuery {
    pub fn page(height: Option<u64>, page: usize) -> Self {
        Self {
            height,
            page: Some(page),
            per_page: Some(VALIDATORS_PER_PAGE),
        }
    }
}

/// One page of the validator set, as returned by the node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorsPage<V> {
    pub block_height: u64,
    pub total: usize,
    pub validators: Vec<V>,
}

impl From<TendermintValidatorsResponse>
    for ValidatorsPage<tendermint::validator::Info>
{
    fn from(response: TendermintValidatorsResponse) -> Self {
        Self {
            block_height: response.block_height.value(),
            total: usize::try_from(response.total).unwrap_or_default(),
            validators: response.validators,
        }
    }
}

/// Full validator set at a single height, in page arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorSet<V> {
    pub block_height: u64,
    pub count: usize,
    pub total: usize,
    pub validators: Vec<V>,
}

/// Height used for every page after the first one. Set at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PinnedHeight(Option<u64>);

impl PinnedHeight {
    fn new(height: u64) -> Self {
        Self((height > 0).then_some(height))
    }

    fn pin(&mut self, reported: u64) {
        if self.0.is_none() && reported > 0 {
            self.0 = Some(reported);
        }
    }

    fn get(&self) -> Option<u64> {
        self.0
    }
}

/// Walks the paginated `validators` endpoint until the node's declared total
/// is reached. Pages are requested one at a time: when `height` is 0 the
/// first page decides the height and every following page is pinned to it,
/// even if the chain moves on in between.
///
/// The returned `total` is the number of validators actually collected. Any
/// failed page aborts the walk and the pages already collected are dropped.
pub async fn collect_validator_pages<V, F, Fut>(
    height: u64,
    mut fetch: F,
) -> Result<ValidatorSet<V>, RpcError>
where
    F: FnMut(ValidatorsQuery) -> Fut,
    Fut: Future<Output = Result<ValidatorsPage<V>, RpcError>>,
{
    let mut validators = Vec::new();
    let mut pinned = PinnedHeight::new(height);
    let mut page = 1;

    loop {
        let response = fetch(ValidatorsQuery::page(pinned.get(), page)).await?;
        let received = response.validators.len();
        validators.extend(response.validators);
        pinned.pin(response.block_height);

        tracing::debug!(
            page,
            received,
            collected = validators.len(),
            declared_total = response.total,
            height = ?pinned.get(),
            "Fetched validators page"
        );

        if validators.len() >= response.total {
            if validators.len() != response.total {
                tracing::warn!(
                    collected = validators.len(),
                    declared_total = response.total,
                    "Validator count differs from the total declared by the \
                     node"
                );
            }
            break;
        }
        if received == 0 {
            return Err(RpcError::IncompleteValidatorSet {
                page,
                collected: validators.len(),
                total: response.total,
            });
        }
        page += 1;
    }

    let count = validators.len();

    Ok(ValidatorSet {
        block_height: pinned.get().unwrap_or_default(),
        count,
        total: count,
        validators,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Calls = Arc<Mutex<Vec<ValidatorsQuery>>>;

    /// Node holding `total` validators numbered from 0, reporting
    /// `heights[page - 1]` (or the last entry) as the page's height.
    fn fake_node(
        total: usize,
        heights: Vec<u64>,
        calls: Calls,
    ) -> impl FnMut(
        ValidatorsQuery,
    ) -> std::future::Ready<Result<ValidatorsPage<usize>, RpcError>> {
        move |query| {
            calls.lock().unwrap().push(query);
            let page = query.page.unwrap_or(1);
            let per_page = usize::from(query.per_page.unwrap_or(30));
            let start = (page - 1) * per_page;
            let end = usize::min(start + per_page, total);
            let block_height = heights
                .get(page - 1)
                .or(heights.last())
                .copied()
                .unwrap_or_default();

            std::future::ready(Ok(ValidatorsPage {
                block_height,
                total,
                validators: (start..end).collect(),
            }))
        }
    }

    #[tokio::test]
    async fn walks_every_page_in_order() {
        let calls = Calls::default();
        let set = collect_validator_pages(
            100,
            fake_node(120, vec![100], calls.clone()),
        )
        .await
        .unwrap();

        let pages: Vec<_> =
            calls.lock().unwrap().iter().map(|q| q.page).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
        assert!(calls
            .lock()
            .unwrap()
            .iter()
            .all(|q| q.per_page == Some(VALIDATORS_PER_PAGE)));
        assert_eq!(set.count, 120);
        assert_eq!(set.total, 120);
        assert_eq!(set.validators, (0..120).collect::<Vec<_>>());
        assert_eq!(set.block_height, 100);
    }

    #[tokio::test]
    async fn pins_height_from_first_page() {
        let calls = Calls::default();
        let set = collect_validator_pages(
            0,
            fake_node(120, vec![500, 501, 502], calls.clone()),
        )
        .await
        .unwrap();

        let heights: Vec<_> =
            calls.lock().unwrap().iter().map(|q| q.height).collect();
        assert_eq!(heights, vec![None, Some(500), Some(500)]);
        assert_eq!(set.block_height, 500);
    }

    #[tokio::test]
    async fn caller_height_is_never_replaced() {
        let calls = Calls::default();
        let set = collect_validator_pages(
            42,
            fake_node(60, vec![43], calls.clone()),
        )
        .await
        .unwrap();

        let heights: Vec<_> =
            calls.lock().unwrap().iter().map(|q| q.height).collect();
        assert_eq!(heights, vec![Some(42), Some(42)]);
        assert_eq!(set.block_height, 42);
    }

    #[tokio::test]
    async fn unresolved_height_falls_back_to_zero() {
        let calls = Calls::default();
        let set = collect_validator_pages(
            0,
            fake_node(10, vec![0], calls.clone()),
        )
        .await
        .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(set.block_height, 0);
        assert_eq!(set.count, 10);
    }

    #[tokio::test]
    async fn single_short_page_stops_immediately() {
        let calls = Calls::default();
        let set =
            collect_validator_pages(7, fake_node(50, vec![7], calls.clone()))
                .await
                .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(set.total, 50);
    }

    #[tokio::test]
    async fn total_is_the_collected_count() {
        // The node declares 60 on the first page and 3 on the second.
        let mut page_no = 0;
        let set = collect_validator_pages(9, |_| {
            page_no += 1;
            let (total, validators) = match page_no {
                1 => (60, vec!['a'; 50]),
                _ => (3, vec!['b'; 5]),
            };
            async move {
                Ok(ValidatorsPage {
                    block_height: 9,
                    total,
                    validators,
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(set.count, 55);
        assert_eq!(set.total, 55);
    }

    #[tokio::test]
    async fn duplicates_are_kept() {
        let set = collect_validator_pages(3, |query| async move {
            Ok(ValidatorsPage {
                block_height: 3,
                total: 4,
                validators: vec![query.page.unwrap(); 2],
            })
        })
        .await
        .unwrap();

        assert_eq!(set.validators, vec![1, 1, 2, 2]);
    }

    #[tokio::test]
    async fn failed_page_discards_everything() {
        let result = collect_validator_pages(5, |query| async move {
            match query.page {
                Some(1) => Ok(ValidatorsPage {
                    block_height: 5,
                    total: 120,
                    validators: vec![0u8; 50],
                }),
                _ => Err(RpcError::Protocol("{\"code\":-32603}".to_string())),
            }
        })
        .await;

        assert!(matches!(result, Err(RpcError::Protocol(_))));
    }

    #[tokio::test]
    async fn empty_page_before_total_is_an_error() {
        let result = collect_validator_pages(5, |query| async move {
            let validators = match query.page {
                Some(1) => vec![0u8; 50],
                _ => vec![],
            };
            Ok(ValidatorsPage {
                block_height: 5,
                total: 120,
                validators,
            })
        })
        .await;

        assert!(matches!(
            result,
            Err(RpcError::IncompleteValidatorSet {
                page: 2,
                collected: 50,
                total: 120
            })
        ));
    }

    #[test]
    fn pinned_height_is_set_once() {
        let mut pinned = PinnedHeight::new(0);
        pinned.pin(0);
        assert_eq!(pinned.get(), None);
        pinned.pin(10);
        pinned.pin(11);
        assert_eq!(pinned.get(), Some(10));
    }
}
