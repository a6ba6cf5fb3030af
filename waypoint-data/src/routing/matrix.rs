//! Batched construction of large cost matrices.
//!
//! OSRM caps the number of cells a single table request may compute. The
//! [`MatrixBuilder`] splits the point list into batches and requests one
//! block per (row batch, column batch) pair. Each block carries only the
//! points it needs, and the blocks are written into the full matrix at
//! their row and column offsets.
//!
//! # Architecture
//!
//! The [`TravelCostProvider`] trait is synchronous so that optimizers can
//! consume matrices without an async runtime. [`MatrixBuilder::build`] is
//! the async path and never touches a runtime of its own. The sync bridge
//! blocks in place on a multi-threaded caller runtime, hands the work to a
//! scoped thread when the caller runs a current-thread runtime, and
//! otherwise blocks on a runtime the builder creates on first use.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use log::debug;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use waypoint_core::{
    CostKind, CostMatrix, Point, RoutingError, TravelCostProvider, validate_points,
};

use super::client::OsrmRoutingClient;
use super::table::TableRequest;

/// Default number of blocks requested concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Batching and concurrency settings for [`MatrixBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixBuilderConfig {
    /// Points per batch. `None` (or zero) requests the whole matrix at once.
    pub batch_size: Option<usize>,
    /// Maximum number of block requests in flight.
    pub workers: usize,
    /// When `false`, blocks are requested one at a time.
    pub parallel: bool,
}

impl Default for MatrixBuilderConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            workers: DEFAULT_WORKERS,
            parallel: true,
        }
    }
}

impl MatrixBuilderConfig {
    /// Split requests into batches of `batch_size` points.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the number of concurrent block requests.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable concurrent block requests.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Effective number of blocks in flight; never zero.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        if self.parallel {
            self.workers.max(1)
        } else {
            1
        }
    }
}

/// Split `0..len` into consecutive ranges of at most `batch_size`.
///
/// # Examples
/// ```
/// use waypoint_data::routing::batch_ranges;
///
/// assert_eq!(batch_ranges(5, Some(2)), vec![0..2, 2..4, 4..5]);
/// assert_eq!(batch_ranges(5, None), vec![0..5]);
/// ```
#[must_use]
pub fn batch_ranges(len: usize, batch_size: Option<usize>) -> Vec<Range<usize>> {
    match batch_size {
        Some(size) if size > 0 && size < len => (0..len)
            .step_by(size)
            .map(|start| start..(start + size).min(len))
            .collect(),
        _ => vec![0..len],
    }
}

/// Builds full cost matrices through batched table requests.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use waypoint_core::{CostKind, Point, TravelCostProvider};
/// use waypoint_data::routing::{
///     MatrixBuilder, MatrixBuilderConfig, OsrmRoutingClient, RoutingClientConfig,
/// };
///
/// let client = Arc::new(OsrmRoutingClient::new(RoutingClientConfig::default())?);
/// let builder = MatrixBuilder::new(client, MatrixBuilderConfig::default().with_batch_size(100));
///
/// let points = vec![Point::new(35.0, -85.3); 250];
/// let matrix = builder.get_cost_matrix(&points, CostKind::Duration)?;
/// assert_eq!(matrix.len(), 250);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MatrixBuilder {
    client: Arc<OsrmRoutingClient>,
    config: MatrixBuilderConfig,
    runtime: OnceLock<Runtime>,
}

impl std::fmt::Debug for MatrixBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixBuilder")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime_started", &self.runtime.get().is_some())
            .finish()
    }
}

impl Drop for MatrixBuilder {
    fn drop(&mut self) {
        // A blocking shutdown panics when the builder is dropped inside async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl MatrixBuilder {
    /// Create a builder over `client`.
    #[must_use]
    pub const fn new(client: Arc<OsrmRoutingClient>, config: MatrixBuilderConfig) -> Self {
        Self {
            client,
            config,
            runtime: OnceLock::new(),
        }
    }

    /// Settings the builder was created with.
    #[must_use]
    pub const fn config(&self) -> &MatrixBuilderConfig {
        &self.config
    }

    /// Build the full `n×n` matrix of `kind` for `points`.
    ///
    /// Every point is validated before the first request. If any block
    /// fails, outstanding blocks are dropped and the error is returned; a
    /// partial matrix is never produced.
    ///
    /// # Errors
    ///
    /// Returns the first error of any block, or an input error.
    pub async fn build(
        &self,
        points: &[Point],
        kind: CostKind,
    ) -> Result<CostMatrix, RoutingError> {
        validate_points(points)?;
        let batches = batch_ranges(points.len(), self.config.batch_size);
        if let [_] = batches.as_slice() {
            return self.client.table(&TableRequest::new(points, kind)).await;
        }

        let blocks: Vec<(Range<usize>, Range<usize>)> = batches
            .iter()
            .flat_map(|rows| batches.iter().map(move |cols| (rows.clone(), cols.clone())))
            .collect();
        debug!(
            "building {n}x{n} {} matrix from {} blocks, {} in flight",
            kind.field(),
            blocks.len(),
            self.config.concurrency(),
            n = points.len()
        );

        let mut matrix = vec![vec![0; points.len()]; points.len()];
        let mut results = stream::iter(blocks)
            .map(|(rows, cols)| self.fetch_block(points, kind, rows, cols))
            .buffer_unordered(self.config.concurrency());
        while let Some((rows, cols, block)) = results.try_next().await? {
            write_block(&mut matrix, &rows, &cols, block);
        }
        Ok(matrix)
    }

    async fn fetch_block(
        &self,
        points: &[Point],
        kind: CostKind,
        rows: Range<usize>,
        cols: Range<usize>,
    ) -> Result<(Range<usize>, Range<usize>, CostMatrix), RoutingError> {
        let block = if rows == cols {
            self.client
                .table(&TableRequest::new(&points[rows.clone()], kind))
                .await?
        } else {
            let subset: Vec<Point> = points[rows.clone()]
                .iter()
                .chain(&points[cols.clone()])
                .copied()
                .collect();
            let request = TableRequest::new(&subset, kind)
                .with_sources(0..rows.len())
                .with_destinations(rows.len()..subset.len());
            self.client.table(&request).await?
        };
        Ok((rows, cols, block))
    }

    /// Run [`Self::build`] on the builder's own runtime.
    ///
    /// Must not be called from a thread that is driving a Tokio runtime.
    fn block_on_owned(
        &self,
        points: &[Point],
        kind: CostKind,
    ) -> Result<CostMatrix, RoutingError> {
        self.owned_runtime()?.block_on(self.build(points, kind))
    }

    fn owned_runtime(&self) -> Result<&Runtime, RoutingError> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| RoutingError::Runtime {
                message: err.to_string(),
            })?;
        Ok(self.runtime.get_or_init(|| runtime))
    }
}

fn write_block(
    matrix: &mut CostMatrix,
    rows: &Range<usize>,
    cols: &Range<usize>,
    block: CostMatrix,
) {
    for (row, values) in matrix[rows.clone()].iter_mut().zip(block) {
        row[cols.clone()].copy_from_slice(&values);
    }
}

impl TravelCostProvider for MatrixBuilder {
    /// Build the matrix synchronously.
    ///
    /// # Runtime behaviour
    ///
    /// Inside a multi-threaded Tokio runtime the build runs on the caller's
    /// handle via [`tokio::task::block_in_place`]. Inside a `current_thread`
    /// runtime the build runs on a scoped thread driving the builder's own
    /// runtime, and the caller's runtime is blocked until it finishes.
    /// Pooled connections opened by the caller's runtime are unusable while
    /// it is blocked, so such requests end in the transport timeout. Outside
    /// any runtime the builder's own runtime is used directly.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Runtime`] if the builder's runtime fails to
    /// start, otherwise the errors of [`MatrixBuilder::build`].
    fn get_cost_matrix(
        &self,
        points: &[Point],
        kind: CostKind,
    ) -> Result<CostMatrix, RoutingError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.build(points, kind)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.block_on_owned(points, kind))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            }),
            Err(_) => self.block_on_owned(points, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    use crate::routing::test_support::{InFlightTransport, StubTransport, block_on_for_tests};
    use crate::routing::{RoutingClientConfig, TransportResponse};

    fn builder_over(stub: &Arc<StubTransport>, config: MatrixBuilderConfig) -> MatrixBuilder {
        let client = OsrmRoutingClient::with_transport(RoutingClientConfig::default(), stub.clone())
            .expect("client should build");
        MatrixBuilder::new(Arc::new(client), config)
    }

    fn line_of_points(count: usize) -> Vec<Point> {
        (0..count)
            .map(|i| Point::new(35.0 + 0.01 * i as f64, -85.3 - 0.02 * i as f64))
            .collect()
    }

    #[rstest]
    #[case(7, Some(3), vec![0..3, 3..6, 6..7])]
    #[case(6, Some(3), vec![0..3, 3..6])]
    #[case(3, Some(3), vec![0..3])]
    #[case(3, Some(10), vec![0..3])]
    #[case(3, Some(0), vec![0..3])]
    #[case(3, None, vec![0..3])]
    fn splits_into_batches(
        #[case] len: usize,
        #[case] batch_size: Option<usize>,
        #[case] expected: Vec<Range<usize>>,
    ) {
        assert_eq!(batch_ranges(len, batch_size), expected);
    }

    #[rstest]
    #[case(MatrixBuilderConfig::default(), 4)]
    #[case(MatrixBuilderConfig::default().with_workers(0), 1)]
    #[case(MatrixBuilderConfig::default().with_parallel(false), 1)]
    fn concurrency_is_at_least_one(#[case] config: MatrixBuilderConfig, #[case] expected: usize) {
        assert_eq!(config.concurrency(), expected);
    }

    #[rstest]
    fn unbatched_build_issues_one_request() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default());
        let matrix = block_on_for_tests(builder.build(&line_of_points(5), CostKind::Duration))
            .expect("should build");
        assert_eq!(matrix.len(), 5);
        assert_eq!(stub.call_count(), 1);
    }

    #[rstest]
    fn batched_build_issues_one_request_per_block() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        block_on_for_tests(builder.build(&line_of_points(5), CostKind::Distance))
            .expect("should build");
        assert_eq!(stub.call_count(), 9);
        assert!(
            stub.requests()
                .iter()
                .all(|url| url.contains("annotations=distance"))
        );
    }

    #[rstest]
    fn off_diagonal_blocks_send_only_their_points() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        block_on_for_tests(builder.build(&line_of_points(4), CostKind::Duration))
            .expect("should build");
        let requests = stub.requests();
        let off_diagonal: Vec<&String> = requests
            .iter()
            .filter(|url| url.contains("sources="))
            .collect();
        assert_eq!(off_diagonal.len(), 2);
        assert!(off_diagonal.iter().all(|url| url.contains("sources=0;1&destinations=2;3")));
    }

    #[rstest]
    fn one_failing_block_fails_the_build() {
        let stub = Arc::new(StubTransport::new(|url| {
            if url.contains("destinations=") {
                Err(RoutingError::NetworkError {
                    url: url.to_owned(),
                    message: "connection reset".to_owned(),
                })
            } else {
                Ok(TransportResponse::ok(
                    r#"{"code": "Ok", "durations": [[0.0, 1.0], [1.0, 0.0]]}"#,
                ))
            }
        }));
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        let err = block_on_for_tests(builder.build(&line_of_points(4), CostKind::Duration))
            .expect_err("block failure must propagate");
        assert!(matches!(err, RoutingError::NetworkError { .. }));
    }

    #[rstest]
    fn invalid_point_fails_before_any_request() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        let mut points = line_of_points(5);
        points[4].lon = f64::NAN;
        let err = builder
            .get_cost_matrix(&points, CostKind::Duration)
            .expect_err("NaN must be rejected");
        assert!(matches!(err, RoutingError::InvalidCoordinate { index: 4, .. }));
        assert_eq!(stub.call_count(), 0);
    }

    #[rstest]
    fn empty_input_returns_error() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default());
        let err = builder
            .get_cost_matrix(&[], CostKind::Duration)
            .expect_err("should fail");
        assert_eq!(err, RoutingError::EmptyInput);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn sync_provider_works_inside_multi_thread_runtime() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        let matrix = builder
            .get_cost_matrix(&line_of_points(3), CostKind::Duration)
            .expect("should build");
        assert_eq!(matrix.len(), 3);
        assert_eq!(stub.call_count(), 4);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sync_provider_works_inside_current_thread_runtime() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        let matrix = builder
            .get_cost_matrix(&line_of_points(3), CostKind::Duration)
            .expect("should build");
        assert_eq!(matrix.len(), 3);
        assert_eq!(stub.call_count(), 4);
        // The owned runtime now exists and must shut down without blocking.
        drop(builder);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn builder_can_be_dropped_inside_async_code() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default().with_batch_size(2));
        let matrix = builder
            .build(&line_of_points(3), CostKind::Duration)
            .await
            .expect("should build");
        drop(builder);
        assert_eq!(matrix.len(), 3);
    }

    #[rstest]
    fn sync_provider_reuses_its_runtime_outside_async_code() {
        let stub = Arc::new(StubTransport::planar());
        let builder = builder_over(&stub, MatrixBuilderConfig::default());
        let first = builder.get_cost_matrix(&line_of_points(2), CostKind::Duration);
        let second = builder.get_cost_matrix(&line_of_points(2), CostKind::Duration);
        assert_eq!(first, second);
        assert!(format!("{builder:?}").contains("runtime_started: true"));
    }

    fn peak_in_flight(config: MatrixBuilderConfig) -> usize {
        let transport = Arc::new(InFlightTransport::new(StubTransport::planar()));
        let client =
            OsrmRoutingClient::with_transport(RoutingClientConfig::default(), transport.clone())
                .expect("client should build");
        let builder = MatrixBuilder::new(Arc::new(client), config);
        block_on_for_tests(builder.build(&line_of_points(7), CostKind::Duration))
            .expect("should build");
        assert_eq!(transport.call_count(), 16);
        transport.peak()
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    fn parallel_blocks_overlap_up_to_the_worker_limit(#[case] workers: usize) {
        let config = MatrixBuilderConfig::default()
            .with_batch_size(2)
            .with_workers(workers);
        assert_eq!(peak_in_flight(config), workers);
    }

    #[rstest]
    fn sequential_blocks_never_overlap() {
        let config = MatrixBuilderConfig::default()
            .with_batch_size(2)
            .with_workers(3)
            .with_parallel(false);
        assert_eq!(peak_in_flight(config), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn batched_matrix_equals_unbatched(
            count in 1_usize..12,
            batch_size in 1_usize..6,
            workers in 1_usize..5,
            parallel: bool,
        ) {
            let points = line_of_points(count);
            let stub = Arc::new(StubTransport::planar());
            let unbatched = builder_over(&stub, MatrixBuilderConfig::default())
                .get_cost_matrix(&points, CostKind::Duration)
                .expect("unbatched build");
            let config = MatrixBuilderConfig::default()
                .with_batch_size(batch_size)
                .with_workers(workers)
                .with_parallel(parallel);
            let batched = builder_over(&stub, config)
                .get_cost_matrix(&points, CostKind::Duration)
                .expect("batched build");
            prop_assert_eq!(batched, unbatched);
        }
    }
}
