use crate::error::{ErrorKind, Result};
use crate::plan::{Job, Plan};
use crate::state::{RegionEvent, RegionStatus};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::pin::pin;
use std::sync::Arc;
use tessera_cache::error::{Error as CacheError, ErrorKind as CacheErrorKind};
use tessera_cache::{DownloadState, OfflineStore, Region, RegionDefinition};
use tessera_source::{ResponseError, SourceHandle};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Fetches in flight at once, per region.
    pub max_concurrent_requests: usize,
}
impl Default for DownloadOptions {
    fn default() -> Self {
        Self { max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS }
    }
}

/// The download state machine of one region.
///
/// A background task does the work: whenever the region is set
/// [`Active`](DownloadState::Active) it discovers what the region needs,
/// fetches what the store doesn't have yet and links everything to the
/// region. Progress and failures arrive on the event channel returned by
/// [`spawn`](Self::spawn).
///
/// An activation ends in one of four ways:
/// - everything required is retained: the region becomes
///   [`Complete`](DownloadState::Complete);
/// - the hosted tile quota is hit: the region becomes
///   [`Inactive`](DownloadState::Inactive);
/// - the region was paused: it stays inactive, fetches already in flight
///   are still stored;
/// - some fetches failed: the region stays active but idle until it is set
///   active again, which retries.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct RegionDownload {
    region_id: i64,
    store: OfflineStore,
    control: Arc<watch::Sender<DownloadState>>,
    status: Arc<watch::Sender<RegionStatus>>,
    worker: JoinHandle<()>,
}

impl RegionDownload {
    /// Start the state machine for `region`. A region persisted as active
    /// resumes downloading right away.
    pub fn spawn(
        region: &Region,
        store: OfflineStore,
        source: SourceHandle,
        options: DownloadOptions,
    ) -> (Self, mpsc::UnboundedReceiver<RegionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let control = Arc::new(watch::Sender::new(region.download_state));
        let status = Arc::new(watch::Sender::new(RegionStatus {
            download_state: region.download_state,
            ..RegionStatus::default()
        }));
        let worker = Worker {
            region_id: region.id,
            definition: region.definition.clone(),
            store: store.clone(),
            source,
            max_concurrent_requests: options.max_concurrent_requests.max(1),
            control: Arc::clone(&control),
            status: Arc::clone(&status),
            events,
        };
        let worker = tokio::spawn(worker.run());
        let download = Self { region_id: region.id, store, control, status, worker };
        (download, receiver)
    }

    pub fn region_id(&self) -> i64 {
        self.region_id
    }

    pub fn state(&self) -> DownloadState {
        *self.control.borrow()
    }

    /// Request a new state and persist it.
    ///
    /// Setting an active region active again restarts its download; this is
    /// how failed fetches are retried. Only the download itself can mark a
    /// region complete.
    #[instrument(skip(self), fields(region = self.region_id))]
    pub async fn set_state(&self, state: DownloadState) -> Result<()> {
        if state == DownloadState::Complete {
            exn::bail!(ErrorKind::InvalidTransition(state));
        }
        self.store.set_region_download_state(self.region_id, state).await.or_raise(|| ErrorKind::Store)?;
        info!(%state, "download state requested");
        self.control.send_replace(state);
        Ok(())
    }

    /// Current progress. The required count is only known from the latest
    /// activation; before the first one it is zero and imprecise.
    pub async fn status(&self) -> Result<RegionStatus> {
        let completed = self.store.region_completed_status(self.region_id).await.or_raise(|| ErrorKind::Store)?;
        let last = *self.status.borrow();
        Ok(RegionStatus {
            download_state: self.state(),
            completed_resource_count: completed.completed_count(),
            completed_resource_size: completed.completed_size(),
            completed_tile_count: completed.completed_tile_count,
            completed_tile_size: completed.completed_tile_size,
            ..last
        })
    }
}

impl Drop for RegionDownload {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// How a single fetch went wrong.
enum Failure {
    Response(ResponseError),
    Storage(CacheErrorKind),
    TileCountLimitExceeded(u64),
}
impl From<CacheError> for Failure {
    fn from(err: CacheError) -> Self {
        match &*err {
            CacheErrorKind::TileCountLimitExceeded(limit) => Self::TileCountLimitExceeded(*limit),
            kind => Self::Storage(kind.clone()),
        }
    }
}

/// A fetch that finished, successfully or not. Metadata jobs carry the
/// document so the plan can expand.
struct Settled {
    job: Job,
    outcome: std::result::Result<Option<Vec<u8>>, Failure>,
}

struct Worker {
    region_id: i64,
    definition: RegionDefinition,
    store: OfflineStore,
    source: SourceHandle,
    max_concurrent_requests: usize,
    control: Arc<watch::Sender<DownloadState>>,
    status: Arc<watch::Sender<RegionStatus>>,
    events: mpsc::UnboundedSender<RegionEvent>,
}

impl Worker {
    async fn run(self) {
        let mut control = self.control.subscribe();
        loop {
            // The worker owns a sender, so the channel never closes.
            let activated = control.wait_for(|state| *state == DownloadState::Active).await.is_ok();
            if !activated {
                return;
            }
            self.activation().await;
            // A state requested during the activation is acted on right away.
            let requested = control.has_changed().unwrap_or(false);
            let idle = *control.borrow() == DownloadState::Active;
            if !requested && idle && control.changed().await.is_err() {
                return;
            }
        }
    }

    fn is_active(&self) -> bool {
        *self.control.borrow() == DownloadState::Active
    }

    #[instrument(skip(self), fields(region = self.region_id))]
    async fn activation(&self) {
        info!(style = %self.definition.style_url, "region download started");
        let mut events = pin!(self.activate());
        while let Some(event) = events.next().await {
            if let RegionEvent::Status(status) = &event {
                self.status.send_replace(*status);
            }
            // Nobody may be listening.
            _ = self.events.send(event);
        }
    }

    fn activate(&self) -> impl Stream<Item = RegionEvent> + '_ {
        // `rustfmt` does not format macros that use braces. Wrap in parentheses!
        stream!({
            let mut plan = Plan::new(self.definition.clone());
            let mut quota_limit = None;
            yield self.status_event(&plan, DownloadState::Active).await;

            let mut fetching = FuturesUnordered::new();
            loop {
                while quota_limit.is_none() && fetching.len() < self.max_concurrent_requests && self.is_active() {
                    let Some(job) = plan.next_job() else { break };
                    fetching.push(self.fetch(job));
                }
                let Some(Settled { job, outcome }) = fetching.next().await else { break };
                let data = match outcome {
                    Ok(data) => data,
                    Err(Failure::Response(err)) => {
                        warn!(url = %job.resource.url(), error = %err, "unable to fetch region resource");
                        yield RegionEvent::ResponseError(err);
                        None
                    },
                    Err(Failure::Storage(kind)) => {
                        error!(url = %job.resource.url(), error = %kind, "unable to store region resource");
                        yield RegionEvent::StorageError(kind);
                        None
                    },
                    Err(Failure::TileCountLimitExceeded(limit)) => {
                        if quota_limit.is_none() {
                            warn!(limit, "hosted tile count limit reached, stopping region download");
                            quota_limit = Some(limit);
                            yield RegionEvent::TileCountLimitExceeded(limit);
                        }
                        None
                    },
                };
                if let Some(metadata) = job.metadata {
                    plan.settle(metadata, data.as_deref());
                }
                // Fetches still settle after a pause; report the state asked for.
                let state = *self.control.borrow();
                yield self.status_event(&plan, state).await;
            }

            let state = match self.finish(&plan, quota_limit).await {
                Ok(state) => state,
                Err(err) => {
                    yield RegionEvent::StorageError((*err).clone());
                    *self.control.borrow()
                },
            };
            info!(%state, required = plan.required(), precise = plan.is_precise(), "region download stopped");
            yield self.status_event(&plan, state).await;
        })
    }

    /// Settle the state an activation ended in: complete, stopped by the
    /// quota, or left as is.
    async fn finish(&self, plan: &Plan, quota_limit: Option<u64>) -> std::result::Result<DownloadState, CacheError> {
        let target = match quota_limit {
            Some(_) => DownloadState::Inactive,
            None if !self.is_active() || !plan.is_drained() => return Ok(*self.control.borrow()),
            None => {
                let completed = self.store.region_completed_status(self.region_id).await?;
                match RegionStatus::new(DownloadState::Active, plan, completed).is_complete() {
                    true => DownloadState::Complete,
                    false => return Ok(DownloadState::Active),
                }
            },
        };
        // A pause or restart requested meanwhile wins.
        let changed = self.control.send_if_modified(|state| match *state == DownloadState::Active {
            true => {
                *state = target;
                true
            },
            false => false,
        });
        if changed {
            self.store.set_region_download_state(self.region_id, target).await?;
        }
        Ok(*self.control.borrow())
    }

    async fn status_event(&self, plan: &Plan, state: DownloadState) -> RegionEvent {
        match self.store.region_completed_status(self.region_id).await {
            Ok(completed) => RegionEvent::Status(RegionStatus::new(state, plan, completed)),
            Err(err) => RegionEvent::StorageError((*err).clone()),
        }
    }

    async fn fetch(&self, job: Job) -> Settled {
        let outcome = self.fetch_inner(&job).await;
        Settled { job, outcome }
    }

    /// Cache first; the fetch source is only asked for what the store
    /// doesn't have.
    async fn fetch_inner(&self, job: &Job) -> std::result::Result<Option<Vec<u8>>, Failure> {
        let resource = &job.resource;
        let cached = match job.metadata {
            Some(_) => self.store.get(resource.clone()).await?.map(|entry| entry.data),
            None => self.store.has(resource.clone()).await?.map(|_| None),
        };
        if let Some(data) = cached {
            self.store.link_region_resource(self.region_id, resource.clone()).await?;
            debug!(url = %resource.url(), "region resource found in cache");
            return Ok(data);
        }
        if self.store.exceeds_tile_count_limit(resource.clone()).await? {
            return Err(Failure::TileCountLimitExceeded(self.store.tile_count_limit().await?));
        }
        let response = self.source.request(resource).await;
        if let Some(err) = response.error {
            return Err(Failure::Response(err));
        }
        let data = job.metadata.and(response.data.clone());
        self.store.put_region_resource(self.region_id, resource.clone(), response).await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tessera_cache::{LatLngBounds, StoreOptions};
    use tessera_source::{ErrorReason, FileSource, MockSource, Resource, ResourceKind, Response};
    use tokio::sync::Semaphore;

    const STYLE_URL: &str = "https://example.com/style.json";
    const TILES: &str = "https://t.example/{z}/{x}/{y}.pbf";
    const HOSTED_STYLE_URL: &str = "mapbox://styles/test/style";
    const HOSTED_TILES: &str = "mapbox://tiles/test.streets/{z}/{x}/{y}.vector.pbf";

    fn style_with_tiles(template: &str) -> Response {
        let style = format!(r#"{{"version": 8, "sources": {{"s": {{"type": "vector", "tiles": ["{template}"]}}}}}}"#);
        Response::ok(style.into_bytes())
    }

    /// The whole world at zoom 0: a single tile per pyramid.
    fn world(style_url: &str) -> RegionDefinition {
        RegionDefinition::new(style_url, LatLngBounds::world(), 0.0, 0.0, 1.0)
    }

    async fn start(
        store: &OfflineStore,
        source: &Arc<MockSource>,
        definition: RegionDefinition,
    ) -> (RegionDownload, mpsc::UnboundedReceiver<RegionEvent>) {
        let region = store.create_region(definition, b"test".to_vec()).await.unwrap();
        let source: SourceHandle = source.clone();
        RegionDownload::spawn(&region, store.clone(), source, DownloadOptions::default())
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<RegionEvent>) -> RegionEvent {
        tokio::time::timeout(Duration::from_secs(10), events.recv()).await.unwrap().unwrap()
    }

    /// Collect events until the activation settles into a state other than
    /// active; returns the final status and everything before it.
    async fn until_stopped(events: &mut mpsc::UnboundedReceiver<RegionEvent>) -> (RegionStatus, Vec<RegionEvent>) {
        let mut seen = Vec::new();
        loop {
            match next_event(events).await {
                RegionEvent::Status(status) if status.download_state != DownloadState::Active => return (status, seen),
                event => seen.push(event),
            }
        }
    }

    #[tokio::test]
    async fn test_style_without_resources_completes() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::with_responses([(STYLE_URL, Response::ok(br#"{"version": 8}"#.to_vec()))]));
        let (download, mut events) = start(&store, &source, world(STYLE_URL)).await;

        download.set_state(DownloadState::Active).await.unwrap();
        let (status, _) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Complete);
        assert_eq!(status.completed_resource_count, 1);
        assert_eq!(status.required_resource_count, 1);
        assert!(status.required_resource_count_is_precise);
        assert_eq!(download.state(), DownloadState::Complete);
        let region = store.get_region(download.region_id()).await.unwrap();
        assert_eq!(region.download_state, DownloadState::Complete);
    }

    #[tokio::test]
    async fn test_inline_tile_pyramid_completes() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::with_responses([
            (STYLE_URL.to_string(), style_with_tiles(TILES)),
            ("https://t.example/0/0/0.pbf".to_string(), Response::ok(b"tile".to_vec())),
        ]));
        let (download, mut events) = start(&store, &source, world(STYLE_URL)).await;

        download.set_state(DownloadState::Active).await.unwrap();
        let (status, seen) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Complete);
        assert_eq!(status.completed_resource_count, 2);
        assert_eq!(status.completed_tile_count, 1);
        assert!(status.completed_tile_size > 0);
        assert!(status.required_resource_count_is_precise);
        assert!(seen.iter().all(|event| matches!(event, RegionEvent::Status(_))));
        assert!(store.has(Resource::tile(TILES, 1.0, 0, 0, 0)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_quota_stops_download_before_fetching_tile() {
        let options = StoreOptions { tile_count_limit: 0, ..StoreOptions::default() };
        let store = OfflineStore::open_in_memory(options).await.unwrap();
        let source = Arc::new(MockSource::with_responses([(HOSTED_STYLE_URL, style_with_tiles(HOSTED_TILES))]));
        let (download, mut events) = start(&store, &source, world(HOSTED_STYLE_URL)).await;

        download.set_state(DownloadState::Active).await.unwrap();
        let (status, seen) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Inactive);
        assert_eq!(status.completed_resource_count, 1);
        let quota_events = seen.iter().filter(|event| matches!(event, RegionEvent::TileCountLimitExceeded(0))).count();
        assert_eq!(quota_events, 1);
        assert_eq!(source.requests().await, vec![Resource::style(HOSTED_STYLE_URL)]);
        let region = store.get_region(download.region_id()).await.unwrap();
        assert_eq!(region.download_state, DownloadState::Inactive);
    }

    #[tokio::test]
    async fn test_precision_arrives_with_tilejson_and_never_reverts() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let style = br#"{"version": 8, "sources": {"s": {"type": "vector", "url": "https://example.com/tiles.json"}}}"#;
        let source = Arc::new(MockSource::with_responses([
            (STYLE_URL, Response::ok(style.to_vec())),
            ("https://example.com/tiles.json", Response::ok(format!(r#"{{"tiles": ["{TILES}"]}}"#).into_bytes())),
            ("https://t.example/0/0/0.pbf", Response::ok(b"tile".to_vec())),
        ]));
        let (download, mut events) = start(&store, &source, world(STYLE_URL)).await;

        download.set_state(DownloadState::Active).await.unwrap();
        let (status, seen) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Complete);
        assert_eq!(status.completed_resource_count, 3);

        let precision: Vec<bool> = seen
            .iter()
            .filter_map(|event| match event {
                RegionEvent::Status(status) => Some(status.required_resource_count_is_precise),
                _ => None,
            })
            .collect();
        assert_eq!(precision.first(), Some(&false));
        let first_precise = precision.iter().position(|precise| *precise).unwrap();
        assert!(precision[first_precise..].iter().all(|precise| *precise));
    }

    #[tokio::test]
    async fn test_transport_error_keeps_region_active_until_retried() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::with_responses([(STYLE_URL, style_with_tiles(TILES))]));
        let (download, mut events) = start(&store, &source, world(STYLE_URL)).await;

        download.set_state(DownloadState::Active).await.unwrap();
        let err = loop {
            if let RegionEvent::ResponseError(err) = next_event(&mut events).await {
                break err;
            }
        };
        assert_eq!(err.reason, ErrorReason::NotFound);
        let status = loop {
            if let RegionEvent::Status(status) = next_event(&mut events).await {
                break status;
            }
        };
        assert_eq!(status.download_state, DownloadState::Active);
        assert_eq!(status.completed_resource_count, 1);
        assert_eq!(download.state(), DownloadState::Active);

        source.insert("https://t.example/0/0/0.pbf", Response::ok(b"tile".to_vec())).await;
        download.set_state(DownloadState::Active).await.unwrap();
        let (status, _) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Complete);
        assert_eq!(status.completed_resource_count, 2);
    }

    #[tokio::test]
    async fn test_restarting_a_complete_region_uses_only_the_cache() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::with_responses([
            (STYLE_URL.to_string(), style_with_tiles(TILES)),
            ("https://t.example/0/0/0.pbf".to_string(), Response::ok(b"tile".to_vec())),
        ]));
        let (download, mut events) = start(&store, &source, world(STYLE_URL)).await;
        download.set_state(DownloadState::Active).await.unwrap();
        until_stopped(&mut events).await;
        let requests = source.request_count().await;

        download.set_state(DownloadState::Active).await.unwrap();
        let (status, _) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Complete);
        assert_eq!(status.completed_resource_count, 2);
        assert_eq!(source.request_count().await, requests);
    }

    #[tokio::test]
    async fn test_pause_stops_new_fetches() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::with_responses([(STYLE_URL, style_with_tiles(TILES))]));
        let mut definition = world(STYLE_URL);
        definition.max_zoom = 3.0;
        let region = store.create_region(definition, Vec::new()).await.unwrap();
        let handle: SourceHandle = source.clone();
        let options = DownloadOptions { max_concurrent_requests: 1 };
        let (download, mut events) = RegionDownload::spawn(&region, store.clone(), handle, options);

        download.set_state(DownloadState::Active).await.unwrap();
        // Pause as soon as the first tile failed.
        loop {
            if let RegionEvent::ResponseError(_) = next_event(&mut events).await {
                break;
            }
        }
        download.set_state(DownloadState::Inactive).await.unwrap();
        let (status, _) = until_stopped(&mut events).await;
        assert_eq!(status.download_state, DownloadState::Inactive);
        assert!(!status.is_complete());
        // 1 + 4 + 16 + 64 tiles were required, far fewer were attempted.
        assert_eq!(status.required_resource_count, 86);
        assert!(source.request_count().await < 86);
        let region = store.get_region(download.region_id()).await.unwrap();
        assert_eq!(region.download_state, DownloadState::Inactive);
    }

    /// Holds tile requests until the test hands out permits.
    struct GatedSource {
        inner: MockSource,
        gate: Semaphore,
        started: mpsc::UnboundedSender<Resource>,
    }

    #[async_trait]
    impl FileSource for GatedSource {
        fn name(&self) -> &str {
            "gated"
        }

        async fn request(&self, resource: &Resource) -> Response {
            if resource.kind() == ResourceKind::Tile {
                _ = self.started.send(resource.clone());
                let _permit = self.gate.acquire().await.unwrap();
            }
            self.inner.request(resource).await
        }
    }

    #[tokio::test]
    async fn test_fetches_in_flight_are_stored_after_pause() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let mut responses = vec![(STYLE_URL.to_string(), style_with_tiles(TILES))];
        for (x, y, z) in [(0, 0, 0), (0, 0, 1), (1, 0, 1), (0, 1, 1), (1, 1, 1)] {
            responses.push((format!("https://t.example/{z}/{x}/{y}.pbf"), Response::ok(b"tile".to_vec())));
        }
        let (started, mut started_rx) = mpsc::unbounded_channel();
        let source = Arc::new(GatedSource {
            inner: MockSource::with_responses(responses),
            gate: Semaphore::new(0),
            started,
        });
        let mut definition = world(STYLE_URL);
        definition.max_zoom = 1.0;
        let region = store.create_region(definition, Vec::new()).await.unwrap();
        let handle: SourceHandle = source.clone();
        let options = DownloadOptions { max_concurrent_requests: 2 };
        let (download, mut events) = RegionDownload::spawn(&region, store.clone(), handle, options);

        download.set_state(DownloadState::Active).await.unwrap();
        let mut in_flight = Vec::new();
        for _ in 0..2 {
            let tile = tokio::time::timeout(Duration::from_secs(10), started_rx.recv()).await.unwrap().unwrap();
            in_flight.push(tile);
        }
        download.set_state(DownloadState::Inactive).await.unwrap();
        source.gate.add_permits(10);

        let status = loop {
            let RegionEvent::Status(status) = next_event(&mut events).await else { continue };
            if status.completed_tile_count > 0 {
                // Progress made after the pause must not claim the region is active.
                assert_eq!(status.download_state, DownloadState::Inactive);
            }
            if status.completed_tile_count == 2 {
                break status;
            }
        };
        assert_eq!(status.download_state, DownloadState::Inactive);
        assert!(!status.is_complete());
        for tile in in_flight {
            assert!(store.has(tile).await.unwrap().is_some());
        }
        let completed = store.region_completed_status(download.region_id()).await.unwrap();
        assert_eq!(completed.completed_tile_count, 2);
        // The style and the two tiles that were in flight; nothing after the pause.
        assert_eq!(source.inner.request_count().await, 3);
        assert!(started_rx.try_recv().is_err());
        let region = store.get_region(download.region_id()).await.unwrap();
        assert_eq!(region.download_state, DownloadState::Inactive);
    }

    #[tokio::test]
    async fn test_complete_cannot_be_requested() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::default());
        let (download, _events) = start(&store, &source, world(STYLE_URL)).await;
        let err = download.set_state(DownloadState::Complete).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidTransition(DownloadState::Complete));
        assert_eq!(download.state(), DownloadState::Inactive);
    }

    #[tokio::test]
    async fn test_status_before_first_activation() {
        let store = OfflineStore::open_in_memory(StoreOptions::default()).await.unwrap();
        let source = Arc::new(MockSource::default());
        let (download, _events) = start(&store, &source, world(STYLE_URL)).await;
        let status = download.status().await.unwrap();
        assert_eq!(status, RegionStatus::default());
    }
}
