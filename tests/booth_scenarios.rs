// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end booth sessions on paused tokio time

use futures::FutureExt;
use futures::future::BoxFuture;
use image::{Rgba, RgbaImage};
use photobooth::app::{
    BoothEvent, BoothRuntime, BoothSettings, CameraStatus, CaptureState, Cue, NotificationKind,
    PhotoBooth, View,
};
use photobooth::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraBackendManager, CameraBackendType,
    CameraFrame, CameraSource,
};
use photobooth::errors::{AppError, AppResult};
use photobooth::pipelines::photo::PhotoEncoder;
use photobooth::pipelines::strip::{PhotoDecoder, StripLayout, StripRenderer};
use photobooth::storage::{FileStore, KeyValueStore, MemoryStore, Photo, PhotoStore};
use photobooth::{FilterType, Message, StripTemplate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn pattern_camera() -> CameraBackendManager {
    CameraBackendManager::new(&CameraSource::Pattern {
        width: 64,
        height: 48,
    })
}

fn runtime_over(
    camera: CameraBackendManager,
    store: Arc<dyn KeyValueStore>,
    output: &std::path::Path,
) -> (BoothRuntime, UnboundedReceiver<BoothEvent>) {
    let (booth, events) = PhotoBooth::new(camera, store, BoothSettings::default());
    let runtime = BoothRuntime::new(booth, StripRenderer::new(), output.to_path_buf());
    (runtime, events)
}

fn drain(events: &mut UnboundedReceiver<BoothEvent>) -> Vec<BoothEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn states(events: &[BoothEvent]) -> Vec<CaptureState> {
    events
        .iter()
        .filter_map(|e| match e {
            BoothEvent::StateChanged(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn count_notifications(events: &[BoothEvent], kind: NotificationKind) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, BoothEvent::Notify(n) if n.kind == kind))
        .count()
}

fn solid_photo(color: [u8; 3]) -> Photo {
    let image = RgbaImage::from_pixel(64, 48, Rgba([color[0], color[1], color[2], 255]));
    Photo::jpeg(PhotoEncoder::new().encode_jpeg(&image).unwrap())
}

fn assert_close(actual: [u8; 4], expected: [u8; 3]) {
    for c in 0..3 {
        assert!(
            (actual[c] as i32 - expected[c] as i32).abs() <= 40,
            "{actual:?} vs {expected:?}"
        );
    }
}

const COLORS: [[u8; 3]; 4] = [[220, 30, 30], [30, 200, 30], [30, 30, 220], [230, 220, 30]];

#[tokio::test(start_paused = true)]
async fn test_full_automatic_run() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());

    runtime.start();
    runtime.settle().await;
    assert_eq!(runtime.booth().camera_status(), CameraStatus::Ready);
    drain(&mut events);

    let started = tokio::time::Instant::now();
    runtime.dispatch(Message::StartSequence);
    runtime.settle().await;

    let events = drain(&mut events);
    let mut expected = Vec::new();
    for _ in 0..4 {
        expected.extend([
            CaptureState::Countdown(3),
            CaptureState::Countdown(2),
            CaptureState::Countdown(1),
            CaptureState::Capturing,
            CaptureState::Cooldown,
        ]);
    }
    expected.push(CaptureState::Idle);
    assert_eq!(states(&events), expected);

    // Four countdowns of three seconds plus four cooldowns
    assert_eq!(started.elapsed(), Duration::from_millis(16_800));

    let booth = runtime.booth();
    assert_eq!(booth.photo_count(), 4);
    assert_eq!(booth.capture_state(), CaptureState::Idle);
    assert_eq!(booth.view(), View::Strip);
    assert_eq!(count_notifications(&events, NotificationKind::StripCompleted), 1);
    assert_eq!(count_notifications(&events, NotificationKind::PhotoCaptured), 4);

    let cues: Vec<Cue> = events
        .iter()
        .filter_map(|e| match e {
            BoothEvent::Cue(c) => Some(*c),
            _ => None,
        })
        .collect();
    assert_eq!(cues.iter().filter(|c| **c == Cue::Beep).count(), 12);
    assert_eq!(cues.iter().filter(|c| **c == Cue::Flash).count(), 4);
    assert_eq!(cues.iter().filter(|c| **c == Cue::Confetti).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retake_replaces_one_photo() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());
    runtime.start();
    runtime.settle().await;
    runtime.dispatch(Message::StartSequence);
    runtime.settle().await;
    let before = runtime.booth().photos().to_vec();
    assert_eq!(before.len(), 4);
    drain(&mut events);

    runtime.dispatch(Message::SelectFilter(FilterType::Invert));
    runtime.dispatch(Message::Retake(2));
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(
        states(&events),
        vec![
            CaptureState::Countdown(3),
            CaptureState::Countdown(2),
            CaptureState::Countdown(1),
            CaptureState::Capturing,
            CaptureState::Cooldown,
            CaptureState::Idle,
        ]
    );
    assert_eq!(count_notifications(&events, NotificationKind::RetakeStarted), 1);
    assert_eq!(count_notifications(&events, NotificationKind::StripCompleted), 0);

    let after = runtime.booth().photos();
    assert_eq!(after.len(), 4);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[1]);
    assert_ne!(after[2], before[2]);
    assert_eq!(after[3], before[3]);
    assert_eq!(runtime.booth().view(), View::Strip);
}

#[tokio::test(start_paused = true)]
async fn test_download_with_two_photos_is_rejected() {
    let out = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut seeded = PhotoStore::new(Arc::clone(&store));
    seeded.append(solid_photo(COLORS[0])).unwrap();
    seeded.append(solid_photo(COLORS[1])).unwrap();
    seeded.persist().unwrap();

    let (mut booth, _events) =
        PhotoBooth::new(pattern_camera(), Arc::clone(&store), BoothSettings::default());
    assert_eq!(booth.photo_count(), 2);
    assert_eq!(
        booth.request_download(StripTemplate::Classic).unwrap_err(),
        AppError::InsufficientPhotos { needed: 2 }
    );

    let (mut runtime, mut events) = runtime_over(pattern_camera(), store, out.path());
    runtime.dispatch(Message::Download(StripTemplate::Classic));
    assert_eq!(runtime.pending(), 0);

    let events = drain(&mut events);
    let rejection = events
        .iter()
        .find_map(|e| match e {
            BoothEvent::Notify(n) if n.kind == NotificationKind::NotEnoughPhotos => Some(n),
            _ => None,
        })
        .expect("rejection notification");
    assert_eq!(
        rejection.description,
        "Take 2 more photos to complete your strip!"
    );
    assert_eq!(count_notifications(&events, NotificationKind::DownloadStarted), 0);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

/// Camera whose device refuses access
struct DeniedCamera;

impl CameraBackend for DeniedCamera {
    fn activate(&mut self) -> BackendResult<()> {
        Err(BackendError::PermissionDenied("/dev/video0".into()))
    }

    fn deactivate(&mut self) -> BackendResult<()> {
        Ok(())
    }

    fn is_active(&self) -> bool {
        false
    }

    fn capture_frame(&self) -> BackendResult<CameraFrame> {
        Err(BackendError::NotActive)
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_leaves_booth_idle() {
    let out = tempfile::tempdir().unwrap();
    let camera = CameraBackendManager::with_backend(Box::new(DeniedCamera));
    let (mut runtime, mut events) = runtime_over(camera, Arc::new(MemoryStore::new()), out.path());

    runtime.start();
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::CameraError), 1);
    assert_eq!(runtime.booth().camera_status(), CameraStatus::Unavailable);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);

    runtime.dispatch(Message::StartSequence);
    assert_eq!(runtime.pending(), 0);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);
}

#[tokio::test]
async fn test_modern_render_places_photos_in_grid_order() {
    let photos: Vec<Photo> = COLORS.iter().map(|c| solid_photo(*c)).collect();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

    let strip = StripRenderer::new()
        .render_on(&photos, StripTemplate::Modern, date)
        .await
        .unwrap();
    assert_eq!(strip.image.dimensions(), (1000, 900));

    let layout = StripLayout::for_template(StripTemplate::Modern);
    // Row-major 2x2: top-left, top-right, bottom-left, bottom-right
    assert!(layout.slots[0].x < layout.slots[1].x);
    assert_eq!(layout.slots[0].y, layout.slots[1].y);
    assert!(layout.slots[0].y < layout.slots[2].y);
    for (slot, color) in layout.slots.iter().zip(COLORS) {
        let (cx, cy) = slot.center();
        assert_close(strip.image.get_pixel(cx, cy).0, color);
    }
}

/// Decoder whose first call finishes last
struct ReversedLatencyDecoder {
    calls: AtomicUsize,
    finished: Arc<Mutex<Vec<usize>>>,
}

impl PhotoDecoder for ReversedLatencyDecoder {
    fn decode(&self, photo: Photo) -> BoxFuture<'static, AppResult<RgbaImage>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = Duration::from_millis(50 * (4 - call as u64));
        let finished = Arc::clone(&self.finished);
        async move {
            tokio::time::sleep(delay).await;
            finished.lock().unwrap().push(call);
            image::load_from_memory(photo.bytes())
                .map(|img| img.to_rgba8())
                .map_err(|e| AppError::ExportFailed(e.to_string()))
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_composite_order_survives_reversed_decode_latency() {
    let finished = Arc::new(Mutex::new(Vec::new()));
    let renderer = StripRenderer::with_decoder(Arc::new(ReversedLatencyDecoder {
        calls: AtomicUsize::new(0),
        finished: Arc::clone(&finished),
    }));
    let photos: Vec<Photo> = COLORS.iter().map(|c| solid_photo(*c)).collect();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

    let strip = renderer
        .render_on(&photos, StripTemplate::Classic, date)
        .await
        .unwrap();

    assert_eq!(*finished.lock().unwrap(), vec![3, 2, 1, 0]);
    let layout = StripLayout::for_template(StripTemplate::Classic);
    for (slot, color) in layout.slots.iter().zip(COLORS) {
        let (cx, cy) = slot.center();
        assert_close(strip.image.get_pixel(cx, cy).0, color);
    }
}

#[tokio::test]
async fn test_render_rejects_incomplete_set() {
    let photos = vec![solid_photo(COLORS[0])];
    let err = StripRenderer::new()
        .render(&photos, StripTemplate::Polaroid)
        .await
        .unwrap_err();
    assert_eq!(err, AppError::InsufficientPhotos { needed: 3 });
}

#[tokio::test(start_paused = true)]
async fn test_photos_survive_restart_and_export() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let first = {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data.path()));
        let (mut runtime, _events) = runtime_over(pattern_camera(), store, out.path());
        runtime.start();
        runtime.settle().await;
        runtime.dispatch(Message::StartSequence);
        runtime.settle().await;
        runtime.booth().photos().to_vec()
    };
    assert_eq!(first.len(), 4);

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data.path()));
    let (mut runtime, mut events) = runtime_over(pattern_camera(), store, out.path());
    assert_eq!(runtime.booth().photos(), first.as_slice());

    runtime.dispatch(Message::Download(StripTemplate::Vintage));
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::DownloadStarted), 1);
    assert_eq!(count_notifications(&events, NotificationKind::DownloadSucceeded), 1);

    let name = format!(
        "photobooth-vintage-{}.jpg",
        chrono::Local::now().date_naive().format("%Y-%m-%d")
    );
    let saved = image::open(out.path().join(name)).unwrap();
    assert_eq!((saved.width(), saved.height()), (800, 1240));
}

#[tokio::test(start_paused = true)]
async fn test_camera_off_mid_countdown_keeps_photos() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());
    runtime.start();
    runtime.settle().await;

    runtime.dispatch(Message::ToggleManualMode);
    runtime.dispatch(Message::TriggerCapture);
    runtime.settle().await;
    assert_eq!(runtime.booth().photo_count(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    runtime.dispatch(Message::TriggerCapture);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Countdown(3));
    runtime.dispatch(Message::ToggleCamera);
    runtime.settle().await;

    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);
    assert_eq!(runtime.booth().camera_status(), CameraStatus::Off);
    assert_eq!(runtime.booth().photo_count(), 1);
    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::CameraDeactivated), 1);
}

fn seeded_store(count: usize) -> Arc<dyn KeyValueStore> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut seeded = PhotoStore::new(Arc::clone(&store));
    for color in COLORS.iter().take(count) {
        seeded.append(solid_photo(*color)).unwrap();
    }
    seeded.persist().unwrap();
    store
}

fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Decoder that takes its time and counts the calls it has started
struct SlowDecoder {
    started: Arc<AtomicUsize>,
}

impl PhotoDecoder for SlowDecoder {
    fn decode(&self, photo: Photo) -> BoxFuture<'static, AppResult<RgbaImage>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            image::load_from_memory(photo.bytes())
                .map(|img| img.to_rgba8())
                .map_err(|e| AppError::ExportFailed(e.to_string()))
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_dropping_runtime_abandons_render() {
    let out = tempfile::tempdir().unwrap();
    let started = Arc::new(AtomicUsize::new(0));
    let (booth, _events) =
        PhotoBooth::new(pattern_camera(), seeded_store(4), BoothSettings::default());
    let renderer = StripRenderer::with_decoder(Arc::new(SlowDecoder {
        started: Arc::clone(&started),
    }));
    let mut runtime = BoothRuntime::new(booth, renderer, out.path().to_path_buf());

    runtime.dispatch(Message::Download(StripTemplate::Classic));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(started.load(Ordering::SeqCst), 4);

    drop(runtime);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(file_count(out.path()), 0);
}

/// Decoder that fails on one photo
struct FailingDecoder {
    calls: AtomicUsize,
}

impl PhotoDecoder for FailingDecoder {
    fn decode(&self, photo: Photo) -> BoxFuture<'static, AppResult<RgbaImage>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if call == 2 {
                return Err(AppError::ExportFailed("bad".into()));
            }
            image::load_from_memory(photo.bytes())
                .map(|img| img.to_rgba8())
                .map_err(|e| AppError::ExportFailed(e.to_string()))
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_one_failed_decode_fails_the_download() {
    let out = tempfile::tempdir().unwrap();
    let (booth, mut events) =
        PhotoBooth::new(pattern_camera(), seeded_store(4), BoothSettings::default());
    let renderer = StripRenderer::with_decoder(Arc::new(FailingDecoder {
        calls: AtomicUsize::new(0),
    }));
    let mut runtime = BoothRuntime::new(booth, renderer, out.path().to_path_buf());

    runtime.dispatch(Message::Download(StripTemplate::Polaroid));
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::DownloadStarted), 1);
    assert_eq!(count_notifications(&events, NotificationKind::DownloadSucceeded), 0);
    let failure = events
        .iter()
        .find_map(|e| match e {
            BoothEvent::Notify(n) if n.kind == NotificationKind::DownloadFailed => Some(n),
            _ => None,
        })
        .expect("failure notification");
    assert_eq!(failure.description, "Export failed: bad");
    assert_eq!(file_count(out.path()), 0);
    assert_eq!(runtime.booth().photo_count(), 4);
}

async fn full_strip(runtime: &mut BoothRuntime) -> Vec<Photo> {
    runtime.start();
    runtime.settle().await;
    runtime.dispatch(Message::StartSequence);
    runtime.settle().await;
    runtime.booth().photos().to_vec()
}

#[tokio::test(start_paused = true)]
async fn test_deleting_retake_target_cancels_retake() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());
    let before = full_strip(&mut runtime).await;
    assert_eq!(before.len(), 4);
    drain(&mut events);

    runtime.dispatch(Message::Retake(2));
    assert_eq!(runtime.booth().capture_state(), CaptureState::Countdown(3));
    runtime.dispatch(Message::DeletePhoto(2));
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::PhotoCaptured), 0);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);
    assert_eq!(
        runtime.booth().photos(),
        &[before[0].clone(), before[1].clone(), before[3].clone()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_deleting_earlier_photo_keeps_retake_on_its_photo() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());
    let before = full_strip(&mut runtime).await;
    drain(&mut events);

    runtime.dispatch(Message::SelectFilter(FilterType::Invert));
    runtime.dispatch(Message::Retake(2));
    runtime.dispatch(Message::DeletePhoto(0));
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::PhotoCaptured), 1);
    let after = runtime.booth().photos();
    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[1]);
    assert_ne!(after[1], before[2]);
    assert_eq!(after[2], before[3]);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_sequence_stops_it() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());
    runtime.start();
    runtime.settle().await;
    drain(&mut events);

    runtime.dispatch(Message::StartSequence);
    while runtime.booth().photo_count() < 1 {
        assert!(runtime.next().await);
    }
    runtime.dispatch(Message::Reset);
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::PhotoCaptured), 1);
    assert_eq!(count_notifications(&events, NotificationKind::PhotosCleared), 1);
    assert_eq!(runtime.booth().photo_count(), 0);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);
    assert_eq!(runtime.booth().view(), View::Camera);
}

#[tokio::test(start_paused = true)]
async fn test_delete_during_sequence_is_refilled() {
    let out = tempfile::tempdir().unwrap();
    let (mut runtime, mut events) =
        runtime_over(pattern_camera(), Arc::new(MemoryStore::new()), out.path());
    runtime.start();
    runtime.settle().await;
    drain(&mut events);

    runtime.dispatch(Message::StartSequence);
    while runtime.booth().photo_count() < 2 {
        assert!(runtime.next().await);
    }
    let second = runtime.booth().photos()[1].clone();
    runtime.dispatch(Message::DeletePhoto(0));
    runtime.settle().await;

    let events = drain(&mut events);
    assert_eq!(count_notifications(&events, NotificationKind::PhotoCaptured), 5);
    assert_eq!(count_notifications(&events, NotificationKind::StripCompleted), 1);
    assert_eq!(runtime.booth().photo_count(), 4);
    assert_eq!(runtime.booth().photos()[0], second);
    assert_eq!(runtime.booth().capture_state(), CaptureState::Idle);
}
