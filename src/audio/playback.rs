use std::{
    io::{self, Cursor, Read, Seek, SeekFrom},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use reqwest::blocking::Client;
use flume::Sender;
use rodio::{Decoder, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info, warn};

use crate::audio::{
    error::AudioError,
    probe::{FormatSupport, StaticFormatProbe},
    progress::LoadProgress,
    traits::MediaElement,
};

const READ_CHUNK: usize = 64 * 1024;
/// Audio decoded before a length is guessed for sources that carry none.
const ESTIMATE_WINDOW: Duration = Duration::from_secs(20);

#[derive(Default)]
struct LoadedSource {
    generation: u64,
    bytes: Option<Arc<[u8]>>,
}

/// [`MediaElement`] on top of a rodio [`Sink`] bound to the default output
/// device. Sources are downloaded whole and decoded from memory.
pub struct RodioElement {
    _output: Sender<()>,
    sink: Arc<Sink>,
    http_client: Client,
    source_url: Option<String>,
    loaded: Arc<Mutex<LoadedSource>>,
    progress: Arc<LoadProgress>,
    started: bool,
    parked_position: Duration,
    rate: f32,
}

impl RodioElement {
    pub fn new() -> Result<Self, AudioError> {
        let (output, sink) = open_output()?;
        sink.pause();
        let http_client = Client::builder()
            .build()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        Ok(Self {
            _output: output,
            sink,
            http_client,
            source_url: None,
            loaded: Arc::new(Mutex::new(LoadedSource::default())),
            progress: Arc::new(LoadProgress::new()),
            started: false,
            parked_position: Duration::ZERO,
            rate: 1.0,
        })
    }

    /// Formats the compiled-in symphonia decoders handle. Opus shares the
    /// Ogg container but has no decoder here.
    pub fn format_probe() -> StaticFormatProbe {
        StaticFormatProbe::new()
            .with("audio/ogg; codecs=opus", FormatSupport::No)
            .probably([
                "audio/mpeg",
                "audio/mp3",
                "audio/mp4",
                "audio/aac",
                "audio/x-m4a",
                "audio/flac",
                "audio/wav",
                "audio/x-wav",
                "audio/ogg",
            ])
    }

    fn decoder(&self) -> Result<Decoder<Cursor<Arc<[u8]>>>, AudioError> {
        let loaded = self
            .loaded
            .lock()
            .map_err(|_| AudioError::StreamError("loader poisoned".into()))?;
        let bytes = loaded
            .bytes
            .clone()
            .filter(|_| self.progress.is_current(loaded.generation))
            .ok_or_else(|| AudioError::StreamError("source is not loaded yet".into()))?;
        Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::DecodingError(e.to_string()))
    }

    fn is_drained(&self) -> bool {
        self.sink.empty()
    }
}

impl MediaElement for RodioElement {
    fn set_source(&mut self, url: &str) {
        self.source_url = Some(url.to_string());
    }

    fn load(&mut self) {
        let generation = self.progress.reset();
        self.sink.clear();
        self.started = false;
        self.parked_position = Duration::ZERO;

        let Some(url) = self.source_url.clone() else {
            return;
        };

        let http_client = self.http_client.clone();
        let loaded = self.loaded.clone();
        let progress = self.progress.clone();

        let spawned = thread::Builder::new()
            .name("shiur-loader".into())
            .spawn(move || {
                let start = Instant::now();
                let bytes = match fetch(&http_client, &url, &progress, generation) {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => {
                        debug!(url = url.as_str(), "rodio_load_superseded");
                        return;
                    }
                    Err(e) => {
                        warn!(url = url.as_str(), error = %e, "rodio_source_failed");
                        return;
                    }
                };

                {
                    let Ok(mut slot) = loaded.lock() else {
                        return;
                    };
                    if !progress.is_current(generation) {
                        return;
                    }
                    *slot = LoadedSource {
                        generation,
                        bytes: Some(bytes.clone()),
                    };
                }

                match measure(bytes, &progress, generation) {
                    Ok(Some(duration)) => info!(
                        url = url.as_str(),
                        duration_ms = duration.as_millis() as u64,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "rodio_source_loaded"
                    ),
                    Ok(None) => debug!(url = url.as_str(), "rodio_load_superseded"),
                    Err(e) => warn!(url = url.as_str(), error = %e, "rodio_source_failed"),
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "rodio_loader_spawn_failed");
        }
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.started || self.is_drained() {
            let decoder = self.decoder()?;
            self.sink.append(decoder);
            self.started = true;
            if !self.parked_position.is_zero() {
                if let Err(e) = self.sink.try_seek(self.parked_position) {
                    warn!(error = %e, "rodio_seek_failed");
                }
            }
            self.parked_position = Duration::ZERO;
        }
        self.sink.set_speed(self.rate);
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn paused(&self) -> bool {
        !self.started || self.sink.is_paused() || self.is_drained()
    }

    fn ended(&self) -> bool {
        self.started && self.is_drained()
    }

    fn current_time(&self) -> Duration {
        if self.started && !self.is_drained() {
            self.sink.get_pos()
        } else {
            self.parked_position
        }
    }

    fn set_current_time(&mut self, position: Duration) {
        if self.started && !self.is_drained() {
            if let Err(e) = self.sink.try_seek(position) {
                warn!(error = %e, "rodio_seek_failed");
            }
        } else {
            self.started = false;
            self.parked_position = position;
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.progress.total_duration()
    }

    fn playback_rate(&self) -> f32 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.rate = rate;
        self.sink.set_speed(rate);
    }

    fn buffered_ratio(&self) -> f64 {
        self.progress.buffered_ratio()
    }
}

/// The output stream stays on its own thread for as long as the returned
/// sender is alive; only the sink crosses threads.
fn open_output() -> Result<(Sender<()>, Arc<Sink>), AudioError> {
    let (ready_tx, ready_rx) = flume::bounded(1);
    let (shutdown_tx, shutdown_rx) = flume::bounded::<()>(0);

    thread::Builder::new()
        .name("shiur-output".into())
        .spawn(move || {
            let stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(AudioError::DeviceError(e.to_string())));
                    return;
                }
            };
            let sink = Arc::new(Sink::connect_new(stream.mixer()));
            let _ = ready_tx.send(Ok(sink));
            let _ = shutdown_rx.recv();
            drop(stream);
        })
        .map_err(|e| AudioError::DeviceError(e.to_string()))?;

    let sink = ready_rx
        .recv()
        .map_err(|_| AudioError::DeviceError("output thread exited".into()))??;
    Ok((shutdown_tx, sink))
}

/// Downloads the whole source. `None` means a newer load took over.
fn fetch(
    http_client: &Client,
    url: &str,
    progress: &LoadProgress,
    generation: u64,
) -> Result<Option<Arc<[u8]>>, AudioError> {
    let mut response = http_client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| AudioError::StreamError(e.to_string()))?;

    let expected = response.content_length().unwrap_or(0);
    if !progress.set_total_bytes(generation, expected) {
        return Ok(None);
    }

    let mut bytes = Vec::with_capacity(expected as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let read = response
            .read(&mut chunk)
            .map_err(|e| AudioError::StreamError(e.to_string()))?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        if !progress.set_buffered_bytes(generation, bytes.len() as u64) {
            return Ok(None);
        }
    }
    if !progress.set_total_bytes(generation, bytes.len() as u64) {
        return Ok(None);
    }

    Ok(Some(bytes.into()))
}

/// Publishes a duration as early as one can be told. Sources without a
/// length in their headers (most MP3s) first get an estimate from how many
/// bytes [`ESTIMATE_WINDOW`] of audio took, then the exact length once the
/// rest is decoded. `None` means a newer load took over.
fn measure(
    bytes: Arc<[u8]>,
    progress: &LoadProgress,
    generation: u64,
) -> Result<Option<Duration>, AudioError> {
    let total_bytes = bytes.len() as f64;
    let consumed = Arc::new(AtomicU64::new(0));
    let mut decoder = Decoder::new(TrackedCursor::new(bytes, consumed.clone()))
        .map_err(|e| AudioError::DecodingError(e.to_string()))?;

    if let Some(duration) = decoder.total_duration() {
        return Ok(progress
            .set_total_duration(generation, duration)
            .then_some(duration));
    }

    let samples_per_sec = decoder.sample_rate() as f64 * decoder.channels() as f64;
    if samples_per_sec == 0.0 {
        return Ok(progress
            .set_total_duration(generation, Duration::ZERO)
            .then_some(Duration::ZERO));
    }

    let window = ((ESTIMATE_WINDOW.as_secs_f64() * samples_per_sec) as usize).max(1);
    let mut decoded = 0usize;
    let mut estimated = false;
    loop {
        let counted = decoder.by_ref().take(window).count();
        decoded += counted;
        if counted < window {
            break;
        }

        if estimated {
            if !progress.is_current(generation) {
                return Ok(None);
            }
            continue;
        }
        estimated = true;
        let read = consumed.load(Ordering::Relaxed);
        if read > 0 {
            let so_far = decoded as f64 / samples_per_sec;
            let estimate = Duration::from_secs_f64(so_far * total_bytes / read as f64);
            debug!(estimate_ms = estimate.as_millis() as u64, "rodio_duration_estimated");
            if !progress.set_total_duration(generation, estimate) {
                return Ok(None);
            }
        }
    }

    let exact = Duration::from_secs_f64(decoded as f64 / samples_per_sec);
    Ok(progress.set_total_duration(generation, exact).then_some(exact))
}

/// In-memory reader that reports how far the decoder has read.
struct TrackedCursor {
    inner: Cursor<Arc<[u8]>>,
    consumed: Arc<AtomicU64>,
}

impl TrackedCursor {
    fn new(bytes: Arc<[u8]>, consumed: Arc<AtomicU64>) -> Self {
        Self {
            inner: Cursor::new(bytes),
            consumed,
        }
    }

    fn record(&self) {
        self.consumed.store(self.inner.position(), Ordering::Relaxed);
    }
}

impl Read for TrackedCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.record();
        Ok(read)
    }
}

impl Seek for TrackedCursor {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = self.inner.seek(pos)?;
        self.record();
        Ok(position)
    }
}
