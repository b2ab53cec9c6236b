mod schedule;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use product_inspect_application::{
    ApplicationError, CaptureDevice, Clock, Detector, InspectionRunner, OverlaySurface,
};
use product_inspect_domain::{
    CaptureRequest, Detection, DetectionBatch, InspectionStatus, TickMetrics,
};
use tracing::{debug, info, warn};

pub use schedule::TickSchedule;

const METRIC_WINDOW_SIZE: usize = 64;

#[derive(Default)]
struct MetricsState {
    ticks_run: u64,
    ticks_idle: u64,
    ticks_skipped: u64,
    batches_emitted: u64,
    detections_emitted: u64,
    last_tick_ms: Option<u64>,
    tick_samples_ms: Vec<u64>,
}

impl MetricsState {
    fn snapshot(&self) -> TickMetrics {
        TickMetrics {
            ticks_run: self.ticks_run,
            ticks_idle: self.ticks_idle,
            ticks_skipped: self.ticks_skipped,
            batches_emitted: self.batches_emitted,
            detections_emitted: self.detections_emitted,
            last_tick_ms: self.last_tick_ms,
            p95_tick_ms: percentile_95(&self.tick_samples_ms),
        }
    }

    fn push_tick_sample(&mut self, sample_ms: u64) {
        self.ticks_run += 1;
        self.last_tick_ms = Some(sample_ms);
        self.tick_samples_ms.push(sample_ms);
        if self.tick_samples_ms.len() > METRIC_WINDOW_SIZE {
            let drain_count = self.tick_samples_ms.len() - METRIC_WINDOW_SIZE;
            self.tick_samples_ms.drain(0..drain_count);
        }
    }
}

fn percentile_95(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let index = (((sorted.len() - 1) as f64) * 0.95).round() as usize;
    sorted.get(index).copied()
}

/// Capture device and detector. Owned by the worker while a session runs.
struct Equipment {
    device: Box<dyn CaptureDevice>,
    detector: Box<dyn Detector>,
}

struct Session {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<Equipment>,
}

#[derive(Clone)]
struct WorkerContext {
    interval: Duration,
    overlay: Arc<dyn OverlaySurface>,
    clock: Arc<dyn Clock>,
    batch_tx: mpsc::Sender<DetectionBatch>,
    active: Arc<AtomicBool>,
    camera_ready: Arc<AtomicBool>,
    metrics: Arc<Mutex<MetricsState>>,
}

enum TickOutcome {
    Idle,
    CaptureLost,
    Ran {
        detections: Vec<Detection>,
        elapsed_ms: u64,
    },
}

/// Runs the classifier on its own thread at a fixed interval and hands
/// non-empty batches back over a channel.
pub struct BackgroundInspectionRunner {
    context: WorkerContext,
    idle: Mutex<Option<Equipment>>,
    session: Mutex<Option<Session>>,
    batch_rx: Mutex<mpsc::Receiver<DetectionBatch>>,
}

impl BackgroundInspectionRunner {
    pub fn new(
        device: Box<dyn CaptureDevice>,
        detector: Box<dyn Detector>,
        overlay: Arc<dyn OverlaySurface>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        let (batch_tx, batch_rx) = mpsc::channel::<DetectionBatch>();
        Self {
            context: WorkerContext {
                interval,
                overlay,
                clock,
                batch_tx,
                active: Arc::new(AtomicBool::new(false)),
                camera_ready: Arc::new(AtomicBool::new(false)),
                metrics: Arc::new(Mutex::new(MetricsState::default())),
            },
            idle: Mutex::new(Some(Equipment { device, detector })),
            session: Mutex::new(None),
            batch_rx: Mutex::new(batch_rx),
        }
    }

    fn set_flags(&self, active: bool) {
        self.context.active.store(active, Ordering::SeqCst);
        self.context.camera_ready.store(active, Ordering::SeqCst);
    }

    // Joins the worker and parks the released equipment for the next session.
    fn finish_session(&self, session: Session) -> Result<(), ApplicationError> {
        let _ = session.stop_tx.send(());
        let mut equipment = session
            .handle
            .join()
            .map_err(|_| ApplicationError::Io("inspection worker panicked".to_string()))?;
        equipment.device.stop();
        let mut idle = self
            .idle
            .lock()
            .map_err(|_| ApplicationError::Io("inspection equipment lock poisoned".to_string()))?;
        *idle = Some(equipment);
        Ok(())
    }
}

impl InspectionRunner for BackgroundInspectionRunner {
    fn start(&self, request: CaptureRequest) -> Result<(), ApplicationError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ApplicationError::Io("inspection session lock poisoned".to_string()))?;

        if session.is_some() && self.context.active.load(Ordering::SeqCst) {
            debug!("inspection already running");
            return Ok(());
        }
        if let Some(finished) = session.take() {
            self.finish_session(finished)?;
        }

        let mut equipment = self
            .idle
            .lock()
            .map_err(|_| ApplicationError::Io("inspection equipment lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| ApplicationError::Io("capture device is not available".to_string()))?;

        if let Err(error) = equipment.device.start(&request) {
            self.set_flags(false);
            if let Ok(mut idle) = self.idle.lock() {
                *idle = Some(equipment);
            }
            return Err(error);
        }

        self.set_flags(true);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let context = self.context.clone();
        let handle = thread::spawn(move || run_worker(equipment, context, stop_rx));
        *session = Some(Session { stop_tx, handle });
        info!(
            interval_ms = self.context.interval.as_millis() as u64,
            "inspection worker started"
        );
        Ok(())
    }

    fn stop(&self) -> Result<(), ApplicationError> {
        let finished = self
            .session
            .lock()
            .map_err(|_| ApplicationError::Io("inspection session lock poisoned".to_string()))?
            .take();
        self.set_flags(false);
        if let Some(finished) = finished {
            self.finish_session(finished)?;
            info!("inspection worker stopped");
        }
        Ok(())
    }

    fn try_receive_batch(&self) -> Result<Option<DetectionBatch>, ApplicationError> {
        let receiver = self
            .batch_rx
            .lock()
            .map_err(|_| ApplicationError::Io("inspection batch lock poisoned".to_string()))?;
        match receiver.try_recv() {
            Ok(batch) => Ok(Some(batch)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ApplicationError::Io(
                "inspection batch channel disconnected".to_string(),
            )),
        }
    }

    fn status(&self) -> InspectionStatus {
        InspectionStatus {
            active: self.context.active.load(Ordering::SeqCst),
            camera_ready: self.context.camera_ready.load(Ordering::SeqCst),
        }
    }

    fn metrics(&self) -> Result<TickMetrics, ApplicationError> {
        let metrics = self
            .context
            .metrics
            .lock()
            .map_err(|_| ApplicationError::Io("inspection metrics lock poisoned".to_string()))?;
        Ok(metrics.snapshot())
    }
}

impl Drop for BackgroundInspectionRunner {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(%error, "inspection worker did not shut down cleanly");
        }
    }
}

fn run_worker(
    mut equipment: Equipment,
    context: WorkerContext,
    stop_rx: mpsc::Receiver<()>,
) -> Equipment {
    let mut schedule = TickSchedule::new(Instant::now(), context.interval);
    loop {
        match stop_rx.recv_timeout(schedule.time_until_next(Instant::now())) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        match run_tick(&mut equipment, &context) {
            TickOutcome::Idle => with_metrics(&context, |m| m.ticks_idle += 1),
            TickOutcome::CaptureLost => {
                warn!("capture lost, inspection stopped");
                equipment.device.stop();
                with_metrics(&context, |m| m.ticks_idle += 1);
                break;
            }
            TickOutcome::Ran {
                detections,
                elapsed_ms,
            } => {
                debug!(detections = detections.len(), elapsed_ms, "inspection tick");
                with_metrics(&context, |m| m.push_tick_sample(elapsed_ms));
                if !detections.is_empty() {
                    let count = detections.len() as u64;
                    let batch = DetectionBatch {
                        detections,
                        processing_time_ms: elapsed_ms,
                    };
                    if context.batch_tx.send(batch).is_err() {
                        break;
                    }
                    with_metrics(&context, |m| {
                        m.batches_emitted += 1;
                        m.detections_emitted += count;
                    });
                }
            }
        }

        let skipped = schedule.complete_tick(Instant::now());
        if skipped > 0 {
            debug!(skipped, "inspection tick overran its interval");
            with_metrics(&context, |m| m.ticks_skipped += skipped);
        }
    }

    context.active.store(false, Ordering::SeqCst);
    context.camera_ready.store(false, Ordering::SeqCst);
    equipment
}

fn run_tick(equipment: &mut Equipment, context: &WorkerContext) -> TickOutcome {
    if !equipment.device.is_ready() {
        return TickOutcome::CaptureLost;
    }
    if !context.overlay.is_attached() {
        return TickOutcome::Idle;
    }
    let Some(frame) = equipment.device.grab_frame() else {
        if equipment.device.is_ready() {
            return TickOutcome::Idle;
        }
        return TickOutcome::CaptureLost;
    };

    let started = Instant::now();
    let captured_at = context.clock.now_timestamp_string();
    let detections = equipment.detector.classify(&frame, &captured_at);
    context.overlay.present(&frame, &detections);
    let elapsed_ms = started.elapsed().as_micros().div_ceil(1000) as u64;
    TickOutcome::Ran {
        detections,
        elapsed_ms,
    }
}

fn with_metrics(context: &WorkerContext, update: impl FnOnce(&mut MetricsState)) {
    if let Ok(mut metrics) = context.metrics.lock() {
        update(&mut metrics);
    }
}
