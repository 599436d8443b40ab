use chrono::{DateTime, Local};

use crate::error::{TrajResult, TrajectoryError};
use crate::types::{Sample, Series};

/// Control message that opens a recording on the device link
pub const START_COMMAND: &str = "Start recording";
/// Control message that closes a recording on the device link
pub const STOP_COMMAND: &str = "Stop recording";

/// Values per data packet: `w,x,y,z,ax,ay,az`
const PACKET_FIELDS: usize = 7;

/// An open recording: its id plus everything captured so far
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    pub recording_id: String,
    samples: Vec<Sample>,
}

impl RecordingHandle {
    fn new(started_at: DateTime<Local>) -> Self {
        RecordingHandle {
            recording_id: recording_id_for(&started_at),
            samples: Vec::with_capacity(1024),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// A sample extends the recording only if its time is finite and not
    /// earlier than the last one kept.
    fn accepts(&self, timestamp: f64) -> bool {
        timestamp.is_finite()
            && self
                .samples
                .last()
                .map_or(true, |last| timestamp >= last.timestamp)
    }
}

/// Recorder state machine
#[derive(Debug, Clone, Default)]
pub enum RecorderState {
    /// Not recording; incoming packets are dropped
    #[default]
    Idle,
    /// Capturing packets into the handle
    Recording(RecordingHandle),
}

/// Coarse state name, for logs and status output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderStatus {
    Idle,
    Recording,
}

/// Outcome of feeding one line from the device link
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    Started { recording_id: String },
    Stopped(Series),
    Sample,
    Ignored,
}

/// Turns a stream of device lines into closed `Series` values.
///
/// The pipeline never sees a recording in progress: samples only leave the
/// recorder through `stop`, as a validated `Series`.
#[derive(Debug, Default)]
pub struct Recorder {
    state: RecorderState,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn status(&self) -> RecorderStatus {
        match self.state {
            RecorderState::Idle => RecorderStatus::Idle,
            RecorderState::Recording(_) => RecorderStatus::Recording,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording(_))
    }

    /// Idle → Recording. Returns the new recording id.
    pub fn start(&mut self, now: DateTime<Local>) -> TrajResult<String> {
        match self.state {
            RecorderState::Recording(_) => Err(TrajectoryError::AlreadyRecording),
            RecorderState::Idle => {
                let handle = RecordingHandle::new(now);
                let id = handle.recording_id.clone();
                log::info!("Recording {} started", id);
                self.state = RecorderState::Recording(handle);
                Ok(id)
            }
        }
    }

    /// Recording → Idle, handing back the closed series
    pub fn stop(&mut self) -> TrajResult<Series> {
        match std::mem::take(&mut self.state) {
            RecorderState::Idle => Err(TrajectoryError::NotRecording),
            RecorderState::Recording(handle) => {
                log::info!(
                    "Recording {} stopped with {} samples",
                    handle.recording_id,
                    handle.samples.len()
                );
                Series::new(handle.samples)
            }
        }
    }

    /// Append a sample to the open recording. Returns false if it was dropped:
    /// recorder idle, or timestamp non-finite or behind the previous sample.
    pub fn push(&mut self, sample: Sample) -> bool {
        match &mut self.state {
            RecorderState::Recording(handle) => {
                if !handle.accepts(sample.timestamp) {
                    log::debug!(
                        "Dropping sample at t={} from {}: non-finite or out of order",
                        sample.timestamp,
                        handle.recording_id
                    );
                    return false;
                }
                handle.samples.push(sample);
                true
            }
            RecorderState::Idle => false,
        }
    }

    /// Feed one line read from the device link, stamped with `timestamp` seconds.
    ///
    /// Control lines drive the state machine; data packets are recorded while
    /// a recording is open. Packets that do not parse are skipped.
    pub fn handle_line(
        &mut self,
        line: &str,
        timestamp: f64,
        now: DateTime<Local>,
    ) -> TrajResult<RecorderEvent> {
        let line = line.trim();
        if line.contains(START_COMMAND) {
            if self.is_recording() {
                log::debug!("Start command while already recording, ignored");
                return Ok(RecorderEvent::Ignored);
            }
            let recording_id = self.start(now)?;
            return Ok(RecorderEvent::Started { recording_id });
        }
        if line.contains(STOP_COMMAND) {
            if !self.is_recording() {
                log::debug!("Stop command while idle, ignored");
                return Ok(RecorderEvent::Ignored);
            }
            return Ok(RecorderEvent::Stopped(self.stop()?));
        }

        if !self.is_recording() {
            return Ok(RecorderEvent::Ignored);
        }

        match parse_packet(line) {
            Some((q, a)) => {
                if self.push(Sample::from_components(timestamp, q, a)) {
                    Ok(RecorderEvent::Sample)
                } else {
                    Ok(RecorderEvent::Ignored)
                }
            }
            None => {
                log::debug!("Skipping malformed packet: {:?}", line);
                Ok(RecorderEvent::Ignored)
            }
        }
    }
}

/// `recording_YYYYmmdd_HHMMSS`
pub fn recording_id_for(time: &DateTime<Local>) -> String {
    format!("recording_{}", time.format("%Y%m%d_%H%M%S"))
}

/// Parse `w,x,y,z,ax,ay,az`. The first seven values must be present and
/// numeric; anything after them is ignored.
fn parse_packet(line: &str) -> Option<([f64; 4], [f64; 3])> {
    let mut values = [0.0; PACKET_FIELDS];
    let mut count = 0;
    for part in line.split(',').take(PACKET_FIELDS) {
        values[count] = part.trim().parse().ok()?;
        count += 1;
    }
    if count != PACKET_FIELDS {
        return None;
    }
    Some((
        [values[0], values[1], values[2], values[3]],
        [values[4], values[5], values[6]],
    ))
}
