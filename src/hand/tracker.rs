use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use flume::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use opencv::{core::Mat, prelude::*};
use serde::Deserialize;

use super::{HandLandmarks, Landmark};
use crate::error::{QuizError, Result};

/// Source of hand landmarks for a camera frame.
pub trait HandTracker {
    /// `Ok(None)` means no usable hand in this frame.
    fn detect(&mut self, frame: &Mat) -> Result<Option<HandLandmarks>>;
}

/// Reports no hand for every frame.
pub struct NoTracker;

impl HandTracker for NoTracker {
    fn detect(&mut self, _frame: &Mat) -> Result<Option<HandLandmarks>> {
        Ok(None)
    }
}

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    frame: Option<u32>,
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// One detector reply: the frame number it answers and the first hand that
/// cleared the confidence threshold.
#[derive(Debug)]
pub struct Detection {
    pub frame: Option<u32>,
    pub hand: Option<HandLandmarks>,
}

pub fn parse_response(line: &str, min_confidence: f32) -> Result<Detection> {
    let result: DetectionResult = serde_json::from_str(line)?;
    let frame = result.frame;

    if let Some(error) = result.error {
        warn!("hand detector reported: {}", error);
        return Ok(Detection { frame, hand: None });
    }

    for hand in result.hands {
        if hand.score < min_confidence {
            debug!("skipping hand with confidence {:.2}", hand.score);
            continue;
        }

        let points: Vec<Landmark> = hand
            .landmarks
            .iter()
            .map(|lm| Landmark {
                x: lm.x,
                y: lm.y,
                z: lm.z,
            })
            .collect();

        match HandLandmarks::new(&points) {
            Ok(landmarks) => {
                return Ok(Detection {
                    frame,
                    hand: Some(landmarks.with_detection(hand.score, hand.handedness)),
                });
            }
            Err(e) => warn!("ignoring hand: {}", e),
        }
    }

    Ok(Detection { frame, hand: None })
}

/// Header sent ahead of the pixel data: frame number, width, height and
/// channel count as little-endian `u32`s.
pub fn frame_header(frame: u32, width: u32, height: u32, channels: u32) -> [u8; 16] {
    let mut header = [0u8; 16];
    for (i, value) in [frame, width, height, channels].iter().enumerate() {
        header[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
    }
    header
}

struct FrameRequest {
    header: [u8; 16],
    data: Vec<u8>,
}

/// External hand detector running as a child process.
///
/// The child prints `READY` once it is loaded. For every frame it receives a
/// [`frame_header`] followed by the raw BGR bytes, and answers with a single
/// JSON line that echoes the frame number as `"frame"`. Writing and reading
/// happen on worker threads so a stalled child never holds up the game loop
/// for longer than the timeout.
pub struct DetectorProcess {
    process: Child,
    requests: Sender<FrameRequest>,
    responses: Receiver<String>,
    next_frame: u32,
    timeout: Duration,
    min_confidence: f32,
}

impl DetectorProcess {
    /// Starts a detector from a whitespace separated command line.
    pub fn spawn(command: &str, timeout: Duration, min_confidence: f32) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| QuizError::DetectorStartup("empty detector command".to_string()))?;

        info!("starting hand detector: {}", command);

        let mut cmd = Command::new(program);
        cmd.args(parts);
        DetectorProcess::start(cmd, timeout, min_confidence)
    }

    pub fn start(mut command: Command, timeout: Duration, min_confidence: f32) -> Result<Self> {
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| QuizError::DetectorStartup("no stdin".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| QuizError::DetectorStartup("no stdout".to_string()))?;
        let mut reader = BufReader::new(stdout);

        let mut ready = String::new();
        reader.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            let _ = process.kill();
            let _ = process.wait();
            return Err(QuizError::DetectorStartup(format!(
                "expected READY, got {:?}",
                ready.trim()
            )));
        }

        // rendezvous: a frame is only handed over once the writer is idle
        let (requests, request_receiver) = bounded::<FrameRequest>(0);
        let (response_sender, responses) = bounded::<String>(4);

        thread::spawn(move || write_frames(stdin, request_receiver));
        thread::spawn(move || read_responses(reader, response_sender));

        info!("hand detector ready");

        Ok(DetectorProcess {
            process,
            requests,
            responses,
            next_frame: 0,
            timeout,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        })
    }
}

fn write_frames(mut stdin: ChildStdin, requests: Receiver<FrameRequest>) {
    for request in requests.iter() {
        let written = stdin
            .write_all(&request.header)
            .and_then(|_| stdin.write_all(&request.data))
            .and_then(|_| stdin.flush());

        if let Err(e) = written {
            error!("writing to hand detector: {}", e);
            break;
        }
    }
    debug!("hand detector input closed");
}

fn read_responses(reader: BufReader<std::process::ChildStdout>, responses: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if responses.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("reading hand detector output: {}", e);
                break;
            }
        }
    }
    debug!("hand detector output closed");
}

impl HandTracker for DetectorProcess {
    fn detect(&mut self, frame: &Mat) -> Result<Option<HandLandmarks>> {
        if frame.rows() == 0 || frame.cols() == 0 {
            return Ok(None);
        }

        let deadline = Instant::now() + self.timeout;
        let number = self.next_frame;
        self.next_frame = self.next_frame.wrapping_add(1);

        let width = frame.cols() as u32;
        let height = frame.rows() as u32;
        let data = frame.data_bytes()?.to_vec();
        let channels = data.len() as u32 / (width * height);

        let request = FrameRequest {
            header: frame_header(number, width, height, channels),
            data,
        };

        match self.requests.send_deadline(request, deadline) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                warn!("hand detector busy, skipping frame {}", number);
                return Ok(None);
            }
            Err(SendTimeoutError::Disconnected(_)) => return Err(QuizError::DetectorExited),
        }

        loop {
            let line = match self.responses.recv_deadline(deadline) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout) => {
                    warn!("hand detector timed out on frame {}", number);
                    return Ok(None);
                }
                Err(RecvTimeoutError::Disconnected) => return Err(QuizError::DetectorExited),
            };

            match parse_response(&line, self.min_confidence) {
                Ok(detection) if detection.frame == Some(number) => return Ok(detection.hand),
                Ok(detection) => {
                    debug!(
                        "dropping detector reply for frame {:?}, waiting for {}",
                        detection.frame, number
                    );
                }
                Err(e) => {
                    warn!("unreadable detector response: {}", e);
                    return Ok(None);
                }
            }
        }
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use opencv::core::{Scalar, CV_8UC3};

    use super::*;

    fn response(frame: u32, score: f32, count: usize) -> String {
        let landmarks: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f32 / 100.0))
            .collect();
        format!(
            r#"{{"frame":{},"hands":[{{"handedness":"Right","score":{},"landmarks":[{}]}}]}}"#,
            frame,
            score,
            landmarks.join(",")
        )
    }

    fn small_frame() -> Mat {
        Mat::new_rows_cols_with_default(2, 2, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    fn detector(script: &str, timeout_ms: u64) -> Result<DetectorProcess> {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        DetectorProcess::start(command, Duration::from_millis(timeout_ms), 0.7)
    }

    #[test]
    fn parses_a_confident_hand() {
        let detection = parse_response(&response(3, 0.9, 21), 0.7).unwrap();
        let hand = detection.hand.unwrap();
        assert_eq!(detection.frame, Some(3));
        assert_eq!(hand.handedness, "Right");
        assert!((hand.confidence - 0.9).abs() < 1e-6);
        assert!((hand.get(20).x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn low_confidence_is_no_observation() {
        assert!(parse_response(&response(0, 0.5, 21), 0.7)
            .unwrap()
            .hand
            .is_none());
    }

    #[test]
    fn wrong_landmark_count_is_no_observation() {
        assert!(parse_response(&response(0, 0.9, 20), 0.7)
            .unwrap()
            .hand
            .is_none());
    }

    #[test]
    fn empty_and_error_responses_are_no_observation() {
        assert!(parse_response(r#"{"frame":0,"hands":[]}"#, 0.7)
            .unwrap()
            .hand
            .is_none());
        let failed =
            parse_response(r#"{"frame":1,"hands":[],"error":"bad frame"}"#, 0.7).unwrap();
        assert_eq!(failed.frame, Some(1));
        assert!(failed.hand.is_none());
    }

    #[test]
    fn malformed_response_is_an_error() {
        assert!(parse_response("not json", 0.7).is_err());
    }

    #[test]
    fn header_is_four_little_endian_words() {
        let header = frame_header(1, 640, 480, 3);
        assert_eq!(&header[0..4], &[1, 0, 0, 0]);
        assert_eq!(&header[4..8], &640u32.to_le_bytes());
        assert_eq!(&header[8..12], &480u32.to_le_bytes());
        assert_eq!(&header[12..16], &[3, 0, 0, 0]);
    }

    #[test]
    fn rejects_a_detector_that_is_not_ready() {
        match detector("echo LOADING", 100) {
            Err(QuizError::DetectorStartup(_)) => {}
            Err(e) => panic!("expected a startup error, got {}", e),
            Ok(_) => panic!("expected a startup error"),
        }
    }

    #[test]
    fn silent_detector_times_out_without_a_hand() {
        let mut tracker = detector("echo READY; cat > /dev/null", 100).unwrap();

        let started = Instant::now();
        let hand = tracker.detect(&small_frame()).unwrap();

        assert!(hand.is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn exited_detector_is_an_error() {
        let mut tracker = detector("echo READY", 2_000).unwrap();

        match tracker.detect(&small_frame()) {
            Err(QuizError::DetectorExited) => {}
            other => panic!("expected the detector to have exited, got {:?}", other),
        }
    }

    #[test]
    fn answers_for_an_earlier_frame_are_dropped() {
        let script = format!(
            "echo READY; sleep 0.3; echo '{}'; echo '{}'; cat > /dev/null",
            response(0, 0.9, 21),
            response(1, 0.9, 21).replace("\"x\":0.2", "\"x\":0.25"),
        );
        let mut tracker = detector(&script, 100).unwrap();

        // frame 0 is answered too late
        assert!(tracker.detect(&small_frame()).unwrap().is_none());
        thread::sleep(Duration::from_millis(500));

        // frame 1 must skip the stale answer and take its own
        tracker.timeout = Duration::from_secs(2);
        let hand = tracker.detect(&small_frame()).unwrap().unwrap();
        assert!((hand.get(20).x - 0.25).abs() < 1e-6);
    }
}
