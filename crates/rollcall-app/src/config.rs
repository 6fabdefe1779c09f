use std::path::PathBuf;

/// Session configuration, loaded from environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Requested capture resolution; the driver may adjust it.
    pub capture_width: u32,
    pub capture_height: u32,
    /// Path to the SSD face detection ONNX model.
    pub detector_model: PathBuf,
    /// Path to the FaceNet-style embedding ONNX model.
    pub embedder_model: PathBuf,
    /// Path to the reference embedding database (JSON).
    pub reference_path: PathBuf,
    /// Directory holding the per-day attendance CSVs.
    pub attendance_dir: PathBuf,
    /// Detector confidence cutoff for candidate boxes.
    pub detect_threshold: f32,
    /// Classifier probability above which a label is accepted.
    pub accept_threshold: f32,
    /// Background image for the composite view.
    pub background_path: PathBuf,
    /// Composite canvas size.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Size the annotated frame is scaled to before pasting.
    pub frame_width: u32,
    pub frame_height: u32,
    /// Paste offset of the frame on the canvas.
    pub frame_offset_x: u32,
    pub frame_offset_y: u32,
    /// Command spawned per spoken announcement.
    pub speech_command: String,
    /// Bounded announcement queue depth; full queue drops the announcement.
    pub announce_queue: usize,
    /// Webhook URL for the end-of-session report; unset logs the report.
    pub report_url: Option<String>,
    /// Destination identifier passed to the reporter.
    pub report_destination: String,
    /// Skip the display surface entirely.
    pub headless: bool,
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            camera_device: env_string("ROLLCALL_CAMERA_DEVICE", "/dev/video0"),
            capture_width: env_u32("ROLLCALL_CAPTURE_WIDTH", 640),
            capture_height: env_u32("ROLLCALL_CAPTURE_HEIGHT", 480),
            detector_model: env_path("ROLLCALL_DETECTOR_MODEL", "models/res10_300x300_ssd.onnx"),
            embedder_model: env_path("ROLLCALL_EMBEDDER_MODEL", "models/facenet_512.onnx"),
            reference_path: env_path("ROLLCALL_REFERENCE_PATH", "data/faces.json"),
            attendance_dir: env_path("ROLLCALL_ATTENDANCE_DIR", "Attendance"),
            detect_threshold: env_f32("ROLLCALL_DETECT_THRESHOLD", 0.5),
            accept_threshold: env_f32("ROLLCALL_ACCEPT_THRESHOLD", 0.8),
            background_path: env_path("ROLLCALL_BACKGROUND", "background_img.png"),
            canvas_width: env_u32("ROLLCALL_CANVAS_WIDTH", 1366),
            canvas_height: env_u32("ROLLCALL_CANVAS_HEIGHT", 768),
            frame_width: env_u32("ROLLCALL_FRAME_WIDTH", 1366),
            frame_height: env_u32("ROLLCALL_FRAME_HEIGHT", 636),
            frame_offset_x: env_u32("ROLLCALL_FRAME_OFFSET_X", 0),
            frame_offset_y: env_u32("ROLLCALL_FRAME_OFFSET_Y", 131),
            speech_command: env_string("ROLLCALL_SPEECH_COMMAND", "espeak-ng"),
            announce_queue: env_usize("ROLLCALL_ANNOUNCE_QUEUE", 8),
            report_url: std::env::var("ROLLCALL_REPORT_URL").ok(),
            report_destination: env_string("ROLLCALL_REPORT_TO", "operator"),
            headless: std::env::var("ROLLCALL_HEADLESS")
                .map(|v| v != "0")
                .unwrap_or(false),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
