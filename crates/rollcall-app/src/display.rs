//! Display surfaces.
//!
//! The loop only needs two capabilities from a surface: present the composite
//! canvas and answer whether the operator asked to stop. The terminal
//! implementation renders a luminance ASCII preview and watches stdin for the
//! quit key; the headless one is for captureless environments and tests.

use crate::canvas::Canvas;
use std::io::BufRead;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";
const PREVIEW_COLS: u32 = 96;
/// Terminal cells are roughly twice as tall as wide.
const PREVIEW_ASPECT: u32 = 2;

/// Render surface with a per-frame stop poll.
pub trait Display {
    fn present(&mut self, canvas: &Canvas);
    /// Polled once per frame; true means the operator requested termination.
    fn should_stop(&self) -> bool;
}

/// ASCII preview in the terminal; `q` + Enter on stdin requests stop.
pub struct TerminalDisplay {
    stop: Arc<AtomicBool>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        let stop = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stop);
        std::thread::Builder::new()
            .name("rollcall-stdin".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else { break };
                    if line.trim() == "q" {
                        flag.store(true, Ordering::Relaxed);
                        break;
                    }
                }
            })
            .expect("failed to spawn stdin watcher");

        Self { stop }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TerminalDisplay {
    fn present(&mut self, canvas: &Canvas) {
        let cols = PREVIEW_COLS.min(canvas.width.max(1));
        let rows = (cols * canvas.height / canvas.width.max(1) / PREVIEW_ASPECT).max(1);

        let mut out = String::with_capacity((cols as usize + 1) * rows as usize + 8);
        out.push_str("\x1b[H");
        for row in 0..rows {
            for col in 0..cols {
                let x = col * canvas.width / cols;
                let y = row * canvas.height / rows;
                let base = ((y * canvas.width + x) * 3) as usize;
                let r = canvas.data[base] as u32;
                let g = canvas.data[base + 1] as u32;
                let b = canvas.data[base + 2] as u32;
                // BT.601 luma weights.
                let luma = (299 * r + 587 * g + 114 * b) / 1000;
                let idx = (luma as usize * (ASCII_RAMP.len() - 1)) / 255;
                out.push(ASCII_RAMP[idx] as char);
            }
            out.push('\n');
        }

        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(out.as_bytes());
        let _ = stdout.flush();
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// No-op surface for headless runs and tests.
#[derive(Default)]
pub struct HeadlessDisplay {
    stop: AtomicBool,
    pub frames_presented: usize,
}

impl HeadlessDisplay {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Display for HeadlessDisplay {
    fn present(&mut self, _canvas: &Canvas) {
        self.frames_presented += 1;
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}
