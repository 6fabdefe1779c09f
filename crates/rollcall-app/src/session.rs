//! The capture/render loop.
//!
//! Per frame: detect faces, then for each box embed, classify, feed the
//! attendance tracker, persist the event and annotate the frame; finally
//! composite onto the background canvas and present. Per-box failures
//! downgrade to Unknown and never stop the loop.

use crate::attendance::{AttendanceEvent, AttendanceTracker, Sighting};
use crate::canvas::{self, Canvas};
use crate::display::Display;
use crate::logbook::Logbook;
use crate::notify::Announcer;
use crate::report::{format_report, Reporter};
use anyhow::Context;
use chrono::Local;
use rollcall_core::classifier::accept;
use rollcall_core::types::Recognition;
use rollcall_core::{imageops, FaceDetector, FaceEmbedder, LinearSvm};
use rollcall_hw::{CameraStream, Frame};

/// Where the annotated frame lands on the composite canvas.
pub struct ViewLayout {
    pub frame_width: u32,
    pub frame_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

/// One attendance session: pipeline, state and collaborators.
pub struct Session {
    pub detector: FaceDetector,
    pub embedder: FaceEmbedder,
    pub classifier: LinearSvm,
    pub tracker: AttendanceTracker,
    pub logbook: Logbook,
    pub announcer: Announcer,
    pub reporter: Box<dyn Reporter>,
    pub display: Box<dyn Display>,
    pub background: Canvas,
    pub layout: ViewLayout,
    pub accept_threshold: f32,
    pub report_destination: String,
    pub records: Vec<String>,
}

impl Session {
    /// Drive the loop until the operator quits or the stream ends, then
    /// deliver the session report.
    pub fn run(mut self, stream: &mut CameraStream<'_>) -> anyhow::Result<()> {
        tracing::info!("starting face recognition");

        loop {
            // Quit takes precedence over any pending work.
            if self.display.should_stop() {
                tracing::info!("quit requested");
                break;
            }

            let frame = match stream.next_frame().context("camera capture")? {
                Some(frame) => frame,
                None => {
                    tracing::info!("video source exhausted");
                    break;
                }
            };

            self.process_frame(frame)
                .context("face detection failed")?;
        }

        let Session {
            announcer,
            reporter,
            records,
            report_destination,
            ..
        } = self;

        announcer.shutdown();
        finish_session(&records, reporter.as_ref(), &report_destination);
        Ok(())
    }

    /// Process one frame end to end and present the composite.
    fn process_frame(&mut self, mut frame: Frame) -> anyhow::Result<()> {
        let boxes = self
            .detector
            .detect(&frame.data, frame.width, frame.height)?;
        let now = Local::now().naive_local();

        for b in &boxes {
            if b.is_degenerate() {
                continue;
            }
            let crop = imageops::crop_rgb(&frame.data, frame.width, b);
            let recognition = self.recognize(&crop, b.width(), b.height());

            if let Recognition::Known { name, confidence } = &recognition {
                tracing::debug!(name = %name, confidence, "recognized face");
                let sighting = self.tracker.observe(name, now);
                apply_sighting(sighting, &self.announcer, &self.logbook, &mut self.records);
            }

            let color = if recognition.is_known() {
                canvas::GREEN
            } else {
                canvas::RED
            };
            canvas::draw_rect(&mut frame.data, frame.width, frame.height, b, color);
            canvas::draw_label(
                &mut frame.data,
                frame.width,
                frame.height,
                b,
                recognition.label(),
                color,
            );
        }

        let scaled = imageops::resize_rgb(
            &frame.data,
            frame.width,
            frame.height,
            self.layout.frame_width,
            self.layout.frame_height,
        );
        self.background.paste(
            &scaled,
            self.layout.frame_width,
            self.layout.frame_height,
            self.layout.offset_x,
            self.layout.offset_y,
        );
        self.display.present(&self.background);
        Ok(())
    }

    /// Embed and classify one crop; any per-box failure yields Unknown.
    fn recognize(&mut self, crop: &[u8], width: u32, height: u32) -> Recognition {
        let embedding = match self.embedder.embed(crop, width, height) {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, treating face as unknown");
                return Recognition::Unknown;
            }
        };

        match self.classifier.predict(&embedding) {
            Ok(prediction) => accept(prediction, self.accept_threshold),
            Err(e) => {
                tracing::warn!(error = %e, "classification failed, treating face as unknown");
                Recognition::Unknown
            }
        }
    }
}

/// Side effects of one tracker outcome: announcement, session record, log row.
fn apply_sighting(
    sighting: Sighting,
    announcer: &Announcer,
    logbook: &Logbook,
    records: &mut Vec<String>,
) {
    match sighting {
        Sighting::Entry(event) => {
            announcer.say(format!("Welcome {}, attendance taken.", event.name));
            record_event(event, logbook, records);
        }
        Sighting::Exit(event) => {
            announcer.say(format!("Goodbye {}, exit recorded.", event.name));
            record_event(event, logbook, records);
        }
        Sighting::AlreadyComplete { name } => {
            announcer.say(format!("Attendance already marked for {name}."));
        }
    }
}

fn record_event(event: AttendanceEvent, logbook: &Logbook, records: &mut Vec<String>) {
    records.push(event.record_line());
    // A write failure loses this row but must not take down the loop.
    if let Err(e) = logbook.append(&event) {
        tracing::error!(
            dir = %logbook.dir().display(),
            name = %event.name,
            error = %e,
            "failed to write attendance row"
        );
    }
}

/// Deliver the report, or note that there is nothing to deliver.
fn finish_session(records: &[String], reporter: &dyn Reporter, destination: &str) {
    if records.is_empty() {
        tracing::info!("no attendance records to report");
        return;
    }
    if let Err(e) = reporter.send(destination, &format_report(records)) {
        tracing::error!(error = %e, "failed to deliver session report");
    }
}
