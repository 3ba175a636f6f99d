use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio,
};
use tracing::{info, warn};

use crate::annotation::{Annotation, Color};
use crate::classifier::FrameSummary;
use crate::error::Error;
use crate::frame::Frame;
use crate::sink::FrameSink;

const COUNTER_COLOR: (f64, f64, f64) = (255.0, 255.0, 0.0);

#[inline]
fn scalar((b, g, r): (f64, f64, f64)) -> core::Scalar {
    core::Scalar::new(b, g, r, 0.0)
}

pub fn draw_annotation(frame: &mut Mat, ann: &Annotation) -> opencv::Result<()> {
    let [l, t, r, b] = ann.bbox.pixels();
    let color = scalar(ann.color.bgr());

    imgproc::rectangle(
        frame,
        core::Rect::new(l, t, r - l, b - t),
        color,
        2,
        imgproc::LINE_8,
        0,
    )?;

    imgproc::put_text(
        frame,
        &ann.label(),
        core::Point::new(l, t - 5),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        color,
        2,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}

pub fn draw_counters(frame: &mut Mat, total: usize, towards: usize) -> opencv::Result<()> {
    imgproc::put_text(
        frame,
        &format!("Total People: {}", total),
        core::Point::new(20, 40),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        scalar(COUNTER_COLOR),
        2,
        imgproc::LINE_8,
        false,
    )?;

    imgproc::put_text(
        frame,
        &format!("Towards Camera: {}", towards),
        core::Point::new(20, 80),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        scalar(Color::Green.bgr()),
        2,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}

/// Re-encodes `input` to H.264/yuv420p so the result plays everywhere.
pub fn reencode(input: &Path, output: &Path) -> Result<(), Error> {
    let status = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-vcodec", "libx264", "-preset", "fast", "-pix_fmt", "yuv420p"])
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|err| Error::EncoderError(format!("failed to run ffmpeg: {}", err)))?;

    if !status.success() {
        return Err(Error::EncoderError(format!("ffmpeg exited with {}", status)));
    }

    Ok(())
}

/// Decodes the source video in lockstep with the tracker output, draws the
/// classification onto every frame and writes the annotated video.
pub struct VideoSink {
    cam: videoio::VideoCapture,
    writer: Option<videoio::VideoWriter>,
    fps: f64,
    size: core::Size,
    temp_file: PathBuf,
    out_file: PathBuf,
    mat: Mat,
}

impl VideoSink {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, output: Q) -> Result<Self, Error> {
        let source = source.as_ref();
        let out_file = output.as_ref().to_path_buf();

        let cam = videoio::VideoCapture::from_file(&source.to_string_lossy(), videoio::CAP_ANY)?;
        if !videoio::VideoCapture::is_opened(&cam)? {
            return Err(Error::ConfigError(format!(
                "unable to open video {}",
                source.display()
            )));
        }

        let fps = match cam.get(videoio::CAP_PROP_FPS)? {
            fps if fps > 0.0 => fps,
            _ => 25.0,
        };
        let width = cam.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = cam.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;

        info!(
            "video {}x{} @ {:.2} fps, {} frames",
            width,
            height,
            fps,
            cam.get(videoio::CAP_PROP_FRAME_COUNT)? as i64
        );

        let dir = match out_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let stem = out_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let temp_file = dir.join(format!(".{}.tmp.mp4", stem));

        Ok(Self {
            cam,
            writer: None,
            fps,
            size: core::Size::new(width, height),
            temp_file,
            out_file,
            mat: Mat::default(),
        })
    }

    fn writer(&mut self) -> Result<&mut videoio::VideoWriter, Error> {
        if self.writer.is_none() {
            let writer = videoio::VideoWriter::new(
                &self.temp_file.to_string_lossy(),
                videoio::VideoWriter::fourcc(b'm' as _, b'p' as _, b'4' as _, b'v' as _)?,
                self.fps,
                self.size,
                true,
            )?;

            self.writer = Some(writer);
        }

        match self.writer.as_mut() {
            Some(writer) => Ok(writer),
            None => Err(Error::EncoderError("video writer unavailable".to_string())),
        }
    }
}

impl FrameSink for VideoSink {
    fn write(&mut self, frame: &Frame, summary: &FrameSummary) -> Result<(), Error> {
        let mut mat = std::mem::take(&mut self.mat);

        if !self.cam.read(&mut mat)? || mat.rows() == 0 || mat.cols() == 0 {
            warn!(frame = frame.index, "source video ended before tracker output");
            self.mat = mat;
            return Ok(());
        }

        for ann in &summary.annotations {
            draw_annotation(&mut mat, ann)?;
        }

        draw_counters(&mut mat, summary.total_tracked, summary.towards_count)?;

        self.writer()?.write(&mat)?;
        self.mat = mat;

        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        let mut writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                warn!("no frames were written, skipping encode");
                return Ok(());
            }
        };
        writer.release()?;

        let encoded = reencode(&self.temp_file, &self.out_file);
        if let Err(err) = std::fs::remove_file(&self.temp_file) {
            if encoded.is_ok() {
                return Err(err.into());
            }
            warn!("unable to remove {}: {}", self.temp_file.display(), err);
        }
        encoded?;

        info!("output saved at {}", self.out_file.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::track::Direction;

    fn blank() -> Mat {
        Mat::new_rows_cols_with_default(120, 160, core::CV_8UC3, core::Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn draws_box_in_direction_color() {
        let mut mat = blank();
        let ann = Annotation::new(3, BBox::ltrb(10.0, 20.0, 60.0, 80.0), Direction::Towards);

        draw_annotation(&mut mat, &ann).unwrap();

        let sum = core::sum_elems(&mat).unwrap().0;
        assert_eq!(sum[0], 0.0);
        assert!(sum[1] > 0.0);
        assert_eq!(sum[2], 0.0);
    }

    #[test]
    fn draws_counters() {
        let mut mat = blank();
        draw_counters(&mut mat, 12, 7).unwrap();

        let sum = core::sum_elems(&mat).unwrap().0;
        assert!(sum[0] > 0.0);
        assert!(sum[1] > 0.0);
        assert_eq!(sum[2], 0.0);
    }

    #[test]
    fn reencode_of_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.mp4");
        let output = dir.path().join("out.mp4");

        match reencode(&input, &output) {
            Err(Error::EncoderError(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn rejects_unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        let sink = VideoSink::new(dir.path().join("missing.mp4"), dir.path().join("out.mp4"));

        assert!(sink.is_err());
    }
}
