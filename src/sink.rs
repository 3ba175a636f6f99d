use std::io::Write;
use std::path::Path;

use crate::classifier::FrameSummary;
use crate::error::Error;
use crate::frame::Frame;

/// Consumer of classified frames.
pub trait FrameSink {
    fn write(&mut self, frame: &Frame, summary: &FrameSummary) -> Result<(), Error>;

    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    #[inline]
    fn write(&mut self, frame: &Frame, summary: &FrameSummary) -> Result<(), Error> {
        (**self).write(frame, summary)
    }

    #[inline]
    fn finish(&mut self) -> Result<(), Error> {
        (**self).finish()
    }
}

fn create_file<P: AsRef<Path>>(path: P) -> Result<std::io::BufWriter<std::fs::File>, Error> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(std::io::BufWriter::new(std::fs::File::create(path)?))
}

/// Writes every [`FrameSummary`] as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLinesSink<std::io::BufWriter<std::fs::File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::new(create_file(path)?))
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn write(&mut self, _frame: &Frame, summary: &FrameSummary) -> Result<(), Error> {
        serde_json::to_writer(&mut self.out, summary)?;
        writeln!(self.out)?;

        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.out.flush()?;

        Ok(())
    }
}

/// Writes accepted tracks in the MOT16 results layout
/// `frame,id,left,top,width,height,conf,-1,-1,-1` with 1-based frame numbers.
pub struct MotSink<W: Write> {
    out: W,
}

impl<W: Write> MotSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl MotSink<std::io::BufWriter<std::fs::File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::new(create_file(path)?))
    }
}

impl<W: Write> FrameSink for MotSink<W> {
    fn write(&mut self, frame: &Frame, summary: &FrameSummary) -> Result<(), Error> {
        for ann in &summary.annotations {
            let confidence = frame
                .iter()
                .find(|obs| obs.track_id == Some(ann.track_id) && obs.bbox == ann.bbox)
                .map(|obs| obs.confidence)
                .unwrap_or(1.0);

            let bbox = ann.bbox.as_ltwh();

            writeln!(
                self.out,
                "{},{},{:.2},{:.2},{:.2},{:.2},{:.4},-1,-1,-1",
                summary.frame + 1,
                ann.track_id,
                bbox.left(),
                bbox.top(),
                bbox.width(),
                bbox.height(),
                confidence,
            )?;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.out.flush()?;

        Ok(())
    }
}
