use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

use crate::error::Error;
use crate::frame::Frame;
use crate::observation::TrackObservation;

/// Anything able to hand out tracked observations frame by frame, in stream order.
pub trait Tracker {
    /// Returns `Ok(None)` once the stream is exhausted.
    fn next_frame_tracks(&mut self) -> Result<Option<Frame>, Error>;
}

impl<T: Tracker + ?Sized> Tracker for Box<T> {
    #[inline]
    fn next_frame_tracks(&mut self) -> Result<Option<Frame>, Error> {
        (**self).next_frame_tracks()
    }
}

/// In-memory source replaying prepared frames.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    frames: VecDeque<Frame>,
}

impl Replay {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Builds frames from bare observation batches, numbering them from zero.
    pub fn from_batches<I>(batches: I, fps: f32) -> Self
    where
        I: IntoIterator<Item = Vec<TrackObservation>>,
    {
        let frames = batches
            .into_iter()
            .enumerate()
            .map(|(idx, obs)| Frame::new(idx as u64, idx as f32 / fps, obs))
            .collect();

        Self { frames }
    }
}

impl Tracker for Replay {
    #[inline]
    fn next_frame_tracks(&mut self) -> Result<Option<Frame>, Error> {
        Ok(self.frames.pop_front())
    }
}

/// Reads tracker output dumped as one line per frame: `<timestamp_ms>: <json array>`.
pub struct DetsReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    next_index: u64,
}

impl DetsReader<std::io::BufReader<std::fs::File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;

        Ok(Self::new(std::io::BufReader::new(file)))
    }
}

impl<R: BufRead> DetsReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            next_index: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<(f32, Vec<TrackObservation>), Error> {
        let idx = line.find(':').ok_or_else(|| Error::ParseError {
            line: self.line_no,
            reason: "expected `:`".to_string(),
        })?;

        let (ts, vector) = line.split_at(idx);

        let ts: u64 = ts.trim().parse().map_err(|_| Error::ParseError {
            line: self.line_no,
            reason: format!("parse timestamp failed: `{}`", ts.trim()),
        })?;

        let observations = serde_json::from_str(&vector[1..]).map_err(|err| Error::ParseError {
            line: self.line_no,
            reason: format!("parse json failed: {}", err),
        })?;

        Ok((ts as f32 / 1000.0, observations))
    }
}

impl<R: BufRead> Tracker for DetsReader<R> {
    fn next_frame_tracks(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            let line = match self.lines.next() {
                Some(line) => line?,
                None => return Ok(None),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let (timestamp, observations) = self.parse_line(&line)?;
            let frame = Frame::new(self.next_index, timestamp, observations);
            self.next_index += 1;

            return Ok(Some(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;

    #[test]
    fn reads_frames_in_order() {
        let data = "0: [{\"id\": 5, \"c\": 0, \"p\": 0.9, \"bbox\": [10, 10, 30, 30]}]\n\
                    \n\
                    40: []\n\
                    80: [{\"id\": null, \"c\": 0, \"bbox\": [0, 0, 1, 1]}, {\"id\": 7, \"c\": 2, \"bbox\": [0, 0, 1, 1]}]\n";

        let mut reader = DetsReader::new(data.as_bytes());

        let f0 = reader.next_frame_tracks().unwrap().unwrap();
        assert_eq!(f0.index, 0);
        assert_eq!(f0.timestamp, 0.0);
        assert_eq!(f0.observations[0].bbox, BBox::ltrb(10., 10., 30., 30.));

        let f1 = reader.next_frame_tracks().unwrap().unwrap();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.timestamp, 0.04);
        assert!(f1.is_empty());

        let f2 = reader.next_frame_tracks().unwrap().unwrap();
        assert_eq!(f2.index, 2);
        assert_eq!(f2.len(), 2);

        assert!(reader.next_frame_tracks().unwrap().is_none());
    }

    #[test]
    fn reports_line_of_malformed_input() {
        let data = "0: []\n40 []\n";
        let mut reader = DetsReader::new(data.as_bytes());

        assert!(reader.next_frame_tracks().unwrap().is_some());
        match reader.next_frame_tracks() {
            Err(Error::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_timestamp_and_json() {
        let mut reader = DetsReader::new("abc: []\n".as_bytes());
        assert!(matches!(
            reader.next_frame_tracks(),
            Err(Error::ParseError { line: 1, .. })
        ));

        let mut reader = DetsReader::new("10: [{\"c\": 0}]\n".as_bytes());
        assert!(matches!(
            reader.next_frame_tracks(),
            Err(Error::ParseError { line: 1, .. })
        ));
    }

    #[test]
    fn replay_numbers_batches() {
        let mut replay = Replay::from_batches(vec![vec![], vec![]], 25.0);

        assert_eq!(replay.next_frame_tracks().unwrap().unwrap().index, 0);
        let second = replay.next_frame_tracks().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.timestamp, 0.04);
        assert!(replay.next_frame_tracks().unwrap().is_none());
    }
}
