use crate::track::TrackStatus;
use crate::utils::bbox::BoundingBox;
use crate::{CameraId, Errors, FrameId, TrackId};
use anyhow::Result;
use crossbeam::channel::Sender;
use nalgebra::Point2;
use std::io::Write;

/// Per-frame output of one active track
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalRecord {
    pub camera_id: CameraId,
    /// Global frame number
    pub frame_id: FrameId,
    pub track_id: TrackId,
    pub position: Point2<f32>,
    /// Last observed box size centered on `position`
    pub bbox: BoundingBox,
    pub status: TrackStatus,
}

/// Receiver of the per-frame track records
///
pub trait EvaluationSink {
    fn accept(&mut self, record: &EvalRecord) -> Result<()>;

    /// Called once after the last frame of a run
    ///
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: EvaluationSink + ?Sized> EvaluationSink for &mut S {
    fn accept(&mut self, record: &EvalRecord) -> Result<()> {
        (**self).accept(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Collects every record in memory
///
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub records: Vec<EvalRecord>,
}

impl EvaluationSink for VecSink {
    fn accept(&mut self, record: &EvalRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }
}

/// Forwards records to a consumer thread
///
pub struct ChannelSink {
    sender: Sender<EvalRecord>,
}

impl ChannelSink {
    pub fn new(sender: Sender<EvalRecord>) -> Self {
        Self { sender }
    }
}

impl EvaluationSink for ChannelSink {
    fn accept(&mut self, record: &EvalRecord) -> Result<()> {
        self.sender
            .send(*record)
            .map_err(|_| Errors::SinkClosed.into())
    }
}

/// Writes one space separated line per record:
/// `camera track frame left top width height x y`
///
pub struct MotTextSink<W: Write> {
    writer: W,
}

impl<W: Write> MotTextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EvaluationSink for MotTextSink<W> {
    fn accept(&mut self, r: &EvalRecord) -> Result<()> {
        writeln!(
            self.writer,
            "{} {} {} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
            r.camera_id,
            r.track_id,
            r.frame_id,
            r.bbox.left,
            r.bbox.top,
            r.bbox.width(),
            r.bbox.height(),
            r.position.x,
            r.position.y
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::track::TrackStatus;
    use crate::trackers::sink::{ChannelSink, EvalRecord, EvaluationSink, MotTextSink, VecSink};
    use crate::utils::bbox::BoundingBox;
    use crate::Errors;
    use nalgebra::Point2;

    fn record() -> EvalRecord {
        EvalRecord {
            camera_id: 2,
            frame_id: 17,
            track_id: 5,
            position: Point2::new(20.0, 40.0),
            bbox: BoundingBox::new(10.0, 20.0, 30.0, 60.0),
            status: TrackStatus::Matched,
        }
    }

    #[test]
    fn text_line() {
        let mut sink = MotTextSink::new(Vec::new());
        sink.accept(&record()).unwrap();
        sink.flush().unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "2 5 17 10.00 20.00 20.00 40.00 20.00 40.00\n"
        );
    }

    #[test]
    fn vec_sink_by_reference() {
        fn feed<S: EvaluationSink>(mut sink: S) {
            sink.accept(&record()).unwrap();
        }

        let mut sink = VecSink::default();
        feed(&mut sink);
        feed(&mut sink);
        assert_eq!(sink.records, vec![record(), record()]);
    }

    #[test]
    fn channel() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let mut sink = ChannelSink::new(tx);
        sink.accept(&record()).unwrap();
        assert_eq!(rx.recv().unwrap(), record());

        drop(rx);
        let err = sink.accept(&record()).unwrap_err();
        assert_eq!(err.downcast_ref::<Errors>(), Some(&Errors::SinkClosed));
    }
}
