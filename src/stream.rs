use chrono::Utc;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY},
};

use crate::error::{QuizError, Result};
use crate::img::frame::Frame;

/// Live camera feed, read one frame per loop iteration.
pub struct CameraStream {
    capture: VideoCapture,
    pub index: i32,
    pub frame_index: i64,
}

impl CameraStream {
    pub fn open(index: i32) -> Result<Self> {
        info!("opening camera {}", index);
        let capture = VideoCapture::new(index, CAP_ANY)?;

        if !capture.is_opened()? {
            return Err(QuizError::CameraOpen(index));
        }

        Ok(CameraStream {
            capture,
            index,
            frame_index: 0,
        })
    }

    pub fn next_frame(&mut self) -> Result<Frame> {
        let mut mat = Mat::default();

        if !self.capture.read(&mut mat)? || mat.rows() == 0 || mat.cols() == 0 {
            error!("camera {} returned no frame", self.index);
            return Err(QuizError::CameraRead);
        }

        let frame = Frame {
            mat,
            num: self.frame_index,
            start_date: Utc::now(),
        };
        self.frame_index += 1;

        Ok(frame)
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("releasing camera {}: {}", self.index, e);
        }
    }
}
