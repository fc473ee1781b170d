use chrono::{DateTime, Utc};
use opencv::{
    core::{extract_channel, Mat, Point, Range, Scalar, CV_32F, CV_8UC3, CV_8UC4},
    imgproc::{
        blend_linear, circle, cvt_color, line, put_text, COLOR_BGRA2BGR, FONT_HERSHEY_SIMPLEX,
        LINE_8,
    },
    prelude::*,
};

use crate::error::Result;
use crate::hand::{HandLandmarks, CONNECTIONS};

const LANDMARK_COLOR: (f64, f64, f64) = (0., 0., 255.);
const BONE_COLOR: (f64, f64, f64) = (255., 255., 255.);

pub fn bgr(color: (f64, f64, f64)) -> Scalar {
    Scalar::new(color.0, color.1, color.2, 0.0)
}

/// A camera frame being drawn on. `mat` is 8-bit BGR.
#[derive(Clone)]
pub struct Frame {
    pub mat: Mat,
    pub num: i64,
    pub start_date: DateTime<Utc>,
}

impl Frame {
    pub fn width(&self) -> i32 {
        self.mat.cols()
    }

    pub fn height(&self) -> i32 {
        self.mat.rows()
    }

    /// Blends `image` onto the frame with its top-left corner at `origin`.
    /// Four-channel images use their alpha channel, three-channel images are
    /// copied as is. Whatever falls outside the frame is cut off.
    pub fn overlay(self, image: &Mat, origin: Point) -> Result<Frame> {
        let has_alpha = image.typ() == CV_8UC4;
        if (!has_alpha && image.typ() != CV_8UC3) || self.mat.typ() != CV_8UC3 {
            warn!("frame {}\tcannot overlay image of type {}", self.num, image.typ());
            return Ok(self);
        }

        let x_start = origin.x.max(0);
        let y_start = origin.y.max(0);
        let x_end = (origin.x + image.cols()).min(self.width());
        let y_end = (origin.y + image.rows()).min(self.height());
        if x_start >= x_end || y_start >= y_end {
            return Ok(self);
        }

        // both views share data with their parents
        let mut target = self
            .mat
            .row_range(&Range::new(y_start, y_end)?)?
            .col_range(&Range::new(x_start, x_end)?)?;
        let source = image
            .row_range(&Range::new(y_start - origin.y, y_end - origin.y)?)?
            .col_range(&Range::new(x_start - origin.x, x_end - origin.x)?)?;

        if !has_alpha {
            source.copy_to(&mut target)?;
            return Ok(self);
        }

        let mut alpha = Mat::default();
        extract_channel(&source, &mut alpha, 3)?;
        let mut image_weight = Mat::default();
        alpha.convert_to(&mut image_weight, CV_32F, 1.0 / 255.0, 0.0)?;
        let mut frame_weight = Mat::default();
        image_weight.convert_to(&mut frame_weight, CV_32F, -1.0, 1.0)?;

        let mut color = Mat::default();
        cvt_color(&source, &mut color, COLOR_BGRA2BGR, 0)?;

        let mut blended = Mat::default();
        blend_linear(&color, &target, &image_weight, &frame_weight, &mut blended)?;
        blended.copy_to(&mut target)?;

        Ok(self)
    }

    pub fn overlay_centered(self, image: &Mat) -> Result<Frame> {
        let origin = Point::new(
            (self.width() - image.cols()) / 2,
            (self.height() - image.rows()) / 2,
        );
        self.overlay(image, origin)
    }

    pub fn put_text(
        mut self,
        text: &str,
        origin: Point,
        scale: f64,
        color: (f64, f64, f64),
    ) -> Result<Frame> {
        put_text(
            &mut self.mat,
            text,
            origin,
            FONT_HERSHEY_SIMPLEX,
            scale,
            bgr(color),
            2,
            LINE_8,
            false,
        )?;

        Ok(self)
    }

    pub fn draw_landmarks(mut self, hand: &HandLandmarks) -> Result<Frame> {
        let points: Vec<Point> = hand
            .to_pixels(self.width(), self.height())
            .into_iter()
            .map(|(x, y)| Point::new(x, y))
            .collect();

        for (from, to) in CONNECTIONS.iter() {
            line(
                &mut self.mat,
                points[*from],
                points[*to],
                bgr(BONE_COLOR),
                2,
                LINE_8,
                0,
            )?;
        }

        for point in points.iter() {
            circle(&mut self.mat, *point, 4, bgr(LANDMARK_COLOR), -1, LINE_8, 0)?;
        }

        Ok(self)
    }
}
