//! Vision front end — webcam frames and face rectangles.
//!
//! # Pipeline
//!
//! ```text
//! Capture device → FrameSource::next_frame → Frame (RGB8)
//!               → FaceLocator::locate      → Vec<FaceRegion>
//!               → Frame::crop(region)       → face sub-image for the classifier
//! ```
//!
//! The traits are the seam between the render loop and the concrete
//! backends.  With the `camera` feature enabled, [`OpenCvCamera`] and
//! [`HaarFaceLocator`] provide the production implementations on top of
//! OpenCV.

pub mod frame;
pub mod source;

#[cfg(feature = "camera")]
pub mod camera;
#[cfg(feature = "camera")]
pub mod haar;

pub use frame::{FaceRegion, Frame, FrameError};
pub use source::{FaceLocator, FrameSource, VisionError};

#[cfg(test)]
pub use source::{MockFaceLocator, MockFrameSource};

#[cfg(feature = "camera")]
pub use camera::OpenCvCamera;
#[cfg(feature = "camera")]
pub use haar::HaarFaceLocator;
