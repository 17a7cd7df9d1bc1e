//! External collaborators: the PPM pixel source and the histogram writer.

pub mod ppm;
pub mod report;
