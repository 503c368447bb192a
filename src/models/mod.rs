pub mod candidate;
pub mod description;
pub mod picture;

pub use candidate::Candidate;
pub use description::{Caption, Description};
pub use picture::{DownloadError, Picture, PictureData};
