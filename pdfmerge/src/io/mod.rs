//! Intake and output: how files get in and how the merged document gets out.

pub mod reader;
pub mod writer;

pub use reader::IntakeFile;
pub use writer::{DEFAULT_OUTPUT_NAME, DispatchReceipt, OutputDispatcher};

#[cfg(feature = "fs")]
pub use reader::FileReader;
#[cfg(feature = "fs")]
pub use writer::{FileDispatcher, WriteOptions, WriteStatistics};
