pub mod keyvalues;

pub mod steam;

pub mod egs;

pub mod convert;

pub use convert::{MergeOptions, merge_localizations};
