pub mod blocking;
pub mod convert;
pub mod cursor;
pub mod options;
pub mod status;
pub mod types;
