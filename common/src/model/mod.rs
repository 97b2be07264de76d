pub mod contact;
pub mod field;
pub mod sheet;
pub mod stats;
