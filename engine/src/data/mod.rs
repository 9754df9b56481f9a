// Data layer: calendar axis, in-memory price table, reconciliation and sheet codecs
pub mod calendar;
pub mod merge;
pub mod payload;
pub mod price_matrix;
pub mod quotes;
pub mod sheet;
