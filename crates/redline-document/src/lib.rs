//! Structured document model shared by the redline editing services.
//!
//! A [`Document`] is an ordered body of top-level paragraphs and tables. Each
//! paragraph is a [`Block`] of formatted [`Fragment`]s; tables hold rows of
//! cells which in turn hold their own blocks. Documents live on disk as
//! pretty-printed JSON and are always re-read from disk by the operations
//! that consume them; [`storage`] owns that round trip, including the atomic
//! same-directory rename used for every write.

mod convert;
mod error;
mod formatting;
mod model;
pub mod storage;

pub use convert::{CommandConverter, ConfigurableConverter, EquationConverter};
pub use error::{ConversionError, DocumentError};
pub use formatting::{Color, Formatting};
pub use model::{
    Block, BlockAddress, BodyItem, Cell, Content, Document, Equation, Field, Fragment, Row, Table,
};

#[cfg(test)]
mod tests;
