//! One module per stage. Each exposes its handler as a method on
//! [`Pipeline`](crate::Pipeline) and keeps validation and job construction
//! as plain functions.

mod audio;
mod export;
mod merge;
mod text;
mod trim;
mod upload;

#[cfg(test)]
pub(crate) mod testutil;
