//! CLI command implementations.

mod args;
pub(crate) mod check;
mod files;
pub(crate) mod rewrite;

pub(crate) use check::CheckArgs;
pub(crate) use rewrite::RewriteArgs;
