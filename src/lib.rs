//! A small interactive command interpreter.
//!
//! This crate reads lines of text, decides whether each line names a
//! builtin operation or an external program (or a `|`-separated pipeline of
//! external programs), executes it, and reports the result. It is
//! intentionally small: no quoting, no redirection, no globbing, no job
//! control. What it does carry is correct, leak-free handling of the
//! process and pipe-descriptor resources a pipeline needs.
//!
//! The main entry point is [`Interpreter`], which dispatches one line at a
//! time and also provides the interactive read-eval loop. The public
//! modules [`command`] and [`env`] expose the traits and types used to
//! implement commands and to interact with the process environment.

mod builtin;
pub mod command;
pub mod env;
mod external;
pub mod interrupt;
mod interpreter;
mod lexer;
mod parser;
mod pipeline;

/// Re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
