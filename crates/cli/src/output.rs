//! Command output on stdout.
//!
//! Logs go to stderr through tracing; rendered screens go here.

/// Print a rendered block followed by a newline.
#[allow(clippy::print_stdout)]
pub fn print(text: &str) {
    println!("{text}");
}
