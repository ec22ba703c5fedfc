#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

fn main() -> std::process::ExitCode {
    loghawk::run()
}
