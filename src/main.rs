#[macro_use]
extern crate log;

fn main() {
    if let Err(e) = finger_quiz::start() {
        error!("{}", e);
        std::process::exit(1);
    }
}
