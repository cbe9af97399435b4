mod present;
mod window;

use cardfield::FieldConfig;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::window::{App, HostError, DEFAULT_SIZE};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("cardfield: {}", e);
        std::process::exit(1);
    }
}

/// Usage: `cardfield [config.json] [WIDTHxHEIGHT]`
fn run() -> Result<(), HostError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };
    let size = match args.next() {
        Some(arg) => parse_size(&arg).ok_or(HostError::Usage(arg))?,
        None => DEFAULT_SIZE,
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, size);
    event_loop.run_app(&mut app)?;
    app.into_result()
}

fn parse_size(arg: &str) -> Option<(u32, u32)> {
    let (w, h) = arg.split_once('x')?;
    let size = (w.trim().parse().ok()?, h.trim().parse().ok()?);
    (size.0 > 0 && size.1 > 0).then_some(size)
}
