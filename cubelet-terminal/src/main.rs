/// Cubelet Terminal - interactive 3x3x3 cube
///
/// Controls:
///   - Mouse drag: Turn the slice under the pointer
///   - WASD / Arrow Keys: Orbit the camera
///   - Space: Toggle autoplay
///   - R: Reset the cube
///   - Q/ESC: Quit
use anyhow::Context;
use cubelet_terminal::{parse_args, TerminalApp};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = parse_args(std::env::args().skip(1))?;
    log::info!("starting with {} frames per turn", config.turn_frames());

    let mut app = TerminalApp::new(config).context("failed to query terminal size")?;
    app.run().context("terminal session failed")?;

    println!("Thank you for using Cubelet!");
    Ok(())
}
