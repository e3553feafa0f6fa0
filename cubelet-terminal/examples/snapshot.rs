/// Example: Render a single scrambled frame without entering raw mode
///
/// Usage: cargo run --example snapshot -- [moves]
/// where moves is a space-separated list such as "x1 y-1 z0'"
/// (axis, layer, trailing ' for clockwise).
use anyhow::{bail, Context};
use cubelet_core::{Axis, Move, Session, SessionConfig, Viewport};
use cubelet_terminal::AsciiRenderer;
use std::io::{self, Write};

const WIDTH: u16 = 80;
const HEIGHT: u16 = 30;

fn parse_move(token: &str) -> anyhow::Result<Move> {
    let (token, ccw) = match token.strip_suffix('\'') {
        Some(rest) => (rest, false),
        None => (token, true),
    };
    let mut chars = token.chars();
    let axis: Axis = chars
        .next()
        .context("empty move")?
        .to_string()
        .parse()?;
    let layer: i8 = chars.as_str().parse().with_context(|| format!("bad layer in {token:?}"))?;
    if !(-1..=1).contains(&layer) {
        bail!("layer {layer} out of range");
    }
    Ok(Move::new(axis, layer, ccw))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = cubelet_terminal::fit_to_terminal(
        SessionConfig {
            turn_frames: 1,
            ..SessionConfig::default()
        },
        WIDTH,
        HEIGHT,
    );
    let mut session = Session::new(config, Viewport::new(f64::from(WIDTH), f64::from(HEIGHT)));
    let mut renderer = AsciiRenderer::new(WIDTH as usize, HEIGHT as usize);

    for token in std::env::args().skip(1).flat_map(|arg| {
        arg.split_whitespace().map(str::to_owned).collect::<Vec<_>>()
    }) {
        session.start(parse_move(&token)?)?;
        session.tick(&mut renderer);
    }

    renderer.clear();
    session.tick(&mut renderer);

    let mut stdout = io::stdout();
    renderer.draw(&mut stdout)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
