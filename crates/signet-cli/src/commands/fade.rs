use clap::{Args, ValueEnum};
use signet_processors::{Fade, FadeCurve, FadeDirection, Processor};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DirectionArg {
    In,
    Out,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CurveArg {
    Linear,
    Sine,
    SCurve,
    Exp,
    Log,
    Sqrt,
}

#[derive(Args, Debug)]
pub struct FadeArgs {
    direction: DirectionArg,
    curve: CurveArg,
    /// Fade length in frames.
    duration_frames: usize,
}

pub fn build(args: &FadeArgs) -> anyhow::Result<Box<dyn Processor>> {
    let direction = match args.direction {
        DirectionArg::In => FadeDirection::In,
        DirectionArg::Out => FadeDirection::Out,
    };
    let curve = match args.curve {
        CurveArg::Linear => FadeCurve::Linear,
        CurveArg::Sine => FadeCurve::Sine,
        CurveArg::SCurve => FadeCurve::SCurve,
        CurveArg::Exp => FadeCurve::Exp,
        CurveArg::Log => FadeCurve::Log,
        CurveArg::Sqrt => FadeCurve::Sqrt,
    };
    Ok(Box::new(Fade::new(direction, curve, args.duration_frames)))
}
