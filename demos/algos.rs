//! Runs one of the algorithms on input read from stdin (or a file).
//!
//! The input is a command followed by whitespace-separated numbers:
//!
//! ```text
//! vol3d n       (then n boxes: x1 y1 z1 x2 y2 z2)
//! segint m      (then m segments: x1 y1 x2 y2)
//! polyfill k y step  (then k vertices: x y)
//! cp3d n        (then n points: x y z)
//! skyline n     (then n buildings: left right height)
//! ```
//!
//! For example, `echo "skyline 3 0 4 8 4 8 6 6 10 10" | cargo run --example algos`.

use std::{io::Read as _, path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Context as _};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sweepstep::{
    Algorithm, Box3, Building, Config, GeometryModel, Outcome, Point3, Polygon2, Segment2,
};

#[derive(Parser)]
struct Cli {
    /// Read the command from this file instead of stdin.
    input: Option<PathBuf>,

    /// Print every snapshot, not just the final result.
    #[arg(long)]
    steps: bool,

    /// Coordinates closer than this are considered equal.
    #[arg(long)]
    epsilon: Option<f64>,
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl Tokens<'_> {
    fn next<T: FromStr>(&mut self, what: &str) -> anyhow::Result<T>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let token = self
            .inner
            .next()
            .ok_or_else(|| anyhow!("unexpected end of input, expected {what}"))?;
        token
            .parse()
            .with_context(|| format!("couldn't parse {what} from {token:?}"))
    }

    fn point3(&mut self) -> anyhow::Result<Point3> {
        // Not `Point3::new`, because non-finite input gets rejected later, by the model.
        Ok(Point3::from((self.next("x")?, self.next("y")?, self.next("z")?)))
    }

    fn point(&mut self) -> anyhow::Result<(f64, f64)> {
        Ok((self.next("x")?, self.next("y")?))
    }
}

// The model, the algorithm, and (for polyfill) the single scanline to report.
fn parse(input: &str) -> anyhow::Result<(GeometryModel, Algorithm, Option<(f64, f64)>)> {
    let mut tokens = Tokens {
        inner: input.split_whitespace(),
    };
    let cmd: String = tokens.next("a command")?;
    let mut model = GeometryModel::new();
    let mut scanline = None;
    let algorithm = match cmd.as_str() {
        "vol3d" => {
            for _ in 0..tokens.next::<usize>("a box count")? {
                let min = tokens.point3()?;
                let max = tokens.point3()?;
                model.add_box(Box3::from_corners(min, max)?);
            }
            Algorithm::VolumeUnion
        }
        "segint" => {
            for _ in 0..tokens.next::<usize>("a segment count")? {
                let start = tokens.point()?;
                let end = tokens.point()?;
                model.add_segment(Segment2::new(start, end))?;
            }
            Algorithm::SegmentIntersection
        }
        "polyfill" => {
            let k: usize = tokens.next("a vertex count")?;
            let y: f64 = tokens.next("a scanline height")?;
            let step: f64 = tokens.next("a scanline step")?;
            let vertices = (0..k)
                .map(|_| tokens.point())
                .collect::<anyhow::Result<Vec<_>>>()?;
            model.add_polygon(Polygon2::new(vertices)?);
            scanline = Some((y, step));
            Algorithm::PolygonFill
        }
        "cp3d" => {
            for _ in 0..tokens.next::<usize>("a point count")? {
                model.add_point(tokens.point3()?)?;
            }
            Algorithm::ClosestPair
        }
        "skyline" => {
            for _ in 0..tokens.next::<usize>("a building count")? {
                let left: f64 = tokens.next("a left edge")?;
                let right: f64 = tokens.next("a right edge")?;
                let height: f64 = tokens.next("a height")?;
                model.add_building(Building::new(left, right, height)?);
            }
            Algorithm::Skyline
        }
        _ => bail!("unknown command {cmd:?}, expected vol3d|segint|polyfill|cp3d|skyline"),
    };
    Ok((model, algorithm, scanline))
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Volume(v) => println!("{v:.6}"),
        Outcome::Intersections(ret) => {
            println!("{}", ret.points.len());
            for p in &ret.points {
                println!("{} {}", p.x, p.y);
            }
        }
        Outcome::Fill(ret) => {
            for (idx, rows) in ret.polygons.iter().enumerate() {
                println!("polygon {idx}");
                for row in rows {
                    let spans: Vec<_> = row
                        .spans
                        .iter()
                        .map(|s| format!("[{:.6}, {:.6}]", s.x0, s.x1))
                        .collect();
                    println!("  y = {:.6}: {}", row.y, spans.join(" "));
                }
            }
        }
        Outcome::ClosestPair(pair) => {
            println!("{:.6} {} {}", pair.distance, pair.first.0, pair.second.0)
        }
        Outcome::Skyline(outline) => {
            println!("{}", outline.len());
            for v in outline {
                println!("{} {}", v.x, v.height);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let input = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            s
        }
    };

    let (model, algorithm, scanline) = parse(&input)?;
    let mut config = Config::default();
    if let Some(eps) = args.epsilon {
        config.eps = eps;
    }
    if let Some((y, step)) = scanline {
        config.scanline_origin = Some(y);
        config.scanline_step = step;
    }

    if args.steps {
        for (idx, snapshot) in model.compute_steps(algorithm, &config)?.enumerate() {
            println!("step {idx}: {snapshot:?}");
        }
    }

    match scanline {
        // Just the one scanline, and where the next one would be.
        Some((y, step)) if !args.steps => {
            config.validate()?;
            let polygon = &model.polygons().as_slice()[0];
            let spans = polygon.spans_at(y);
            println!("{}", spans.len());
            for s in &spans {
                println!("{:.6} {:.6}", s.x0, s.x1);
            }
            println!("{:.6}", y + step);
        }
        _ => print_outcome(&model.compute_final(algorithm, &config)?),
    }
    Ok(())
}
