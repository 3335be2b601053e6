//! Draws every step of a sweep as an svg file.
//!
//! `cargo run --features generators --example svg_steps -- --output out segments`

use std::path::PathBuf;

use clap::Parser;
use svg::{
    node::element::{path::Data, Circle, Line, Path},
    Document,
};
use tracing_subscriber::EnvFilter;

use sweepstep::{generators, intersections, skyline, GeometryModel, Point};

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum Example {
    /// Crossing segments.
    Segments,
    /// Mostly-parallel segments.
    SparseSegments,
    /// A skyline.
    City,
}

#[derive(Parser)]
struct Cli {
    /// The directory to write the svg files to.
    #[arg(long)]
    output: PathBuf,

    /// How big to make the example.
    #[arg(long, default_value_t = 6)]
    size: usize,

    example: Example,
}

struct Frame {
    doc: Document,
    stroke_width: f64,
    min_y: f64,
    max_y: f64,
}

impl Frame {
    fn new(min: Point, max: Point) -> Self {
        let pad = 0.05 * (max.x - min.x).max(max.y - min.y) + 1.0;
        let stroke_width = (max.x - min.x).max(max.y - min.y) / 256.0;
        let doc = Document::new().set(
            "viewBox",
            (
                min.x - pad,
                min.y - pad,
                max.x - min.x + 2.0 * pad,
                max.y - min.y + 2.0 * pad,
            ),
        );
        Frame {
            doc,
            stroke_width,
            min_y: min.y - pad,
            max_y: max.y + pad,
        }
    }

    fn line(mut self, p0: Point, p1: Point, color: &str) -> Self {
        self.doc = self.doc.add(
            Line::new()
                .set("x1", p0.x)
                .set("y1", p0.y)
                .set("x2", p1.x)
                .set("y2", p1.y)
                .set("stroke", color)
                .set("stroke-width", self.stroke_width)
                .set("stroke-linecap", "round"),
        );
        self
    }

    fn sweep_line(self, x: f64) -> Self {
        let (y0, y1) = (self.min_y, self.max_y);
        self.line(Point::new(x, y0), Point::new(x, y1), "#9B2226")
    }

    fn dot(mut self, p: Point, color: &str) -> Self {
        self.doc = self.doc.add(
            Circle::new()
                .set("cx", p.x)
                .set("cy", p.y)
                .set("r", 2.0 * self.stroke_width)
                .set("fill", color),
        );
        self
    }

    fn polyline(mut self, points: &[Point], color: &str) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return self;
        };
        let mut data = Data::new().move_to((first.x, first.y));
        for p in rest {
            data = data.line_to((p.x, p.y));
        }
        self.doc = self.doc.add(
            Path::new()
                .set("d", data)
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-width", 2.0 * self.stroke_width)
                .set("stroke-linejoin", "round"),
        );
        self
    }
}

fn segment_frames(model: &GeometryModel) -> anyhow::Result<Vec<Document>> {
    let segments = model.segments();
    let points = || segments.as_slice().iter().flat_map(|s| [s.start, s.end]);
    let min = points().reduce(|a, b| Point::new(a.x.min(b.x), a.y.min(b.y)));
    let max = points().reduce(|a, b| Point::new(a.x.max(b.x), a.y.max(b.y)));
    let (Some(min), Some(max)) = (min, max) else {
        return Ok(Vec::new());
    };

    let mut ret = Vec::new();
    for step in intersections::intersection_steps(model)? {
        let mut frame = Frame::new(min, max);
        for (idx, s) in segments.iter() {
            let color = if step.active.contains(&idx) {
                "#005F73"
            } else {
                "#94D2BD"
            };
            frame = frame.line(s.start, s.end, color);
        }
        frame = frame.sweep_line(step.x);
        for p in &step.found {
            frame = frame.dot(*p, "#EE9B00");
        }
        ret.push(frame.doc);
    }
    Ok(ret)
}

fn skyline_frames(model: &GeometryModel) -> anyhow::Result<Vec<Document>> {
    let buildings = model.buildings().as_slice();
    let min_x = buildings.iter().map(|b| b.left()).reduce(f64::min);
    let max_x = buildings.iter().map(|b| b.right()).reduce(f64::max);
    let max_h = buildings.iter().map(|b| b.height()).fold(0.0, f64::max);
    let (Some(min_x), Some(max_x)) = (min_x, max_x) else {
        return Ok(Vec::new());
    };

    // svg's y axis points down, so we draw heights as negative y.
    let min = Point::new(min_x, -max_h);
    let max = Point::new(max_x, 0.0);
    let mut ret = Vec::new();
    for step in skyline::skyline_steps(model)? {
        let mut frame = Frame::new(min, max);
        for b in buildings {
            let corners = [
                Point::new(b.left(), 0.0),
                Point::new(b.left(), -b.height()),
                Point::new(b.right(), -b.height()),
                Point::new(b.right(), 0.0),
            ];
            frame = frame.polyline(&corners, "#94D2BD");
        }

        let mut outline = Vec::new();
        let mut height = 0.0;
        for v in &step.outline {
            outline.push(Point::new(v.x, -height));
            outline.push(Point::new(v.x, -v.height));
            height = v.height;
        }
        outline.push(Point::new(step.x, -height));
        frame = frame.polyline(&outline, "#AE2012").sweep_line(step.x);
        ret.push(frame.doc);
    }
    Ok(ret)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    let frames = match args.example {
        Example::Segments => segment_frames(&generators::slanties(args.size))?,
        Example::SparseSegments => segment_frames(&generators::sparse_segments(args.size))?,
        Example::City => skyline_frames(&generators::city(args.size))?,
    };

    std::fs::create_dir_all(&args.output)?;
    for (idx, doc) in frames.iter().enumerate() {
        svg::save(args.output.join(format!("step_{idx:04}.svg")), doc)?;
    }
    tracing::info!(frames = frames.len(), output = %args.output.display(), "wrote svg files");
    Ok(())
}
