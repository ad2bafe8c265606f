use photonkd::{BoundingBox, KdTree};
use plotters::prelude::*;
use rand::Rng;

enum Outline {
    Disc([f64; 2], f64),
    Box(BoundingBox<2>),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bounds = BoundingBox::new([0.0, 0.0], [100.0, 100.0]);
    let mut rng = rand::thread_rng();
    let tree = KdTree::build(bounds.random_points(1000, &mut rng), bounds);

    let query = [rng.gen_range(20.0..80.0), rng.gen_range(20.0..80.0)];
    let found = tree.k_nearest(&query, 25);
    let radius = found.last().map_or(0.0, |n| n.distance);
    let highlighted: Vec<[f64; 2]> = found.iter().map(|n| *n.point).collect();
    run_example("2d_k_nearest.svg", &tree, &highlighted, Outline::Disc(query, radius))?;

    let region = BoundingBox::new([30.0, 40.0], [70.0, 60.0]);
    let highlighted: Vec<[f64; 2]> = tree.range(&region).into_iter().copied().collect();
    run_example("2d_range.svg", &tree, &highlighted, Outline::Box(region))?;

    Ok(())
}

fn run_example(
    filename: &str,
    tree: &KdTree<[f64; 2], 2>,
    highlighted: &[[f64; 2]],
    outline: Outline,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(filename, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root).build_cartesian_2d(0.0..100.0, 0.0..100.0)?;

    // Draw bounding box
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)],
        BLACK.stroke_width(2),
    )))?;

    // Draw points
    chart.draw_series(tree.points().iter().map(|p| Circle::new((p[0], p[1]), 2, RED.filled())))?;
    chart.draw_series(highlighted.iter().map(|p| Circle::new((p[0], p[1]), 4, BLUE.filled())))?;

    match outline {
        Outline::Disc(center, radius) => {
            // 100 units span 1024 pixels.
            let pixels = (radius * 10.24).round() as i32;
            chart.draw_series(std::iter::once(Circle::new((center[0], center[1]), 5, GREEN.filled())))?;
            chart.draw_series(std::iter::once(Circle::new((center[0], center[1]), pixels, GREEN.stroke_width(2))))?;
        }
        Outline::Box(region) => {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(region.min[0], region.min[1]), (region.max[0], region.max[1])],
                GREEN.stroke_width(2),
            )))?;
        }
    }

    root.present()?;
    println!("Output saved to {}", filename);
    Ok(())
}
