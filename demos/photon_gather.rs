use photonkd::{BoundingBox, GatherConfig, Photon, PhotonMap};
use rand::Rng;

// Scatters photons over a unit floor lit from above and prints radiance estimates
// along its diagonal. Run with RUST_LOG=debug to see the build log.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => GatherConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => GatherConfig::default(),
    };

    let floor = BoundingBox::new([0.0, 0.0], [1.0, 1.0]);
    let mut rng = rand::thread_rng();
    let photons: Vec<Photon> = (0..50_000)
        .map(|_| {
            let [x, y] = floor.random_point(&mut rng);
            let direction = [rng.gen_range(-0.3..0.3), rng.gen_range(-0.3..0.3), -1.0];
            // Warm light falling off towards the far corner.
            let falloff = 1.0 - 0.5 * (x + y);
            Photon::new([x, y, 0.0], direction, [falloff, 0.8 * falloff, 0.6 * falloff])
        })
        .collect();

    let map = PhotonMap::new(photons, config);
    println!("{} photons, tree depth {}", map.len(), map.tree().depth());

    let samples: Vec<([f64; 3], [f64; 3])> = (0..=10)
        .map(|i| {
            let t = i as f64 / 10.0;
            ([t, t, 0.0], [0.0, 0.0, 1.0])
        })
        .collect();
    for ((position, _), [r, g, b]) in samples.iter().zip(map.radiance_estimate_batch(&samples)) {
        println!("({:.1}, {:.1}): {:.4} {:.4} {:.4}", position[0], position[1], r, g, b);
    }
    Ok(())
}
