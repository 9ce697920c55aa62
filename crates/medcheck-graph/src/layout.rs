//! Force-directed (Fruchterman–Reingold) spring layout.
//!
//! Initial positions come from a seeded ChaCha generator, so the same graph
//! and seed always produce the same coordinates. Output is centred on the
//! origin and scaled so the largest absolute coordinate equals `scale`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_seed()       -> u64   { 42 }
fn default_iterations() -> usize { 50 }
fn default_scale()      -> f64   { 1.0 }

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            iterations: default_iterations(),
            scale: default_scale(),
        }
    }
}

const MIN_DISTANCE: f64 = 0.01;

/// Lay out `node_count` nodes connected by weighted `edges` (index pairs).
///
/// Edge weights scale the attractive force; parallel edges add up.
pub fn spring_layout(node_count: usize, edges: &[(usize, usize, f64)], cfg: &LayoutConfig) -> Vec<Point> {
    match node_count {
        0 => return Vec::new(),
        1 => return vec![Point::default()],
        _ => {}
    }

    let n = node_count;
    let mut adjacency = vec![vec![0.0_f64; n]; n];
    for &(a, b, w) in edges {
        if a == b || a >= n || b >= n {
            continue;
        }
        adjacency[a][b] += w;
        adjacency[b][a] += w;
    }

    let mut rng = ChaCha20Rng::seed_from_u64(cfg.seed);
    let mut pos: Vec<Point> = (0..n).map(|_| Point::new(rng.gen::<f64>(), rng.gen::<f64>())).collect();

    let k = (1.0 / n as f64).sqrt();
    let (min, max) = bounds(&pos);
    let mut temperature = (max.x - min.x).max(max.y - min.y) * 0.1;
    let cooling = temperature / (cfg.iterations as f64 + 1.0);

    let mut displacement = vec![Point::default(); n];
    for _ in 0..cfg.iterations {
        for (i, disp) in displacement.iter_mut().enumerate() {
            *disp = Point::default();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                // repulsion k²/d² minus attraction A·d/k, applied along (dx, dy)
                let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                disp.x += dx * force;
                disp.y += dy * force;
            }
        }

        for (p, disp) in pos.iter_mut().zip(&displacement) {
            let length = (disp.x * disp.x + disp.y * disp.y).sqrt().max(MIN_DISTANCE);
            p.x += disp.x * temperature / length;
            p.y += disp.y * temperature / length;
        }
        temperature -= cooling;
    }

    rescale(&mut pos, cfg.scale);
    pos
}

fn bounds(pos: &[Point]) -> (Point, Point) {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pos {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

fn rescale(pos: &mut [Point], scale: f64) {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p.y).sum::<f64>() / n;
    for p in pos.iter_mut() {
        p.x -= mean_x;
        p.y -= mean_y;
    }

    let limit = pos.iter().fold(0.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.x *= scale / limit;
            p.y *= scale / limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivial_graphs() {
        let cfg = LayoutConfig::default();
        assert!(spring_layout(0, &[], &cfg).is_empty());
        assert_eq!(spring_layout(1, &[], &cfg), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let cfg = LayoutConfig::default();
        let edges = [(0, 1, 4.0), (1, 2, 4.0), (2, 3, 1.0)];
        assert_eq!(spring_layout(4, &edges, &cfg), spring_layout(4, &edges, &cfg));
    }

    #[test]
    fn test_different_seed_moves_nodes() {
        let edges = [(0, 1, 4.0), (1, 2, 4.0)];
        let a = spring_layout(3, &edges, &LayoutConfig { seed: 1, ..LayoutConfig::default() });
        let b = spring_layout(3, &edges, &LayoutConfig { seed: 2, ..LayoutConfig::default() });
        assert_ne!(a, b);
    }

    #[test]
    fn test_positions_are_centred_and_scaled() {
        let cfg = LayoutConfig { scale: 2.0, ..LayoutConfig::default() };
        let pos = spring_layout(5, &[(0, 1, 4.0), (0, 2, 4.0), (3, 4, 2.0)], &cfg);

        let max_abs = pos.iter().fold(0.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
        assert!((max_abs - 2.0).abs() < 1e-9);

        let mean_x = pos.iter().map(|p| p.x).sum::<f64>() / pos.len() as f64;
        let mean_y = pos.iter().map(|p| p.y).sum::<f64>() / pos.len() as f64;
        assert!(mean_x.abs() < 1e-9 && mean_y.abs() < 1e-9);
    }

    #[test]
    fn test_nodes_do_not_collapse() {
        let pos = spring_layout(3, &[(0, 1, 4.0), (1, 2, 4.0)], &LayoutConfig::default());
        for i in 0..pos.len() {
            for j in (i + 1)..pos.len() {
                assert!(pos[i].distance(&pos[j]) > 1e-3, "nodes {i} and {j} overlap");
            }
        }
    }
}
