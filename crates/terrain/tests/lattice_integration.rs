//! Integration tests for the chunk lattice.
//!
//! These tests drive the manager the way a host application does: build the
//! default lattice, install a heightmap once it has been decoded, tweak
//! parameters live and read back the per-chunk height buffers.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use terrain::prelude::*;

fn test_config() -> TerrainConfig {
    TerrainConfig {
        resolution: 17,
        noise: NoiseParameters {
            octaves: 4,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A heightmap with a bright left half and dark right half.
fn split_raster() -> Raster {
    let rows: Vec<Vec<f64>> = (0..8)
        .map(|_| (0..8).map(|x| if x < 4 { 1.0 } else { 0.25 }).collect())
        .collect();
    Raster::from_rows(&rows).unwrap()
}

fn snapshot(manager: &TerrainChunkManager) -> Vec<(ChunkKey, Vec<f64>)> {
    manager
        .keys()
        .into_iter()
        .map(|key| (key, manager.chunk(key).unwrap().heights().to_vec()))
        .collect()
}

#[test]
fn test_heightmap_only_changes_its_band() {
    let mut manager = TerrainChunkManager::with_lattice(test_config()).unwrap();
    let before = snapshot(&manager);

    manager.insert_heightmap_source(split_raster()).unwrap();

    let outer = manager.config().heightmap.outer_radius;
    let mut changed_inside = 0;
    for (key, heights) in before {
        let chunk = manager.chunk(key).unwrap();
        let n = chunk.resolution();
        for j in 0..n {
            for i in 0..n {
                let p = chunk.vertex_position(i, j);
                let distance = p.x.hypot(p.y);
                let old = heights[j * n + i];
                let new = chunk.height(i, j).unwrap();
                if distance >= outer {
                    assert!(
                        (old - new).abs() < 1e-9,
                        "vertex at {p:?} moved from {old} to {new}"
                    );
                } else if (old - new).abs() > 1e-9 {
                    changed_inside += 1;
                }
            }
        }
    }
    assert!(changed_inside > 0);
}

#[test]
fn test_heightmap_blends_evenly_inside_inner_radius() {
    let mut manager = TerrainChunkManager::with_lattice(test_config()).unwrap();
    manager.insert_heightmap_source(split_raster()).unwrap();

    let noise = FractalNoiseField::new(test_config().noise).unwrap();
    let chunk = manager.chunk(ChunkKey::new(0, 0)).unwrap();
    let center = chunk.resolution() / 2;
    let p = chunk.vertex_position(center, center);
    assert_eq!((p.x, p.y), (0.0, 0.0));

    let heightmap = chunk.sources()[0].evaluate(p.x, p.y);
    assert_eq!(heightmap.weight, 1.0);
    let expected = (heightmap.height + noise.evaluate(p.x, p.y)) / 2.0;
    assert!((chunk.height(center, center).unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_heightmap_scale_change_propagates() {
    let mut manager = TerrainChunkManager::with_lattice(test_config()).unwrap();
    manager.insert_heightmap_source(split_raster()).unwrap();

    manager
        .apply_configuration_change(ConfigChange::HeightmapScale(0.0))
        .unwrap();

    let noise = FractalNoiseField::new(test_config().noise).unwrap();
    let chunk = manager.chunk(ChunkKey::new(0, 0)).unwrap();
    let center = chunk.resolution() / 2;
    let expected = noise.evaluate(0.0, 0.0) / 2.0;
    assert!((chunk.height(center, center).unwrap() - expected).abs() < 1e-9);
    assert_eq!(manager.config().heightmap.height_scale, 0.0);
}

#[test]
fn test_heightmap_band_change_moves_fade_region() {
    let mut manager = TerrainChunkManager::with_lattice(test_config()).unwrap();
    let noise_only = snapshot(&manager);
    manager.insert_heightmap_source(split_raster()).unwrap();
    let wide = snapshot(&manager);

    manager
        .apply_configuration_change(ConfigChange::HeightmapBand {
            inner_radius: 50.0,
            outer_radius: 100.0,
        })
        .unwrap();
    let narrow = snapshot(&manager);

    let mut released = 0;
    for ((key, plain), ((_, before), (_, after))) in
        noise_only.iter().zip(wide.iter().zip(&narrow))
    {
        let chunk = manager.chunk(*key).unwrap();
        let n = chunk.resolution();
        for j in 0..n {
            for i in 0..n {
                let p = chunk.vertex_position(i, j);
                let idx = j * n + i;
                if p.x.hypot(p.y) >= 100.0 {
                    assert!((after[idx] - plain[idx]).abs() < 1e-9);
                    if (before[idx] - plain[idx]).abs() > 1e-9 {
                        released += 1;
                    }
                }
            }
        }
    }
    assert!(released > 0, "narrowing the band released no vertices");

    let chunk = manager.chunk(ChunkKey::new(0, 0)).unwrap();
    assert_eq!(chunk.sources()[0].evaluate(30.0, 0.0).weight, 1.0);

    let err = manager
        .apply_configuration_change(ConfigChange::HeightmapBand {
            inner_radius: 100.0,
            outer_radius: 60.0,
        })
        .unwrap_err();
    assert!(matches!(err, TerrainError::Config(ConfigError::InvalidBand { .. })));
    assert_eq!(snapshot(&manager), narrow);
    assert_eq!(manager.config().heightmap.inner_radius, 50.0);
    assert_eq!(manager.config().heightmap.outer_radius, 100.0);
}

#[test]
fn test_invalid_change_leaves_buffers() {
    let mut manager = TerrainChunkManager::with_lattice(test_config()).unwrap();
    let before = snapshot(&manager);

    for bad in [
        NoiseParameters {
            base_scale: 0.0,
            ..test_config().noise
        },
        NoiseParameters {
            octaves: 0,
            ..test_config().noise
        },
    ] {
        let err = manager
            .apply_configuration_change(ConfigChange::Noise(bad))
            .unwrap_err();
        assert!(matches!(err, TerrainError::Config(_)));
    }

    assert_eq!(snapshot(&manager), before);
}

#[test]
fn test_seed_change_changes_terrain() {
    let mut manager = TerrainChunkManager::with_lattice(test_config()).unwrap();
    let before = snapshot(&manager);

    let reseeded = NoiseParameters {
        seed: 99,
        ..manager.noise_parameters()
    };
    manager
        .apply_configuration_change(ConfigChange::Noise(reseeded))
        .unwrap();
    assert_ne!(snapshot(&manager), before);
}

#[test]
fn test_rebuild_is_deterministic() {
    let a = TerrainChunkManager::with_lattice(test_config()).unwrap();
    let mut b = TerrainChunkManager::with_lattice(test_config()).unwrap();
    b.rebuild_all();
    assert_eq!(snapshot(&a), snapshot(&b));
}

#[test]
fn test_origin_tint_only_on_origin_chunk() {
    let config = TerrainConfig {
        origin_tint: true,
        ..test_config()
    };
    let mut manager = TerrainChunkManager::with_lattice(config).unwrap();
    assert!(manager
        .chunks()
        .all(|c| c.tint().iter().all(|&t| t == TintPass::NEUTRAL)));

    manager
        .insert_heightmap_source(Raster::new(1, 1, vec![1.0]).unwrap())
        .unwrap();

    for chunk in manager.chunks() {
        let tinted = chunk.tint().iter().all(|&t| t == 1.0);
        let neutral = chunk.tint().iter().all(|&t| t == TintPass::NEUTRAL);
        if chunk.key() == ChunkKey::new(0, 0) {
            assert!(tinted);
        } else {
            assert!(neutral);
        }
    }
}

#[test]
fn test_blend_order_independent() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let mut sources: Vec<Arc<dyn HeightSource>> = (0..rng.gen_range(1..8))
            .map(|_| {
                let source = ConstantSource::new(rng.gen_range(-100.0..100.0))
                    .with_weight(rng.gen_range(0.0..1.0));
                Arc::new(source) as Arc<dyn HeightSource>
            })
            .collect();

        let mut chunk = TerrainChunk::new(ChunkKey::new(0, 0), 10.0, 2, sources.clone()).unwrap();
        chunk.rebuild();
        let ordered = chunk.heights().to_vec();

        sources.shuffle(&mut rng);
        let mut shuffled = TerrainChunk::new(ChunkKey::new(0, 0), 10.0, 2, sources).unwrap();
        shuffled.rebuild();

        for (a, b) in ordered.iter().zip(shuffled.heights()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}

#[test]
fn test_bump_source_in_lattice_chunk() {
    let mut chunk = TerrainChunk::new(
        ChunkKey::new(0, 0),
        500.0,
        3,
        vec![Arc::new(BumpSource::default())],
    )
    .unwrap();
    chunk.rebuild();
    assert_eq!(chunk.height(1, 1), Some(128.0));
    assert_eq!(chunk.height(0, 1), Some(0.0));
}
