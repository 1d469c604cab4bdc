use flock_cli::{ResizeEvent, RunOptions, Runner, Simulation};
use flock_shared::{FlockSettings, FrameSnapshot, Heading};

fn seeded(settings: FlockSettings, population: usize) -> FlockSettings {
    FlockSettings {
        population,
        seed: Some(2024),
        ..settings
    }
}

fn snapshots(output: &[u8]) -> Vec<FrameSnapshot> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_planar_run_writes_snapshot_lines() {
    let simulation = Simulation::from_settings(&seeded(FlockSettings::planar(), 40)).unwrap();
    let options = RunOptions {
        frames: 30,
        snapshot_every: Some(10),
        ..RunOptions::default()
    };
    let mut runner = Runner::new(simulation, options).unwrap();

    let mut output = Vec::new();
    let summary = runner.run(&mut output).unwrap();

    assert_eq!(summary.frames, 30);
    assert_eq!(summary.recomputed, 30 * 40);
    assert_eq!(summary.dropped, 0);

    let frames = snapshots(&output);
    let numbers: Vec<u64> = frames.iter().map(|snapshot| snapshot.frame).collect();
    assert_eq!(numbers, vec![1, 11, 21]);
    for snapshot in &frames {
        assert_eq!(snapshot.agents.len(), 40);
        for agent in &snapshot.agents {
            assert!(matches!(agent.heading, Heading::Angle(_)));
            assert_eq!(agent.position[2], 0.0);
            assert!(agent.speed() <= 4.0 + 1e-4);
        }
    }
}

#[test]
fn test_no_snapshots_without_interval() {
    let simulation = Simulation::from_settings(&seeded(FlockSettings::planar(), 5)).unwrap();
    let mut runner = Runner::new(
        simulation,
        RunOptions {
            frames: 10,
            ..RunOptions::default()
        },
    )
    .unwrap();

    let mut output = Vec::new();
    runner.run(&mut output).unwrap();
    assert!(output.is_empty());
}

#[test]
fn test_resize_events_apply_in_frame_order() {
    let simulation = Simulation::from_settings(&seeded(FlockSettings::spatial(), 50)).unwrap();
    let options = RunOptions {
        frames: 20,
        snapshot_every: Some(1),
        resizes: vec![
            ResizeEvent {
                frame: 15,
                population: 25,
            },
            ResizeEvent {
                frame: 5,
                population: 10,
            },
        ],
        ..RunOptions::default()
    };
    let mut runner = Runner::new(simulation, options).unwrap();

    let mut output = Vec::new();
    let summary = runner.run(&mut output).unwrap();

    assert_eq!(summary.final_population, 25);
    let sizes: Vec<usize> = snapshots(&output).iter().map(|snapshot| snapshot.agents.len()).collect();
    assert_eq!(sizes[4], 50);
    assert_eq!(sizes[5], 10);
    assert_eq!(sizes[14], 10);
    assert_eq!(sizes[15], 25);
}

#[test]
fn test_spatial_run_accounts_for_every_boid() {
    let simulation = Simulation::from_settings(&seeded(FlockSettings::spatial(), 120)).unwrap();
    let mut runner = Runner::new(
        simulation,
        RunOptions {
            frames: 12,
            snapshot_every: Some(12),
            ..RunOptions::default()
        },
    )
    .unwrap();

    let mut output = Vec::new();
    let summary = runner.run(&mut output).unwrap();

    assert_eq!(summary.recomputed + summary.throttled + summary.culled, 12 * 120);
    let frames = snapshots(&output);
    assert_eq!(frames.len(), 1);
    for agent in &frames[0].agents {
        let Heading::Direction([x, y, z]) = agent.heading else {
            panic!("3D boids face a direction");
        };
        let length = (x * x + y * y + z * z).sqrt();
        assert!((length - 1.0).abs() < 1e-3);
    }
}

#[test]
fn test_same_seed_same_output() {
    let run = || {
        let simulation = Simulation::from_settings(&seeded(FlockSettings::planar(), 30)).unwrap();
        let mut runner = Runner::new(
            simulation,
            RunOptions {
                frames: 15,
                snapshot_every: Some(5),
                ..RunOptions::default()
            },
        )
        .unwrap();
        let mut output = Vec::new();
        runner.run(&mut output).unwrap();
        output
    };
    assert_eq!(run(), run());
}

#[test]
fn test_invalid_settings_are_rejected() {
    let negative_weight = FlockSettings {
        cohesion_weight: -1.0,
        ..FlockSettings::planar()
    };
    let error = Simulation::from_settings(&negative_weight).err().unwrap();
    assert!(format!("{:#}", error).contains("cohesion weight"));

    let inverted_lod = FlockSettings {
        lod: flock_shared::LevelOfDetail {
            near: 300.0,
            ..Default::default()
        },
        ..FlockSettings::spatial()
    };
    assert!(Simulation::from_settings(&inverted_lod).is_err());
}

#[test]
fn test_degenerate_camera_is_rejected() {
    let flat = FlockSettings {
        camera: flock_shared::CameraSettings {
            aspect: 0.0,
            ..Default::default()
        },
        ..FlockSettings::spatial()
    };
    let error = Simulation::from_settings(&flat).err().unwrap();
    assert!(format!("{:#}", error).contains("aspect ratio"));

    let overhead = FlockSettings {
        camera: flock_shared::CameraSettings {
            position: [0.0, 120.0, 0.0],
            target: [0.0, 0.0, 0.0],
            ..Default::default()
        },
        ..FlockSettings::spatial()
    };
    assert!(Simulation::from_settings(&overhead).is_err());
}
