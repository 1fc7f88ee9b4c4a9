//! Integration tests for whole-level generation and maze composition.

use delve::{
    BiasedRecursiveBacktracker, BinaryTree, Builder, DelveResult, DungeonRng, GenerationConfig,
    MazeFiller, RecursiveBacktracker, Rect, SideWinder, Tile,
};

fn rooms_then_maze(seed: u64, algo: &mut dyn MazeFiller) -> DelveResult<Builder> {
    let config = GenerationConfig::for_testing(seed);
    let mut rng = config.rng();
    let mut builder = Builder::new(config);
    for _ in 0..4 {
        builder.random_room((5, 7), (5, 6), 6, &mut rng);
    }
    builder.maze_fill(algo, &mut rng)?;
    Ok(builder)
}

#[test]
fn test_levels_are_connected_for_many_seeds() -> DelveResult<()> {
    for seed in 0..25 {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = config.rng();
        let mut builder = Builder::new(config);
        builder.generate_level(&mut rng)?;
        builder.staircase(None, '>', None, &mut rng)?;
        builder.validate_connectivity()?;

        let rooms = builder.rooms();
        assert!(rooms.len() >= 2, "seed {seed}: only {} rooms", rooms.len());
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.rect().intersects(&b.rect()), "seed {seed}: overlapping rooms");
            }
        }
    }
    Ok(())
}

#[test]
fn test_same_seed_same_level() -> DelveResult<()> {
    let render = |seed: u64| -> DelveResult<String> {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = config.rng();
        let mut builder = Builder::new(config);
        builder.generate_level(&mut rng)?;
        Ok(builder.map().to_text(false))
    };
    assert_eq!(render(31)?, render(31)?);
    assert_ne!(render(31)?, render(32)?);
    Ok(())
}

#[test]
fn test_every_maze_reaches_the_rooms() -> DelveResult<()> {
    let rect = Rect::from_coords(0, 0, 39, 19);
    let mut fillers: Vec<Box<dyn MazeFiller>> = vec![
        Box::new(BinaryTree::new(rect)),
        Box::new(SideWinder::new(rect)),
        Box::new(RecursiveBacktracker::new(rect)),
        Box::new(BiasedRecursiveBacktracker::new(rect).with_straight_line_bias(3.0)),
    ];

    for filler in fillers.iter_mut() {
        let builder = rooms_then_maze(3, filler.as_mut())?;
        let name = filler.algo_name();
        assert_eq!(builder.mazes().len(), 1, "{name}");

        let maze = &builder.mazes()[0];
        for room in builder.rooms() {
            assert!(!room.doors().is_empty(), "{name}: {:?} has no door", room.rect());
            for corner in room.rect().corners() {
                assert!(maze.is_frozen(corner), "{name}: corner {corner} not frozen");
                assert_eq!(builder.map().get_tile(corner), Some(&Tile::Wall), "{name}");
            }
        }
        for pos in maze.corridors() {
            assert_eq!(builder.map().get_tile(pos), Some(&Tile::Floor), "{name}");
        }
    }
    Ok(())
}

#[test]
fn test_second_maze_respects_the_first() -> DelveResult<()> {
    let config = GenerationConfig::for_testing(12);
    let mut rng = config.rng();
    let mut builder = Builder::new(config);
    let id = builder.room(
        delve::Position::new(18, 8),
        delve::Position::new(24, 13),
        Some(2),
        true,
        &mut rng,
    );
    let corners = builder.room_plan(id).map(|room| room.rect().corners()).unwrap();

    builder.maze_fill(&mut BinaryTree::new(Rect::from_coords(0, 0, 20, 19)), &mut rng)?;
    builder.maze_fill(&mut SideWinder::new(Rect::from_coords(22, 0, 39, 19)), &mut rng)?;
    for corner in corners {
        assert!(builder.is_frozen(corner));
        assert_eq!(builder.map().get_tile(corner), Some(&Tile::Wall));
    }
    assert_eq!(builder.mazes().len(), 2);
    Ok(())
}

#[test]
fn test_config_round_trips_through_json() -> DelveResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("level.json");
    let mut config = GenerationConfig::for_testing(99);
    config.doors_range = (2, 3);
    config.to_json_file(&path)?;
    assert_eq!(GenerationConfig::from_json_file(&path)?, config);

    let mut rng = DungeonRng::new(config.seed);
    let mut builder = Builder::new(config);
    let id = builder.room(
        delve::Position::new(2, 2),
        delve::Position::new(8, 8),
        None,
        true,
        &mut rng,
    );
    let target = builder.room_plan(id).map(|room| room.doors_target()).unwrap();
    assert!((2..=3).contains(&target));
    Ok(())
}
