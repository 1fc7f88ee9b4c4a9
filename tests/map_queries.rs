//! Integration tests for placement, spatial queries and pathfinding on
//! hand-made maps.

use delve::{
    Actor, DelveError, DelveResult, Item, Map, Mood, Position, Rect, ScopeFilter, Thing, Tile,
};

/// A 20x12 map of rock with a walled room and a pillar in it.
fn pillar_room() -> Map {
    let mut map = Map::new(20, 12, Tile::SolidRock).with_name("pillar room");
    map.fill_rect(&Rect::from_coords(1, 1, 18, 10), Tile::Wall);
    map.fill_rect(&Rect::from_coords(2, 2, 17, 9), Tile::Floor);
    map.set_tile(Position::new(9, 5), Tile::Wall).unwrap();
    map
}

#[test]
fn test_placement_keeps_indices_consistent() -> DelveResult<()> {
    let mut map = pillar_room();
    let rat = Actor::new("rat", 'r');
    let bat = Actor::new("bat", 'b');
    let coin = Item::new("coin", '$');

    let rat_pos = map.place(rat.clone(), Position::new(4, 4), false)?;
    assert_eq!(rat_pos, Position::new(4, 4));
    assert!(matches!(
        map.place(bat.clone(), rat_pos, false),
        Err(DelveError::Conflict(_))
    ));
    let bat_pos = map.place(bat.clone(), rat_pos, true)?;
    assert_eq!(map.distance(rat_pos, bat_pos), 1);

    // items share tiles with actors and with each other
    map.place(coin.clone(), rat_pos, false)?;
    map.place(Item::new("gem", '*'), rat_pos, false)?;
    assert_eq!(map.items_at(rat_pos).map(|stack| stack.len()), Some(2));
    assert_eq!(map.glyph_at(rat_pos), Some('r'));

    assert!(matches!(
        map.move_to(&Thing::from(rat.clone()), bat_pos),
        Err(DelveError::Conflict(_))
    ));
    let old = map.move_to(&Thing::from(rat.clone()), Position::new(15, 8))?;
    assert_eq!(old, rat_pos);
    assert_eq!(map.actor_pos(rat.id), Some(Position::new(15, 8)));
    assert!(map.actor_at(rat_pos).is_none());

    assert_eq!(map.remove(&Thing::from(coin.clone()))?, rat_pos);
    assert!(matches!(
        map.remove(&Thing::from(coin)),
        Err(DelveError::NotPresent(_))
    ));
    assert!(matches!(
        map.place(Actor::new("ghost", 'G'), Position::new(40, 40), false),
        Err(DelveError::InvalidGeometry(_))
    ));
    Ok(())
}

#[test]
fn test_moods_are_anchored() -> DelveResult<()> {
    let mut map = pillar_room();
    let mood = Mood::new("orcs", "wary");
    map.place(mood.clone(), Position::new(3, 3), false)?;
    assert_eq!(map.mood_at(Position::new(3, 3)), Some(&mood));
    assert!(matches!(
        map.remove(&Thing::from(mood.clone())),
        Err(DelveError::UnsupportedKind(_))
    ));
    assert_eq!(map.clear_mood(Position::new(3, 3)), Some(mood));
    assert!(map.mood_at(Position::new(3, 3)).is_none());
    Ok(())
}

#[test]
fn test_path_goes_around_the_pillar() {
    let mut map = pillar_room();
    map.fill_rect(&Rect::from_coords(9, 2, 9, 8), Tile::Wall);

    let start = Position::new(6, 4);
    let goal = Position::new(12, 4);
    let path = map.shortest_path(start, goal).unwrap();
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    assert!(path.contains(&Position::new(9, 9)));
    assert!(path.windows(2).all(|w| map.distance(w[0], w[1]) == 1));

    let metrics = map.dist_metrics(start, None, None);
    assert_eq!(metrics.get(goal), Some(path.len() as u32 - 1));
    assert_eq!(metrics.path(goal).map(|p| p.len()), Some(path.len()));

    // rock all around: nowhere to go
    assert!(map.shortest_path(start, Position::new(0, 0)).is_none());
}

#[test]
fn test_occupied_goal_is_reachable() -> DelveResult<()> {
    let mut map = pillar_room();
    let guard = Actor::new("guard", 'g');
    map.place(guard.clone(), Position::new(14, 6), false)?;
    let path = map.shortest_path(Position::new(3, 6), Position::new(14, 6)).unwrap();
    assert_eq!(path.last(), map.actor_pos(guard.id).as_ref());

    // but nobody walks through the guard on the way elsewhere
    map.fill_rect(&Rect::from_coords(14, 2, 14, 9), Tile::Wall);
    map.set_tile(Position::new(14, 6), Tile::Floor)?;
    assert!(map.shortest_path(Position::new(3, 6), Position::new(16, 6)).is_none());
    Ok(())
}

#[test]
fn test_line_of_sight_and_scopes() -> DelveResult<()> {
    let mut map = pillar_room();
    let viewer = Position::new(5, 5);
    assert!(map.line_of_sight(viewer, Position::new(13, 5)).is_none());
    let seen = map.line_of_sight(viewer, Position::new(5, 9)).unwrap();
    assert_eq!(seen.len(), 5);

    map.place(Actor::new("kobold", 'k'), Position::new(7, 7), false)?;
    map.place(Actor::new("newt", ':'), Position::new(13, 5), false)?;
    let scope = map.visible_scope(viewer, 10);
    let visible: Vec<_> = scope.actors().map(|(_, actor)| actor.kind.clone()).collect();
    assert_eq!(visible, vec!["kobold".to_string()]);

    assert_eq!(map.traversable_scope(viewer, 10).actors().count(), 2);

    // occupied tiles cannot be stepped on, so they are never reachable
    let reachable = map.reachable_scope(viewer, 10).coords();
    assert!(reachable.contains(&Position::new(10, 5)));
    assert!(!reachable.contains(&Position::new(9, 5)));
    assert!(!reachable.contains(&Position::new(7, 7)));

    let kobolds = map
        .traversable_scope(viewer, 3)
        .with_filter(ScopeFilter::Actor(Some("kobold".to_string())));
    assert_eq!(kobolds.coords(), vec![Position::new(7, 7)]);
    Ok(())
}

#[test]
fn test_connectedness_in_corridors() -> DelveResult<()> {
    let mut map = Map::new(7, 7, Tile::SolidRock);
    map.fill_rect(&Rect::from_coords(0, 3, 6, 3), Tile::Floor);
    // a straight corridor has two separate neighbours
    assert_eq!(map.connectedness(Position::new(3, 3))?, 1);

    map.fill_rect(&Rect::from_coords(2, 2, 4, 4), Tile::Floor);
    assert_eq!(map.connectedness(Position::new(3, 3))?, 8);
    Ok(())
}

#[test]
fn test_connectors_link_two_maps() -> DelveResult<()> {
    let mut upper = pillar_room();
    let mut lower = pillar_room();
    upper.set_tile(Position::new(3, 3), Tile::Connector(delve::Connector::new('>')))?;
    assert!(matches!(
        upper.connect(Position::new(3, 3), &mut lower, Position::new(3, 3)),
        Err(DelveError::NotAConnector(_))
    ));

    lower.set_tile(Position::new(16, 8), Tile::Connector(delve::Connector::new('<')))?;
    upper.connect(Position::new(3, 3), &mut lower, Position::new(16, 8))?;
    assert_eq!(lower.arrival_pos(upper.id()), Some(Position::new(16, 8)));
    let conn = upper.get_tile(Position::new(3, 3)).and_then(Tile::as_connector).unwrap();
    assert_eq!(conn.dest_map, Some(lower.id()));
    assert_eq!(conn.dest_pos, Some(Position::new(16, 8)));
    Ok(())
}
